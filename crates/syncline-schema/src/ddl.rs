//! SQLite DDL generation.
//!
//! Renders the statements the executor runs: `CREATE TABLE`,
//! `ALTER TABLE ... ADD/DROP COLUMN`, `DROP TABLE`, the rename used by
//! the rebuild path, and the `INSERT ... SELECT` data copy. All output
//! is a plain SQL string; execution lives in the driver crate.

use crate::column::ColumnDef;
use crate::table::TableMapping;

/// SQLite DDL statement generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDdl;

impl SqliteDdl {
    /// Creates a new generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Quotes an identifier (table or column name).
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Renders one column definition.
    ///
    /// `inline_pk` controls whether a primary-key column gets the
    /// inline `PRIMARY KEY` clause; composite keys are declared as a
    /// table constraint instead.
    #[must_use]
    pub fn column_definition(&self, column: &ColumnDef, inline_pk: bool) -> String {
        let mut parts = vec![
            self.quote_identifier(&column.name),
            column.sql_type.sqlite_name().to_string(),
        ];

        if column.primary_key && inline_pk {
            parts.push("PRIMARY KEY".to_string());
            if column.autoincrement {
                parts.push("AUTOINCREMENT".to_string());
            }
        }

        // Emitted even for primary keys: PRAGMA only reports NOT NULL
        // when it is spelled out, and the differ compares that flag.
        if column.not_null {
            parts.push("NOT NULL".to_string());
        }

        if column.unique && !column.primary_key {
            parts.push("UNIQUE".to_string());
        }

        if let Some(ref default) = column.default {
            parts.push(format!("DEFAULT {}", default.to_sql()));
        }

        if let Some(ref generated) = column.generated {
            parts.push(format!(
                "GENERATED ALWAYS AS ({}) {}",
                generated.expression,
                generated.kind.as_sql()
            ));
        }

        parts.join(" ")
    }

    /// Renders the full `CREATE TABLE` for a mapping.
    #[must_use]
    pub fn create_table(&self, mapping: &TableMapping) -> String {
        self.create_table_named(mapping, mapping.name())
    }

    /// Renders `CREATE TABLE` for a mapping under a different table
    /// name. The rebuild path uses this for the temporary table.
    #[must_use]
    pub fn create_table_named(&self, mapping: &TableMapping, name: &str) -> String {
        let pk_count = mapping.columns().iter().filter(|c| c.primary_key).count();
        let inline_pk = pk_count == 1;

        let mut sql = String::from("CREATE TABLE ");
        sql.push_str(&self.quote_identifier(name));
        sql.push_str(" (\n  ");

        let col_defs: Vec<String> = mapping
            .columns()
            .iter()
            .map(|c| self.column_definition(c, inline_pk))
            .collect();
        sql.push_str(&col_defs.join(",\n  "));

        if pk_count > 1 {
            let quoted: Vec<String> = mapping
                .columns()
                .iter()
                .filter(|c| c.primary_key)
                .map(|c| self.quote_identifier(&c.name))
                .collect();
            sql.push_str(",\n  PRIMARY KEY (");
            sql.push_str(&quoted.join(", "));
            sql.push(')');
        }

        sql.push_str("\n)");
        sql
    }

    /// Renders `ALTER TABLE ... ADD COLUMN`.
    #[must_use]
    pub fn add_column(&self, table: &str, column: &ColumnDef) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.quote_identifier(table),
            self.column_definition(column, false)
        )
    }

    /// Renders `ALTER TABLE ... DROP COLUMN` (SQLite 3.35.0+).
    #[must_use]
    pub fn drop_column(&self, table: &str, column: &str) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quote_identifier(table),
            self.quote_identifier(column)
        )
    }

    /// Renders `DROP TABLE`.
    #[must_use]
    pub fn drop_table(&self, name: &str) -> String {
        format!("DROP TABLE {}", self.quote_identifier(name))
    }

    /// Renders `ALTER TABLE ... RENAME TO`.
    #[must_use]
    pub fn rename_table(&self, old_name: &str, new_name: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME TO {}",
            self.quote_identifier(old_name),
            self.quote_identifier(new_name)
        )
    }

    /// Renders the rebuild data copy over the surviving columns.
    #[must_use]
    pub fn insert_select(&self, target: &str, source: &str, columns: &[&str]) -> String {
        let quoted: Vec<String> = columns.iter().map(|c| self.quote_identifier(c)).collect();
        let list = quoted.join(", ");
        format!(
            "INSERT INTO {} ({list}) SELECT {list} FROM {}",
            self.quote_identifier(target),
            self.quote_identifier(source)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{bigint, integer, text, DefaultValue};
    use crate::table::TableMapping;

    fn ddl() -> SqliteDdl {
        SqliteDdl::new()
    }

    #[test]
    fn create_table_with_inline_pk() {
        let mapping = TableMapping::new("users")
            .column(bigint("id").primary_key().autoincrement())
            .column(text("name").not_null())
            .column(integer("age").default(DefaultValue::Integer(0)));
        let sql = ddl().create_table(&mapping);
        assert!(sql.starts_with("CREATE TABLE \"users\""));
        assert!(sql.contains("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL"));
        assert!(sql.contains("\"name\" TEXT NOT NULL"));
        assert!(sql.contains("\"age\" INTEGER DEFAULT 0"));
    }

    #[test]
    fn create_table_with_composite_pk() {
        let mapping = TableMapping::new("pairs")
            .column(integer("a").primary_key())
            .column(integer("b").primary_key())
            .column(text("note"));
        let sql = ddl().create_table(&mapping);
        // No inline PRIMARY KEY on either column.
        assert!(sql.contains("\"a\" INTEGER NOT NULL"));
        assert!(!sql.contains("\"a\" INTEGER PRIMARY KEY"));
        assert!(sql.contains("PRIMARY KEY (\"a\", \"b\")"));
    }

    #[test]
    fn create_table_named_substitutes_the_name() {
        let mapping = TableMapping::new("users").column(integer("id").primary_key());
        let sql = ddl().create_table_named(&mapping, "users_backup");
        assert!(sql.starts_with("CREATE TABLE \"users_backup\""));
        assert!(!sql.contains("\"users\" ("));
    }

    #[test]
    fn add_column_fully_specifies_the_column() {
        let col = integer("age").not_null().default(DefaultValue::Integer(0));
        assert_eq!(
            ddl().add_column("users", &col),
            "ALTER TABLE \"users\" ADD COLUMN \"age\" INTEGER NOT NULL DEFAULT 0"
        );
    }

    #[test]
    fn add_generated_column() {
        let col = integer("total").generated_virtual("price * qty");
        assert_eq!(
            ddl().add_column("orders", &col),
            "ALTER TABLE \"orders\" ADD COLUMN \"total\" INTEGER \
             GENERATED ALWAYS AS (price * qty) VIRTUAL"
        );
    }

    #[test]
    fn stored_generated_in_create_table() {
        let mapping = TableMapping::new("orders")
            .column(integer("price").not_null())
            .column(integer("total").generated_stored("price * 2"));
        let sql = ddl().create_table(&mapping);
        assert!(sql.contains("\"total\" INTEGER GENERATED ALWAYS AS (price * 2) STORED"));
    }

    #[test]
    fn drop_and_rename_statements() {
        assert_eq!(
            ddl().drop_column("users", "legacy"),
            "ALTER TABLE \"users\" DROP COLUMN \"legacy\""
        );
        assert_eq!(ddl().drop_table("users"), "DROP TABLE \"users\"");
        assert_eq!(
            ddl().rename_table("users_backup", "users"),
            "ALTER TABLE \"users_backup\" RENAME TO \"users\""
        );
    }

    #[test]
    fn insert_select_lists_columns_on_both_sides() {
        assert_eq!(
            ddl().insert_select("users_backup", "users", &["id", "name"]),
            "INSERT INTO \"users_backup\" (\"id\", \"name\") \
             SELECT \"id\", \"name\" FROM \"users\""
        );
    }

    #[test]
    fn identifiers_with_quotes_are_escaped() {
        assert_eq!(ddl().quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }
}
