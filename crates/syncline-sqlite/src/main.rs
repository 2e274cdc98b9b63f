//! syncline CLI
//!
//! Command-line tool for synchronizing a SQLite database's schema
//! with a declared table manifest.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use syncline_schema::SqlType;
use syncline_sqlite::prelude::*;

/// Declarative schema synchronization for SQLite.
#[derive(Parser)]
#[command(name = "syncline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
    database: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the database with a schema manifest.
    Sync {
        /// Path to the JSON schema manifest.
        #[arg(short, long, default_value = "schema.json")]
        manifest: PathBuf,

        /// Keep undeclared columns instead of dropping them.
        #[arg(long)]
        preserve_extra_columns: bool,

        /// Show planned outcomes without executing any DDL.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show what `sync` would do, without executing anything.
    Plan {
        /// Path to the JSON schema manifest.
        #[arg(short, long, default_value = "schema.json")]
        manifest: PathBuf,

        /// Keep undeclared columns instead of dropping them.
        #[arg(long)]
        preserve_extra_columns: bool,
    },

    /// Print a live table's column layout.
    Describe {
        /// Table name.
        table: String,
    },
}

/// A schema manifest: the JSON shape `sync` and `plan` consume.
#[derive(Debug, Deserialize)]
struct Manifest {
    tables: Vec<ManifestTable>,
}

#[derive(Debug, Deserialize)]
struct ManifestTable {
    name: String,
    columns: Vec<ManifestColumn>,
}

#[derive(Debug, Deserialize)]
struct ManifestColumn {
    name: String,
    #[serde(rename = "type")]
    column_type: String,
    #[serde(default)]
    not_null: bool,
    #[serde(default)]
    primary_key: bool,
    #[serde(default)]
    autoincrement: bool,
    #[serde(default)]
    unique: bool,
    /// Default value as a raw SQL expression.
    #[serde(default)]
    default: Option<String>,
    #[serde(default)]
    generated: Option<ManifestGenerated>,
}

#[derive(Debug, Deserialize)]
struct ManifestGenerated {
    expression: String,
    #[serde(default)]
    stored: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Sync {
            manifest,
            preserve_extra_columns,
            dry_run,
        } => {
            let mappings = load_manifest(&manifest)?;
            let mut sync = open(&cli.database).await?;
            for mapping in &mappings {
                if dry_run {
                    let plan = sync.plan(mapping, preserve_extra_columns).await?;
                    println!("{}: {} (dry run)", mapping.name(), plan.outcome);
                } else {
                    let outcome = sync.synchronize(mapping, preserve_extra_columns).await?;
                    println!("{}: {}", mapping.name(), outcome);
                }
            }
        }

        Commands::Plan {
            manifest,
            preserve_extra_columns,
        } => {
            let mappings = load_manifest(&manifest)?;
            let mut sync = open(&cli.database).await?;
            for mapping in &mappings {
                let plan = sync.plan(mapping, preserve_extra_columns).await?;
                println!("{}: {}", mapping.name(), plan.outcome);
            }
        }

        Commands::Describe { table } => {
            let mut sync = open(&cli.database).await?;
            if !sync.table_exists(&table).await? {
                anyhow::bail!("table '{table}' does not exist");
            }
            for col in sync.table_columns(&table).await? {
                let mut flags = Vec::new();
                if col.pk_position > 0 {
                    flags.push(format!("pk {}", col.pk_position));
                }
                if col.not_null {
                    flags.push("not null".to_string());
                }
                if let Some(ref default) = col.default_value {
                    flags.push(format!("default {default}"));
                }
                if let Some(kind) = col.generated {
                    flags.push(format!("generated {}", kind.as_sql().to_lowercase()));
                }
                println!(
                    "{:>3}  {:<24} {:<12} {}",
                    col.ordinal,
                    col.name,
                    col.declared_type,
                    flags.join(", ")
                );
            }
        }
    }

    Ok(())
}

/// Opens the database (creating the file if missing) and detects its
/// capabilities.
async fn open(url: &str) -> anyhow::Result<Synchronizer> {
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("invalid database URL '{url}'"))?
        .create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&options).await?;
    let capabilities = detect_capabilities(&mut conn).await?;
    Ok(Synchronizer::new(conn, capabilities))
}

/// Reads and validates a manifest file into table mappings.
fn load_manifest(path: &Path) -> anyhow::Result<Vec<TableMapping>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading manifest {}", path.display()))?;
    let manifest: Manifest = serde_json::from_str(&raw)
        .with_context(|| format!("parsing manifest {}", path.display()))?;
    manifest.tables.into_iter().map(table_mapping).collect()
}

fn table_mapping(table: ManifestTable) -> anyhow::Result<TableMapping> {
    let mut mapping = TableMapping::new(&table.name);
    for col in table.columns {
        let sql_type = parse_sql_type(&col.column_type)
            .with_context(|| format!("column '{}.{}'", table.name, col.name))?;
        let mut def = ColumnDef::new(&col.name, sql_type);
        if col.not_null {
            def = def.not_null();
        }
        if col.primary_key {
            def = def.primary_key();
        }
        if col.autoincrement {
            def = def.autoincrement();
        }
        if col.unique {
            def = def.unique();
        }
        if let Some(expr) = col.default {
            def = def.default_expr(expr);
        }
        if let Some(gen) = col.generated {
            def = if gen.stored {
                def.generated_stored(gen.expression)
            } else {
                def.generated_virtual(gen.expression)
            };
        }
        mapping = mapping.column(def);
    }
    mapping.validate()?;
    Ok(mapping)
}

fn parse_sql_type(name: &str) -> anyhow::Result<SqlType> {
    let sql_type = match name.to_ascii_lowercase().as_str() {
        "integer" | "int" => SqlType::Integer,
        "bigint" => SqlType::BigInt,
        "smallint" => SqlType::SmallInt,
        "text" | "string" => SqlType::Text,
        "boolean" | "bool" => SqlType::Boolean,
        "datetime" => SqlType::DateTime,
        "date" => SqlType::Date,
        "timestamp" => SqlType::Timestamp,
        "real" | "float" => SqlType::Real,
        "double" => SqlType::Double,
        "numeric" | "decimal" => SqlType::Numeric,
        "blob" | "binary" => SqlType::Blob,
        "json" => SqlType::Json,
        "uuid" => SqlType::Uuid,
        other => anyhow::bail!("unknown column type '{other}'"),
    };
    Ok(sql_type)
}
