//! Command-line front-end.
//!
//! Migration scripts are compiled into the host binary, so the CLI is a
//! library: the host builds its [`MigrationCatalog`] and hands it to
//! [`main_with`].

use clap::{Parser, Subcommand};
use sapling_core::{Database, Metadata, MigrationCatalog, MigrationRecord, Registry};
use sapling_sqlite::SqliteDatabase;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::reconciler::Migrator;

/// Manage Sapling migrations.
#[derive(Debug, Parser)]
#[command(name = "sapling-migrate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Database URL.
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite::memory:")]
    pub database_url: String,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Fetch the engine's plan before every query.
    #[arg(long)]
    pub explain: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create the migration ledger table.
    Setup,

    /// Drop the migration ledger table.
    Teardown,

    /// Show local and applied migrations.
    State,

    /// Apply every pending migration.
    Migrate,

    /// Roll back applied migrations (all of them unless --steps is given).
    Rollback {
        /// Roll back only the N most recent migrations.
        #[arg(short, long)]
        steps: Option<usize>,
    },

    /// Roll back everything applied, then apply everything.
    Reset,

    /// Print model metadata produced by replaying every migration.
    Metadata,
}

impl Cli {
    /// Builds the registry these options describe.
    #[must_use]
    pub fn registry(&self) -> Registry {
        Registry::new()
            .with_verbose(self.verbose)
            .with_auto_explain(self.explain)
    }

    /// Installs the global `tracing` subscriber.
    pub fn init_tracing(&self) -> anyhow::Result<()> {
        let log_level = if self.verbose {
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
        Ok(())
    }
}

/// Parses the process arguments and runs the command against SQLite.
pub async fn main_with(catalog: MigrationCatalog) -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.init_tracing()?;

    let db = SqliteDatabase::connect(&cli.database_url, catalog, cli.registry()).await?;
    let outcome = run(&cli, &db).await;
    db.close().await;
    outcome
}

/// Runs one command against `db`.
pub async fn run<D: Database>(cli: &Cli, db: &D) -> anyhow::Result<()> {
    let migrator = Migrator::new(db);

    match &cli.command {
        Command::Setup => {
            db.setup_migration_table().await?;
            info!("Migration table created successfully.");
        }
        Command::Teardown => {
            db.teardown_migration_table().await?;
            info!("Migration table dropped.");
        }
        Command::State => {
            let state = migrator.state().await?;
            print!("{}", render_state(&state));
        }
        Command::Migrate => {
            let applied = migrator.migrate().await?;
            info!(count = applied.len(), "Migrate finished");
        }
        Command::Rollback { steps } => {
            let rolled_back = match steps {
                Some(steps) => migrator.rollback_latest(*steps).await?,
                None => migrator.rollback().await?,
            };
            info!(count = rolled_back.len(), "Rollback finished");
        }
        Command::Reset => {
            let (rolled_back, applied) = migrator.reset().await?;
            info!(
                rolled_back = rolled_back.len(),
                applied = applied.len(),
                "Reset finished"
            );
        }
        Command::Metadata => {
            let metadata = db.generate_metadata().await?;
            println!("{}", render_metadata(&metadata)?);
        }
    }

    Ok(())
}

/// Formats migration state as a table followed by an `N of M` summary.
#[must_use]
pub fn render_state(state: &[MigrationRecord]) -> String {
    let width = state.iter().map(|r| r.name.len()).max().unwrap_or(0);
    let mut lines = Vec::with_capacity(state.len() + 1);

    for record in state {
        let mark = if record.is_applied() { 'X' } else { ' ' };
        let applied = record
            .applied_at
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        let line = format!(
            " [{mark}] {:<width$}  {:<12}  {applied}",
            record.name,
            record.location.to_string()
        );
        lines.push(line.trim_end().to_string());
    }

    let applied = state.iter().filter(|r| r.is_applied()).count();
    lines.push(format!("{applied} of {} are applied", state.len()));
    lines.join("\n") + "\n"
}

/// Formats the typed-binding artifact as pretty JSON.
pub fn render_metadata(metadata: &Metadata) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&metadata.bindings())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use sapling_core::Location;

    use super::*;

    fn record(name: &str, applied: bool, location: Location) -> MigrationRecord {
        MigrationRecord {
            name: name.to_string(),
            applied_at: applied.then(|| Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()),
            location,
        }
    }

    #[test]
    fn test_parse_rollback_steps() {
        let cli = Cli::try_parse_from([
            "sapling-migrate",
            "--database-url",
            "sqlite://app.db",
            "--verbose",
            "rollback",
            "--steps",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.database_url, "sqlite://app.db");
        assert!(cli.verbose);
        assert!(!cli.explain);
        assert_eq!(cli.command, Command::Rollback { steps: Some(2) });
    }

    #[test]
    fn test_parse_requires_command() {
        assert!(Cli::try_parse_from(["sapling-migrate", "--database-url", "x"]).is_err());
    }

    #[test]
    fn test_registry_from_flags() {
        let cli = Cli::try_parse_from([
            "sapling-migrate",
            "--database-url",
            "sqlite::memory:",
            "--explain",
            "state",
        ])
        .unwrap();
        let registry = cli.registry();
        assert!(registry.auto_explain());
        assert!(!registry.verbose());
    }

    #[test]
    fn test_render_state() {
        let state = vec![
            record("001_create_users", true, Location::Both),
            record("002_add_bio", false, Location::Local),
            record("000_legacy", true, Location::Remote),
        ];
        let text = render_state(&state);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            " [X] 001_create_users  local+remote  2024-03-01 12:30:00"
        );
        assert_eq!(lines[1], " [ ] 002_add_bio       local");
        assert_eq!(
            lines[2],
            " [X] 000_legacy        remote        2024-03-01 12:30:00"
        );
        assert_eq!(lines[3], "2 of 3 are applied");
        assert_eq!(lines.len(), 4);
        assert!(text.ends_with("are applied\n"));
    }

    #[test]
    fn test_render_empty_state() {
        assert_eq!(render_state(&[]), "0 of 0 are applied\n");
    }

    #[test]
    fn test_render_metadata() {
        let json = render_metadata(&Metadata::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
