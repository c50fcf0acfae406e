use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser};
use heelix_common::AppConfig;
use heelix_storage::DATA_VERSION;
use heelix_storage::migrate::{self, MigrationOutcome, StampStatus};
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "heelix", version, about = "Heelix data directory maintenance")]
struct Cli {
    /// Run the data migration and exit. Without it, a missing data directory
    /// is created and the version stamp is reported.
    #[arg(long)]
    migrate: bool,

    /// Data directory (default: `$SYNTHOS_DATA_DIR`, else /tmp/synthos/data/).
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Debug output (repeat for more).
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = AppConfig::from_env();
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:?}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn run(cli: &Cli, config: &AppConfig) -> anyhow::Result<()> {
    let data_dir = &config.data_dir;

    if cli.migrate {
        let outcome = migrate::migrate(data_dir)
            .with_context(|| format!("failed to migrate {}", data_dir.display()))?;
        if let MigrationOutcome::Migrated(stats) = outcome {
            let entities: usize = stats.iter().map(|s| s.entities).sum();
            let orphans: usize = stats.iter().map(|s| s.entities_without_documents).sum();
            info!(
                categories = stats.len(),
                entities, orphans, "migration complete"
            );
        }
        return Ok(());
    }

    let created = migrate::init_data_dir(data_dir)
        .with_context(|| format!("failed to initialise {}", data_dir.display()))?;
    if created {
        info!(data_dir = %data_dir.display(), version = DATA_VERSION, "created data directory");
    }

    match migrate::stamp_status(data_dir, DATA_VERSION) {
        StampStatus::Current => {
            info!(data_dir = %data_dir.display(), version = DATA_VERSION, "data is current");
        }
        StampStatus::Stale(version) => {
            warn!(
                data_dir = %data_dir.display(),
                %version,
                target_version = DATA_VERSION,
                "data needs migration, run with --migrate"
            );
        }
        StampStatus::Unknown => {
            warn!(
                data_dir = %data_dir.display(),
                "no readable version stamp, data format unknown"
            );
        }
    }
    Ok(())
}
