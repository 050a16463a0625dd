use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use storyvault_core::{CharacterAspect, default_db_path};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "storyvault")]
#[command(about = "Durable story store for long-running narrative pipelines", long_about = None)]
struct Cli {
    /// Store file. Defaults to $STORYVAULT_DB_PATH, then the platform data dir.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the story configuration
    Init {
        #[arg(long)]
        title: String,
        #[arg(long)]
        genre: String,
        #[arg(long)]
        tone: String,
        #[arg(long)]
        language: Option<String>,
    },
    /// Persist a working-state snapshot read from a JSON file
    Import { file: PathBuf },
    /// Print the working state rebuilt from the store
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render the full story text
    Compile {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Row counts and total word count
    Stats,
    /// Open plot threads, most pressing first
    Threads,
    /// A character's path through the story
    Journey { identifier: String },
    /// Chapters to revisit if a character aspect changes
    Affected {
        identifier: String,
        #[arg(help = CharacterAspect::ALL_VARIANTS_STR)]
        aspect: CharacterAspect,
    },
}

pub(crate) fn get_db_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| default_db_path(dirs::data_local_dir()))
}

pub(crate) fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_path = get_db_path(cli.db);
    ensure_db_dir(&db_path)?;

    match cli.command {
        Commands::Init { title, genre, tone, language } => {
            commands::story::run_init(&db_path, title, genre, tone, language)?;
        },
        Commands::Import { file } => commands::story::run_import(&db_path, &file)?,
        Commands::Export { output } => commands::story::run_export(&db_path, output.as_deref())?,
        Commands::Compile { output } => commands::story::run_compile(&db_path, output.as_deref())?,
        Commands::Stats => commands::report::run_stats(&db_path)?,
        Commands::Threads => commands::report::run_threads(&db_path)?,
        Commands::Journey { identifier } => commands::report::run_journey(&db_path, &identifier)?,
        Commands::Affected { identifier, aspect } => {
            commands::report::run_affected(&db_path, &identifier, aspect)?;
        },
    }

    Ok(())
}
