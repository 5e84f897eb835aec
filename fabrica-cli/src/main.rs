//! Fabrica CLI - command-line front end for the content workshop

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::Workspace;
use fabrica_core::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fabrica")]
#[command(author, version, about = "Write books chapter by chapter and derive new texts from them", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the saved library (overrides FABRICA_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, list and edit books
    #[command(subcommand)]
    Book(commands::book::BookCommand),

    /// Edit a book's chapters and their texts
    #[command(subcommand)]
    Chapter(commands::chapter::ChapterCommand),

    /// Manage collections of books
    #[command(subcommand)]
    Collection(commands::collection::CollectionCommand),

    /// Manage artisans (prompt templates)
    #[command(subcommand)]
    Artisan(commands::artisan::ArtisanCommand),

    /// Manage artisan groups (selection presets)
    #[command(subcommand)]
    Group(commands::artisan::GroupCommand),

    /// Attach videos, audio and PDFs to chapters
    #[command(subcommand)]
    Media(commands::media::MediaCommand),

    /// Manage the known media tags
    #[command(subcommand)]
    Tag(commands::media::TagCommand),

    /// Generate artisan outputs and translations for a chapter
    Generate(commands::generate::GenerateArgs),

    /// Browse a book's generated content
    Library(commands::library::LibraryArgs),

    /// Read a book chapter by chapter
    Read(commands::read::ReadArgs),

    /// Highlight or annotate a chapter's base text
    #[command(subcommand)]
    Annotate(commands::annotate::AnnotateCommand),

    /// Export the whole library to a JSON file
    Export {
        /// Output file (defaults to a dated file name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the library with an exported JSON file
    Import {
        /// Input file path
        input: PathBuf,
    },

    /// Package a chapter's texts into a ZIP archive
    Archive {
        /// Chapter id
        chapter: fabrica_core::EntityId,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// API key and display settings
    #[command(subcommand)]
    Settings(commands::settings::SettingsCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "fabrica_cli=debug,fabrica_core=debug"
    } else {
        "fabrica_cli=info,fabrica_core=warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from_env();
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    let mut ws = Workspace::open(config).await;

    match cli.command {
        Commands::Book(cmd) => commands::book::run(&mut ws, cmd).await,
        Commands::Chapter(cmd) => commands::chapter::run(&mut ws, cmd).await,
        Commands::Collection(cmd) => commands::collection::run(&mut ws, cmd).await,
        Commands::Artisan(cmd) => commands::artisan::run(&mut ws, cmd).await,
        Commands::Group(cmd) => commands::artisan::run_group(&mut ws, cmd).await,
        Commands::Media(cmd) => commands::media::run(&mut ws, cmd).await,
        Commands::Tag(cmd) => commands::media::run_tag(&mut ws, cmd).await,
        Commands::Generate(args) => commands::generate::generate(&mut ws, args).await,
        Commands::Library(args) => commands::library::library(&ws, args),
        Commands::Read(args) => commands::read::read(&mut ws, args).await,
        Commands::Annotate(cmd) => commands::annotate::run(&mut ws, cmd).await,
        Commands::Export { output } => commands::transfer::export(&ws, output),
        Commands::Import { input } => commands::transfer::import(&mut ws, &input).await,
        Commands::Archive {
            chapter,
            output_dir,
        } => commands::transfer::archive(&ws, chapter, &output_dir),
        Commands::Settings(cmd) => commands::settings::run(&mut ws, cmd).await,
    }
}
