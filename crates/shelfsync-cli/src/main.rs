mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, FieldArgs};
use dotenv::dotenv;
use progress::CliReporter;
use shelfsync_core::storage::{BookUpdate, CatalogEntry};
use shelfsync_core::{AppConfig, BookFields, RewriteOutcome, ScanEngine};
use tracing::{error, info, warn};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match shelfsync_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();
    let Some(command) = args.command else {
        let _ = Cli::command().print_long_help();
        return;
    };

    if let Err(err) = run(command, config) {
        error!("Error: {:#}", err);
        drop(_guard);
        process::exit(1);
    }
}

fn run(command: Commands, config: AppConfig) -> Result<()> {
    match command {
        Commands::PrintConfig => {
            let engine = ScanEngine::new(config)?;
            println!("Configuration: {:?}", engine.config());
            println!("Extraction threads: {}", engine.extraction_workers());
            Ok(())
        }
        Commands::Scan { folder } => {
            let folder = folder.unwrap_or_else(|| PathBuf::from(&config.books_dir));
            run_scan(config, &folder)
        }
        Commands::UpdateMetadata { path, fields } => run_update_metadata(config, &path, fields),
        Commands::Update {
            id,
            fields,
            image_path,
        } => run_update(config, id, fields, image_path),
        Commands::List => {
            let engine = ScanEngine::new(config)?;
            print_books(&engine.open_store()?.list_books()?);
            Ok(())
        }
        Commands::Show { id } => {
            let engine = ScanEngine::new(config)?;
            match engine.open_store()?.get_book(id)? {
                Some(book) => {
                    println!("{}", serde_json::to_string_pretty(&book)?);
                    Ok(())
                }
                None => bail!("Book with ID {} not found", id),
            }
        }
        Commands::Search { title } => {
            let engine = ScanEngine::new(config)?;
            print_books(&engine.open_store()?.find_by_title(&title)?);
            Ok(())
        }
        Commands::Filter { author } => {
            let engine = ScanEngine::new(config)?;
            print_books(&engine.open_store()?.find_by_author(&author)?);
            Ok(())
        }
        Commands::Remove { id } => {
            let engine = ScanEngine::new(config)?;
            match engine.open_store()?.delete_book(id)? {
                Some(book) => {
                    info!("Deleted {} ({})", book.title.red(), book.book_link);
                    Ok(())
                }
                None => bail!("Book with ID {} not found", id),
            }
        }
        Commands::RemoveAll => {
            if !prompt_confirm(
                "Are you SURE you want to remove EVERY catalog entry?",
                Some(false),
            )? {
                return Ok(());
            }
            let engine = ScanEngine::new(config)?;
            let removed = engine.open_store()?.delete_all_books()?;
            info!("Deleted {} books", format!("{}", removed).red());
            Ok(())
        }
    }
}

fn run_scan(config: AppConfig, folder: &Path) -> Result<()> {
    let engine = ScanEngine::new(config)?;
    let reporter = CliReporter::new();
    let outcome = engine
        .scan(folder, &reporter)
        .with_context(|| format!("Failed to scan books in folder {}", folder.display()))?;

    info!(
        "Scanned {} new books, {} already cataloged, {} unreadable",
        format!("{}", outcome.added).green(),
        format!("{}", outcome.skipped.len()).cyan(),
        format!("{}", outcome.errors.len()).red(),
    );
    for failure in &outcome.errors {
        warn!("{}: {}", failure.file, failure.error);
    }
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn run_update_metadata(config: AppConfig, path: &Path, fields: FieldArgs) -> Result<()> {
    let engine = ScanEngine::new(config)?;
    let fields = BookFields {
        title: fields.title,
        author: fields.author,
        year: fields.year,
    };
    match engine.update_metadata(path, &fields) {
        RewriteOutcome::Written => {
            info!("Updated metadata of {}", path.display());
            Ok(())
        }
        RewriteOutcome::Missing => bail!("File not found: {}", path.display()),
        RewriteOutcome::Failed { error } => {
            bail!("Could not update {}: {}", path.display(), error)
        }
    }
}

fn run_update(
    config: AppConfig,
    id: i64,
    fields: FieldArgs,
    image_path: Option<String>,
) -> Result<()> {
    let engine = ScanEngine::new(config)?;
    let db = engine.open_store()?;
    let update = BookUpdate {
        title: fields.title,
        author: fields.author,
        year: fields.year,
        image_path,
    };
    match engine.update_book(&db, id, &update)? {
        Some(book) => {
            println!("{}", serde_json::to_string_pretty(&book)?);
            Ok(())
        }
        None => bail!("Book with ID {} not found or no fields to update", id),
    }
}

fn print_books(books: &[CatalogEntry]) {
    for book in books {
        println!(
            "{:>5}  {}  {}  {}",
            book.id,
            book.title.bold(),
            book.author.cyan(),
            book.image_path.dimmed(),
        );
    }
    info!("{} books", books.len());
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
