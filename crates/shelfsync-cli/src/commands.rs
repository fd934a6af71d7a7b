use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "shelfsync")]
#[command(about = "Keep a document catalog in sync with the files on disk", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Args)]
pub struct FieldArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long)]
    pub year: Option<i32>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a folder and add new documents to the catalog
    Scan {
        /// Folder to scan (defaults to the configured books_dir)
        #[arg(long)]
        folder: Option<PathBuf>,
    },
    /// Rewrite the embedded metadata of a document file
    UpdateMetadata {
        path: PathBuf,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Update a catalog entry and its document file
    Update {
        id: i64,
        #[command(flatten)]
        fields: FieldArgs,
        #[arg(long)]
        image_path: Option<String>,
    },
    /// List every catalog entry
    List,
    /// Show one catalog entry
    Show { id: i64 },
    /// Find entries whose title contains the text
    Search { title: String },
    /// Find entries whose author contains the text
    Filter { author: String },
    /// Remove one catalog entry
    Remove { id: i64 },
    /// Remove every catalog entry
    RemoveAll,
    /// Print configuration values
    PrintConfig,
}
