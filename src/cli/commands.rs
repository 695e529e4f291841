use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "badp")]
#[command(version, about = "Inspect and edit agenda data files")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON file with container settings (temp_root, compression)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty agenda file
    Init {
        /// Agenda file to create
        file: PathBuf,
    },

    /// Build an agenda file from metadata and data dictionaries (JSON or YAML)
    Import {
        /// Agenda file to create
        file: PathBuf,

        /// Metadata dictionary (date_format, data_count, categories, themes)
        #[arg(long)]
        meta: PathBuf,

        /// Data dictionary (category -> date map or item list)
        #[arg(long)]
        data: PathBuf,

        /// Replace the agenda file if it already exists
        #[arg(long)]
        force: bool,
    },

    /// List categories and their items
    List {
        /// Agenda file
        file: PathBuf,

        /// Only show this category
        #[arg(value_name = "CATEGORY")]
        category: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List registered themes
    Themes {
        /// Agenda file
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Store an image as a theme
    AddTheme {
        /// Agenda file
        file: PathBuf,

        /// Image to store (copied as-is)
        image: PathBuf,

        /// Theme name
        #[arg(long)]
        name: String,

        /// Theme id (generated when omitted)
        #[arg(long)]
        id: Option<String>,
    },

    /// Add an item to a category
    AddItem {
        /// Agenda file
        file: PathBuf,

        /// Category key
        category: String,

        /// Item title
        #[arg(long)]
        title: String,

        /// File the item under this date (date-indexed category); appends
        /// to a list category when omitted
        #[arg(long)]
        date: Option<String>,

        /// Outline level
        #[arg(long, default_value_t = 0)]
        level: i64,

        /// Theme id
        #[arg(long, default_value = "")]
        theme: String,

        /// Item content
        #[arg(long, conflicts_with = "stdin")]
        content: Option<String>,

        /// Read content from stdin
        #[arg(long)]
        stdin: bool,
    },

    /// Save a copy of the agenda file elsewhere
    Copy {
        /// Agenda file
        file: PathBuf,

        /// Where to write the copy
        destination: PathBuf,
    },
}
