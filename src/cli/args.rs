//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::config::ToolKind;

/// Structured-analytic worksheet toolkit: hypothesis forests, indicator
/// journals, and per-tool save servers
#[derive(Parser, Debug)]
#[command(name = "satbench")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short = 'd', long = "debug", action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Data directory override (default from config)
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one tool's save server
    Serve {
        /// Tool to serve
        #[arg(value_enum)]
        tool: ToolKind,
        /// Port override
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run every tool's save server on its configured port
    ServeAll,

    /// Render the hypothesis forest as a tree
    Tree,

    /// Manipulate the hypothesis forest
    Forest {
        #[command(subcommand)]
        command: ForestCommands,
    },

    /// Manage the source bullet list
    Source {
        #[command(subcommand)]
        command: SourceCommands,
    },

    /// Inspect or import the circle-board
    Board {
        #[command(subcommand)]
        command: BoardCommands,
    },

    /// Export the forest as nested JSON to stdout
    Export,

    /// Rebuild the forest from an export document
    Import {
        /// Export JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ForestCommands {
    /// Fan-out add a label at a depth (who, what, or why)
    Add {
        /// Placement depth: who, what, or why
        depth: String,
        /// Node label
        label: String,
    },

    /// Cascade-remove every node carrying a label
    Remove {
        /// Label to remove at every depth
        label: String,
    },

    /// Run the reference synchronizer
    Sync,

    /// Drop the whole forest
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum SourceCommands {
    /// Append one bullet to the source list
    Add {
        /// Bullet label
        label: String,
    },

    /// Remove a bullet and cascade-remove its forest nodes
    Remove {
        /// Bullet label
        label: String,
    },

    /// List bullets, marking those present in the forest
    List,
}

#[derive(Subcommand, Debug)]
pub enum BoardCommands {
    /// Show board items grouped by category
    Show,

    /// Replace the board from a file (JSON, yaml-like or markdown-like
    /// categories, or a `.jsonl` indicator journal)
    Import {
        /// File to import; defaults to the shared keyword journal
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,

    /// Write a template config file
    Init,

    /// Print the global config file path
    Path,
}
