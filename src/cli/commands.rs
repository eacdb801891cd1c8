//! Command dispatch

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::indicators::JOURNAL_FILE;
use crate::application::services::{CircleboardStore, HypothesisStore, IndicatorJournal};
use crate::application::{HypothesisSession, SnapshotStore};
use crate::cli::args::{BoardCommands, Cli, Commands, ConfigCommands, ForestCommands, SourceCommands};
use crate::config::{global_config_path, Settings, ToolKind};
use crate::domain::circleboard::{self, BoardState};
use crate::domain::evidence::ExportNode;
use crate::domain::{Depth, Forest};
use crate::infrastructure::traits::RealFileSystem;
use crate::server;

pub fn execute_command(cli: &Cli) -> Result<()> {
    let mut settings = Settings::load()?;
    if let Some(data_dir) = &cli.data_dir {
        settings.data_dir = data_dir.clone();
    }
    debug!("data_dir: {}", settings.data_dir.display());

    match &cli.command {
        Commands::Serve { tool, port } => _serve(settings, *tool, *port),
        Commands::ServeAll => _serve_all(settings),
        Commands::Tree => _tree(&settings),
        Commands::Forest { command } => _forest(&settings, command),
        Commands::Source { command } => _source(&settings, command),
        Commands::Board { command } => _board(&settings, command),
        Commands::Export => _export(&settings),
        Commands::Import { file } => _import(&settings, file),
        Commands::Config { command } => _config(&settings, command),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    }
}

fn open_session(settings: &Settings) -> HypothesisSession {
    let path = settings
        .tool_root(ToolKind::Hypothesis)
        .join(crate::application::snapshot::SNAPSHOT_FILE);
    HypothesisSession::open(SnapshotStore::new(Arc::new(RealFileSystem), path))
}

fn hypothesis_store(settings: &Settings) -> HypothesisStore {
    HypothesisStore::new(
        Arc::new(RealFileSystem),
        settings.tool_root(ToolKind::Hypothesis),
    )
}

#[instrument(skip(settings))]
fn _serve(settings: Settings, tool: ToolKind, port: Option<u16>) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("start async runtime")?;
    runtime.block_on(server::serve(settings, tool, port))?;
    Ok(())
}

#[instrument(skip(settings))]
fn _serve_all(settings: Settings) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("start async runtime")?;
    runtime.block_on(server::serve_all(settings))?;
    Ok(())
}

/// Render the forest with one root line per Who group.
fn _tree(settings: &Settings) -> Result<()> {
    let session = open_session(settings);
    let forest = session.forest();
    if forest.groups.is_empty() {
        println!("(empty forest)");
        return Ok(());
    }
    for who in &forest.groups {
        let mut root = termtree::Tree::new(who.label.clone());
        for what in &who.whats {
            let mut what_tree = termtree::Tree::new(what.label.clone());
            for why in &what.whys {
                let leaf = if why.edit_value.is_empty() {
                    why.label.clone()
                } else {
                    format!("{} ({})", why.label, why.edit_value)
                };
                what_tree.push(termtree::Tree::new(leaf));
            }
            root.push(what_tree);
        }
        println!("{}", root);
    }
    Ok(())
}

fn _forest(settings: &Settings, command: &ForestCommands) -> Result<()> {
    let mut session = open_session(settings);
    match command {
        ForestCommands::Add { depth, label } => {
            let depth = Depth::from_str(depth)?;
            session.generate(depth, label);
        }
        ForestCommands::Remove { label } => session.remove_label(label),
        ForestCommands::Sync => session.sync(),
        ForestCommands::Clear => session.clear(),
    }
    Ok(())
}

fn _source(settings: &Settings, command: &SourceCommands) -> Result<()> {
    let store = hypothesis_store(settings);
    match command {
        SourceCommands::Add { label } => {
            let label = label.trim();
            if label.is_empty() {
                return Err(anyhow!("empty label"));
            }
            store.add_source(label)?;
        }
        SourceCommands::Remove { label } => {
            let trimmed = label.trim();
            let items: Vec<String> = store
                .read_sources()?
                .into_iter()
                .filter(|item| item != trimmed)
                .collect();
            store.write_sources(&items)?;
            open_session(settings).remove_label(trimmed);
        }
        SourceCommands::List => {
            let session = open_session(settings);
            let generated = session.forest().generated_labels();
            for item in store.read_sources()? {
                if generated.contains(&item) {
                    println!("- {item} [generated]");
                } else {
                    println!("- {item}");
                }
            }
        }
    }
    Ok(())
}

fn circleboard_store(settings: &Settings) -> CircleboardStore {
    CircleboardStore::new(
        Arc::new(RealFileSystem),
        settings.tool_root(ToolKind::Circleboard),
    )
}

fn indicator_journal(settings: &Settings) -> IndicatorJournal {
    IndicatorJournal::new(
        Arc::new(RealFileSystem),
        settings
            .tool_root(ToolKind::Circleboard)
            .join(JOURNAL_FILE),
    )
}

fn _board(settings: &Settings, command: &BoardCommands) -> Result<()> {
    let store = circleboard_store(settings);
    match command {
        BoardCommands::Show => {
            let Some(content) = store.load_board()? else {
                println!("(no board)");
                return Ok(());
            };
            // The board file is JSON when saved by the tool, but it is
            // hand-editable and may hold one of the import shapes instead.
            let state = match serde_json::from_str::<serde_json::Value>(&content) {
                Ok(value) => circleboard::normalize_state(&value),
                Err(_) => BoardState::from_categories(&circleboard::parse_import(&content)),
            };
            print_board(&state);
        }
        BoardCommands::Import { file } => {
            let parsed = match file {
                Some(file) => {
                    let content = std::fs::read_to_string(file)
                        .with_context(|| format!("read {}", file.display()))?;
                    if file.extension().and_then(|e| e.to_str()) == Some("jsonl") {
                        circleboard::parse_jsonl_indicators(&content)
                    } else {
                        circleboard::parse_import(&content)
                    }
                }
                None => {
                    let journal = indicator_journal(settings);
                    circleboard::parse_jsonl_indicators(&journal.load_raw()?)
                }
            };
            let state = BoardState::from_categories(&parsed);
            store.save_board(&serde_json::to_string_pretty(&state)?)?;
            println!("imported board");
        }
    }
    Ok(())
}

fn print_board(state: &BoardState) {
    if !state.has_any_items() {
        println!("(empty board)");
        return;
    }
    let categories = [
        ("Who?", &state.who),
        ("What?", &state.what),
        ("Why?", &state.why),
        ("When?", &state.when),
        ("Where?", &state.location),
        ("How?", &state.how),
    ];
    for (header, items) in categories {
        if items.is_empty() {
            continue;
        }
        println!("{header}");
        for item in items {
            println!("- {}", item.text);
        }
    }
    for (i, lane) in state.so_what_lanes.iter().enumerate() {
        if lane.is_empty() {
            continue;
        }
        println!("So what? (lane {})", i + 1);
        for item in lane {
            println!("- {}", item.text);
        }
    }
}

fn _export(settings: &Settings) -> Result<()> {
    let session = open_session(settings);
    let tree = session.forest().to_export_tree("hypotheses");
    println!("{}", serde_json::to_string_pretty(&tree)?);
    Ok(())
}

fn _import(settings: &Settings, file: &std::path::Path) -> Result<()> {
    let content =
        std::fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
    let root: ExportNode =
        serde_json::from_str(&content).with_context(|| format!("parse {}", file.display()))?;
    let forest = Forest::from_export_tree(&root)?;
    let mut session = open_session(settings);
    session.replace_forest(forest);
    println!("imported {} groups", session.forest().groups.len());
    Ok(())
}

fn _config(settings: &Settings, command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            println!("{}", settings.to_toml()?);
        }
        ConfigCommands::Init => {
            let path = global_config_path().ok_or_else(|| anyhow!("no config directory"))?;
            if path.exists() {
                return Err(anyhow!("config already exists: {}", path.display()));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
            std::fs::write(&path, Settings::template())
                .with_context(|| format!("write {}", path.display()))?;
            println!("wrote {}", path.display());
        }
        ConfigCommands::Path => {
            let path = global_config_path().ok_or_else(|| anyhow!("no config directory"))?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
