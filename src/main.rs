use std::path::PathBuf;
use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, EditMode, Editor};

use crate::config::Config;
use crate::controller::parse_and_run;
use crate::db::Database;
use crate::editor::FolhadbHelper;

mod analysis;
mod browse;
mod common;
mod config;
mod controller;
mod db;
mod dedup;
mod editor;
mod format;
mod import;
mod parser;
mod registry;
mod sheet_reader;
mod util;
mod value;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// Database file path
    file: String,

    /// Column profile overrides (TOML)
    #[clap(short, long)]
    config: Option<String>,

    /// Run a single statement and exit
    #[clap(short, long)]
    execute: Option<String>,
}

static COMMAND_HISTORY_FILE: &str = ".folhadb_history";
static PROMPT: &str = "folhadb> ";

fn history_path() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(COMMAND_HISTORY_FILE),
        None => PathBuf::from(COMMAND_HISTORY_FILE),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli: Cli = Cli::parse();

    let config = match &cli.config {
        Some(f) => Config::load_from_file(f)?,
        None => Config::empty(),
    };
    let mut db = Database::load(cli.file.as_str())
        .with_context(|| format!("Unable to open database {}", cli.file))?;
    let collections = db.collection_names();
    if !collections.is_empty() {
        info!("Collections: {}", collections.join(", "));
    }

    if let Some(statement) = &cli.execute {
        if let Err(err) = parse_and_run(&mut db, &config, statement) {
            error!("{:#}", err);
            std::process::exit(1);
        }
        return Ok(());
    }

    let editor_config = rustyline::Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();
    let mut rl: Editor<FolhadbHelper, DefaultHistory> = Editor::with_config(editor_config)?;
    rl.set_helper(Some(FolhadbHelper::new(PROMPT)));

    let history = history_path();
    if rl.load_history(&history).is_err() {
        info!("No previous history.");
    }

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let statement = line.trim();
                if statement.is_empty() {
                    continue;
                }
                rl.add_history_entry(statement)?;
                if let Err(err) = parse_and_run(&mut db, &config, statement) {
                    error!("{:#}", err);
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break
            },
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break
            },
            Err(err) => {
                error!("Error: {:?}", err);
                break
            }
        }
    }

    if let Err(err) = rl.save_history(&history) {
        warn!("Unable to save history to {}: {}", history.display(), err);
    }
    Ok(())
}
