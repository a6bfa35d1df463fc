//! Headless paintboard runner.
//!
//! Replays a JSON command script against a fresh board and writes the
//! resulting document:
//!
//! ```text
//! paintboard [--config board.json] <script.json> [output.json]
//! paintboard [--config board.json] --files boards.json <script.json>
//! paintboard --shortcuts
//! ```

use clap::Parser;
use paintboard_core::{
    Board, BoardConfig, BoardError, BoardFiles, CommandOutcome, CommandQueue, ConfigError,
    EachOrder, FilesError, ShortcutRegistry,
};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(
    name = "paintboard",
    about = "Replay a paintboard command script and write the resulting document",
    version
)]
struct Cli {
    /// Board config file (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Document list to edit: the script runs against its current board and
    /// the list is written back. Created when missing.
    #[arg(long, conflicts_with = "output")]
    files: Option<PathBuf>,

    /// Print the keyboard shortcut table and exit.
    #[arg(long)]
    shortcuts: bool,

    /// Command script: a JSON array of board commands.
    #[arg(required_unless_present = "shortcuts")]
    script: Option<PathBuf>,

    /// Where to write the document. Printed to stdout when omitted.
    output: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid command script: {0}")]
    Script(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Files(#[from] FilesError),
}

fn replay(queue: &mut CommandQueue, board: &mut Board) {
    let results = queue.drain_into(board);
    let applied = results
        .iter()
        .filter(|result| matches!(result, Ok(CommandOutcome::Applied)))
        .count();
    let failed = results.iter().filter(|result| result.is_err()).count();
    log::info!(
        "{} applied, {} failed, {} objects on board '{}'",
        applied,
        failed,
        board.len(),
        board.name
    );
    for entry in board.timeline(EachOrder::First) {
        log::debug!("  step {}: {}", entry.index, entry.action.label());
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let Cli {
        config,
        files,
        shortcuts,
        script,
        output,
    } = cli;
    let script = match script {
        Some(script) if !shortcuts => script,
        _ => {
            print!("{}", ShortcutRegistry::help_text());
            return Ok(());
        }
    };

    let config = match config {
        Some(path) => BoardConfig::load(path)?,
        None => BoardConfig::default(),
    };
    let json = fs::read_to_string(&script).map_err(|source| AppError::Read {
        path: script.clone(),
        source,
    })?;
    let mut queue = CommandQueue::from_json(&json)?;
    log::info!("Replaying {} commands from {}", queue.len(), script.display());

    if let Some(path) = files {
        let mut list = if path.exists() {
            BoardFiles::load(&path, config)?
        } else {
            BoardFiles::new(config)
        };
        replay(&mut queue, list.current_mut());
        list.save(&path)?;
        return Ok(());
    }

    let mut board = Board::new(config);
    replay(&mut queue, &mut board);

    match output {
        Some(path) => board.save(path)?,
        None => println!("{}", board.to_json().map_err(BoardError::from)?),
    }
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(err) = run(Cli::parse()) {
        log::error!("{}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
