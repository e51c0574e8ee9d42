use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use taskboard::config::Config;
use taskboard::logger::{logger_init, LoggerFormat};
use taskboard::{ui, HttpTaskStore, KanbanBoard, Position, SyncPolicy, TaskId};

const BOARD_LOG_FILE: &str = "taskboard.log";

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(version, about = "Kanban board client for a REST task store")]
struct Cli {
    /// Base URL of the task store, e.g. http://127.0.0.1:8000/join/
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    log_level: Option<String>,

    #[arg(long, global = true)]
    log_format: Option<LoggerFormat>,

    /// Log file; the interactive board defaults to taskboard.log
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// always-reload | reload-on-success
    #[arg(long, global = true)]
    sync_policy: Option<SyncPolicy>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive board (default)
    Board,
    /// Print every column and its cards
    List,
    /// Print the summary counters
    Summary,
    /// Move a task to another column
    Move {
        id: TaskId,
        /// toDo | inProgress | awaitFeedback | done
        column: Position,
    },
    /// Print the rendered board HTML
    Html,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(level) = &self.log_level {
            config.logger.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logger.format = format;
        }
        if let Some(file) = &self.log_file {
            config.logger.file = Some(file.clone());
        }
        if let Some(policy) = self.sync_policy {
            config.sync_policy = policy;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = cli.config()?;
    let command = cli.command.unwrap_or(Commands::Board);
    if matches!(command, Commands::Board) && config.logger.file.is_none() {
        config.logger.file = Some(PathBuf::from(BOARD_LOG_FILE));
    }
    let _guard = logger_init(&config.logger).context("failed to initialize logging")?;
    info!(base_url = %config.base_url, policy = ?config.sync_policy, "starting taskboard");

    let store = Arc::new(HttpTaskStore::new(config.base_url.clone()));
    let mut board = KanbanBoard::new(store, config.sync_policy)?;
    // A failed load is logged and leaves an empty board; it is not fatal.
    let _ = board.reload().await;

    match command {
        Commands::Board => run_board(&mut board).await?,
        Commands::List => {
            for column in board.view().columns() {
                println!("{} ({}):", column.position.label(), column.cards.len());
                for card in &column.cards {
                    let progress = card.progress.map(|p| format!(" {}", p.text())).unwrap_or_default();
                    println!("- [#{}] {} ({}){}", card.id, card.title, card.category, progress);
                }
            }
            if !board.view().orphaned.is_empty() {
                println!("Without a column: {:?}", board.view().orphaned);
            }
        }
        Commands::Summary => println!("{}", board.summary()),
        Commands::Move { id, column } => {
            board
                .change_position(id, column)
                .await
                .with_context(|| format!("failed to move task {id} to {column}"))?;
            println!("Moved task {id} to {}", column.label());
        }
        Commands::Html => println!("{}", board.renderer().board_html(board.view())?),
    }
    Ok(())
}

async fn run_board(board: &mut KanbanBoard<HttpTaskStore>) -> Result<()> {
    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, board).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result.context("board terminated with an error")
}
