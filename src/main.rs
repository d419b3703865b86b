//! playlist-grid - A terminal grid for large server-backed playlists.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::prelude::*;

mod action;
mod app;
mod client;
mod collection;
mod config;
mod debounce;
mod storage;
mod tui;
mod ui;
mod view;

use action::Action;
use app::App;
use client::{HttpBridge, PersistenceBridge};
use config::Config;
use storage::DurableStore;
use ui::PromptKind;
use view::Location;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "playlist-grid")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server URL (overrides config)
    #[arg(short, long)]
    server: Option<String>,

    /// API key (overrides config)
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Playlist id (overrides config)
    #[arg(short = 'p', long)]
    collection: Option<i64>,

    /// Location to open, e.g. "/playlist/7?sort=random&seed=42"
    #[arg(short, long)]
    location: Option<String>,

    /// File for remembered view state (overrides config)
    #[arg(long)]
    state_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install panic hooks
    tui::install_hooks()?;

    // Initialize logging
    let log_file = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("playlist-grid")
        .join("playlist-grid.log");

    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_subscriber::fmt::layer()
        .with_writer(std::sync::Mutex::new(std::fs::File::create(&log_file)?))
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with(file_appender)
        .try_init()
        .ok();

    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_default(),
    };

    // Apply command-line overrides
    if let Some(server) = args.server {
        config.server.url = server;
    }
    if let Some(api_key) = args.api_key {
        config.server.api_key = Some(api_key);
    }
    if let Some(state_file) = args.state_file {
        config.persistence.state_file = Some(state_file);
    }

    let location = args.location.as_deref().map(Location::parse);
    if let Some(id) = location
        .as_ref()
        .and_then(Location::collection_id)
        .or(args.collection)
    {
        config.server.collection = Some(id);
    }

    if !config.is_valid() {
        return Err(eyre!(
            "A server URL (http:// or https://) and a playlist id are required; \
             pass --server and --collection or set them in the config file"
        ));
    }
    let collection_id = config
        .server
        .collection
        .ok_or_else(|| eyre!("No playlist id"))?;
    let location =
        location.unwrap_or_else(|| Location::new(format!("/playlist/{}", collection_id)));

    let storage = match config
        .persistence
        .state_file
        .clone()
        .or_else(DurableStore::default_path)
    {
        Some(path) => DurableStore::open(path, config.persistence.expiry_days),
        None => DurableStore::in_memory(config.persistence.expiry_days),
    };

    let bridge = HttpBridge::new(config.server.url.clone(), config.server.api_key.clone());
    info!("Opening {} on {}", location, config.server.url);

    // Create action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    // Create application
    let mut app = App::new(
        config,
        bridge,
        storage,
        location,
        collection_id,
        action_tx.clone(),
    );

    // Initialize terminal
    let mut session = tui::TerminalSession::start()?;

    // Initialize application
    app.mount();

    // Main event loop
    let tick_rate = Duration::from_millis(100);

    loop {
        // Render UI, then let the grid ask for the rows it just drew
        session.terminal.draw(|frame| ui::render(frame, &mut app))?;
        app.after_render();

        // Handle events with timeout
        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press {
                        let action = handle_key_event(key.code, key.modifiers, &app);
                        if action != Action::None {
                            action_tx.send(action)?;
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    let action = handle_mouse_event(mouse);
                    if action != Action::None {
                        action_tx.send(action)?;
                    }
                }
                Event::Resize(width, height) => {
                    action_tx.send(Action::Resize(width, height))?;
                }
                _ => {}
            }
        }

        // Send tick action
        action_tx.send(Action::Tick)?;

        // Process all pending actions
        while let Ok(action) = action_rx.try_recv() {
            app.handle_action(action)?;
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    drop(session);

    // Hand the location back so the view can be reopened or shared
    println!("{}", app.location);

    Ok(())
}

/// Map key events to actions.
fn handle_key_event<B: PersistenceBridge>(
    code: KeyCode,
    modifiers: KeyModifiers,
    app: &App<B>,
) -> Action {
    // Handle prompt mode separately
    if app.prompt.is_confirm() {
        return match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Action::PromptSubmit,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Action::PromptCancel,
            _ => Action::None,
        };
    }
    if app.prompt.is_active() {
        return handle_prompt_key(code);
    }

    // Handle help overlay
    if app.show_help {
        return match code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => Action::HideHelp,
            _ => Action::None,
        };
    }

    // Global keys
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Action::Quit,
        _ => {}
    }

    // Normal mode keys
    match code {
        // Navigation
        KeyCode::Up | KeyCode::Char('k') => Action::NavigateUp,
        KeyCode::Down | KeyCode::Char('j') => Action::NavigateDown,
        KeyCode::Char('g') | KeyCode::Home => Action::JumpToTop,
        KeyCode::Char('G') | KeyCode::End => Action::JumpToBottom,
        KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => {
            Action::ScrollHalfPageDown
        }
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => Action::ScrollHalfPageUp,
        KeyCode::PageDown => Action::ScrollHalfPageDown,
        KeyCode::PageUp => Action::ScrollHalfPageUp,

        // Columns
        KeyCode::Left | KeyCode::Char('h') => Action::FocusColumn(-1),
        KeyCode::Right | KeyCode::Char('l') => Action::FocusColumn(1),
        KeyCode::Char('<') => Action::ResizeColumn(-2),
        KeyCode::Char('>') => Action::ResizeColumn(2),
        KeyCode::F(n) if n >= 1 => Action::ToggleColumn(usize::from(n - 1)),

        // View
        KeyCode::Char('s') => Action::SortByFocusedColumn,
        KeyCode::Char('S') => Action::ToggleSortDirection,
        KeyCode::Char('z') => Action::Shuffle,
        KeyCode::Char('0') => Action::NaturalOrder,
        KeyCode::Char('.') => Action::ToggleShowHidden,
        KeyCode::Char('/') => Action::OpenPrompt(PromptKind::Filter),
        KeyCode::Char('o') => Action::OpenPrompt(PromptKind::OpenCollection),
        KeyCode::Char('R') => Action::Retry,

        // Editing
        KeyCode::Char(' ') => Action::ToggleMark,
        KeyCode::Esc => Action::ClearMarks,
        KeyCode::Char('d') | KeyCode::Delete => Action::RemoveSelected,
        KeyCode::Char('H') => Action::ToggleHiddenSelected,
        KeyCode::Char('J') => Action::MoveSelected(1),
        KeyCode::Char('K') => Action::MoveSelected(-1),
        KeyCode::Char('a') => Action::OpenPrompt(PromptKind::AddRequest),
        KeyCode::Char('n') => app
            .grid
            .selected_entry(&app.store)
            .map(|entry| Action::OpenPrompt(PromptKind::Notes(entry.id)))
            .unwrap_or(Action::None),
        KeyCode::Char('e') => app
            .grid
            .selected_entry(&app.store)
            .map(|entry| Action::OpenPrompt(PromptKind::Replace(entry.id)))
            .unwrap_or(Action::None),
        KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => Action::Redo,
        KeyCode::Char('u') => Action::Undo,

        // Help
        KeyCode::Char('?') => Action::ShowHelp,

        // Clear error
        KeyCode::Char('x') => Action::ClearError,

        _ => Action::None,
    }
}

/// Handle key events while a text prompt is open.
fn handle_prompt_key(code: KeyCode) -> Action {
    match code {
        KeyCode::Esc => Action::PromptCancel,
        KeyCode::Enter => Action::PromptSubmit,
        KeyCode::Backspace => Action::PromptBackspace,
        KeyCode::Char(c) => Action::PromptInput(c),
        _ => Action::None,
    }
}

/// Handle mouse events.
fn handle_mouse_event(mouse: crossterm::event::MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollUp => Action::MouseScroll(-3),
        MouseEventKind::ScrollDown => Action::MouseScroll(3),
        _ => Action::None,
    }
}
