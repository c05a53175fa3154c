//! weave: terminal front end for an AI coding assistant.
//!
//! Entry point for the `weave` binary. Wires together the terminal lifecycle
//! (`tui`), the unified event bus (`event`), the UI (`ui`), and the chat
//! session, file store and websocket transport from `weave-core`.
//!
//! # Startup sequence
//!
//! 1. Load settings from XDG config plus environment overrides. Read-only,
//!    safe before terminal init; parse errors fall back to defaults.
//! 2. Create the data directory and start file logging.
//! 3. `install_panic_hook()` first so it is the innermost hook.
//! 4. `sigterm_flag()`, then `tui::enter()`.
//! 5. Open the chat database. A failure disables history instead of aborting.
//! 6. Spawn the event task, the transport forwarder and the model list fetch.
//!
//! The event loop exits only via `break`, so `tui::leave()` is always
//! reached; draw errors are logged and end the loop.

mod api;
mod app;
mod command;
mod event;
mod logging;
mod theme;
mod tui;
mod ui;
mod workspace;

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use weave_core::config::{config_path, Settings};
use weave_core::{db, ChatSession, WsTransport};

use crate::event::AppEvent;
use crate::workspace::{Flow, Workspace};

fn load_settings() -> Settings {
    let path = config_path();
    let settings = Settings::load(&path).unwrap_or_else(|e| {
        eprintln!("weave: {e}; using defaults");
        Settings::default()
    });
    settings.with_env(|key| std::env::var(key).ok())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let settings = load_settings();
    std::fs::create_dir_all(&settings.data_dir)?;
    if let Err(e) = logging::init(&settings.data_dir) {
        eprintln!("weave: logging disabled: {e}");
    }
    tracing::info!(ws = %settings.chat_ws_url(), "starting weave");

    let theme = theme::Theme::from_name(&settings.theme);
    let mut state = app::AppState::default();

    tui::install_panic_hook();
    let term_flag = tui::sigterm_flag()?;
    let mut terminal = tui::enter()?;

    let (tx, mut rx) = event::channel();
    event::spawn_event_task(tx.clone());

    let db_path = settings.data_dir.join("chats.db");
    let history = match db::open_db(&db_path.to_string_lossy()).await {
        Ok(conn) => Some(conn),
        Err(e) => {
            tracing::error!(error = %e, path = %db_path.display(), "chat history disabled");
            None
        }
    };

    let (transport_tx, transport_rx) = mpsc::unbounded_channel();
    event::spawn_transport_forwarder(transport_rx, tx.clone());
    let transport = WsTransport::new(settings.chat_ws_url(), transport_tx);
    let session = ChatSession::from_settings(transport, &settings, history);

    let api = api::ApiClient::new(&settings);
    {
        let api = api.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let models = api.fetch_models().await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "model list unavailable");
                Vec::new()
            });
            let _ = tx.send(AppEvent::ModelsLoaded(models));
        });
    }

    let mut workspace = Workspace::new(session, api, tx.clone());

    'event_loop: loop {
        tokio::select! {
            // Heartbeat so SIGTERM is seen even when no events arrive.
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(AppEvent::Render) => {
                        let view = workspace.view();
                        if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut state, &view, &theme)) {
                            tracing::error!(error = %e, "draw failed");
                            break 'event_loop;
                        }
                    }
                    Some(AppEvent::Key(key)) => {
                        let action = ui::keybindings::handle_key(key, &mut state);
                        if workspace.perform(action, &mut state).await == Flow::Quit {
                            break 'event_loop;
                        }
                        workspace.drain_notices(&mut state);
                    }
                    Some(AppEvent::Mouse(mouse)) => {
                        ui::keybindings::handle_mouse(mouse, &mut state);
                    }
                    // The next Render reads the new size from `frame.area()`.
                    Some(AppEvent::Resize(_, _)) => {}
                    Some(AppEvent::Tick) => state.expire_toasts(Instant::now()),
                    Some(AppEvent::Transport(ev)) => workspace.on_transport(ev, &mut state).await,
                    Some(AppEvent::ModelsLoaded(models)) => {
                        if !models.is_empty() {
                            workspace.session.set_models(models);
                        }
                    }
                    Some(AppEvent::ChatsListed(chats)) => state.open_chat_list(chats),
                    Some(AppEvent::UploadDone(outcome)) => {
                        workspace.uploads.finish(outcome);
                        workspace.drain_notices(&mut state);
                    }
                    Some(AppEvent::MergeFinished { path, result }) => {
                        workspace.finish_merge(&path, &result, &mut state);
                    }
                    Some(AppEvent::MergeCancelled) => state.close_overlay(),
                    None => break 'event_loop,
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    // Dropping the transport aborts its socket task.
    drop(workspace);
    tui::leave()?;
    tracing::info!("weave exited");
    Ok(())
}
