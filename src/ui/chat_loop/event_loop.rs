//! Event polling, dispatching, and UI rendering loop.
//!
//! Terminal input is read on a background task and forwarded over a
//! channel; the loop redraws on a fixed frame tick so the typing dots and
//! the loader spinner keep moving while a reply streams in.

use std::{error::Error, sync::Arc, time::Duration};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::backend::HttpBackend;
use crate::core::client::ChatClient;
use crate::ui::renderer::ui;
use crate::ui::terminal_view::{lock_screen, Screen, SharedScreen, TerminalView};

use super::keybindings::{handle_key, handle_paste, KeyOutcome};
use super::lifecycle::{restore_terminal, setup_terminal, ChatTerminal};

const FRAME_INTERVAL: Duration = Duration::from_millis(50);

type TerminalClient = ChatClient<HttpBackend, TerminalView>;

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        continue;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

fn dispatch(client: &Arc<TerminalClient>, outcome: KeyOutcome) -> bool {
    match outcome {
        KeyOutcome::None => {}
        KeyOutcome::Quit => return false,
        KeyOutcome::Send(text) => {
            let client = Arc::clone(client);
            tokio::spawn(async move {
                let dispatch = client.send_message(&text).await;
                debug!(?dispatch, "input handled");
            });
        }
        KeyOutcome::ToggleSettings => {
            client.toggle_settings();
        }
        KeyOutcome::ClearMemory => {
            let client = Arc::clone(client);
            tokio::spawn(async move {
                let cleared = client.clear_memory().await;
                debug!(cleared, "clear memory finished");
            });
        }
    }
    true
}

async fn event_loop(
    terminal: &mut ChatTerminal,
    screen: &SharedScreen,
    client: &Arc<TerminalClient>,
) -> Result<(), Box<dyn Error>> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let reader = spawn_event_reader(event_tx);
    let mut frames = tokio::time::interval(FRAME_INTERVAL);

    let result = loop {
        if let Err(err) = terminal.draw(|f| ui(f, &mut lock_screen(screen))) {
            break Err(err.into());
        }

        tokio::select! {
            _ = frames.tick() => {}
            maybe_event = event_rx.recv() => {
                let Some(UiEvent::Crossterm(ev)) = maybe_event else {
                    break Ok(());
                };
                let outcome = match ev {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        handle_key(&mut lock_screen(screen), key)
                    }
                    Event::Paste(text) => {
                        handle_paste(&mut lock_screen(screen), &text);
                        KeyOutcome::None
                    }
                    _ => KeyOutcome::None,
                };
                // The screen lock is released here; the client takes its own
                // lock and then the screen's.
                if !dispatch(client, outcome) {
                    break Ok(());
                }
            }
        }
    };

    reader.abort();
    result
}

/// Run the interactive client against `server_url` until the user quits.
pub async fn run_chat(server_url: String, poll_interval: Duration) -> Result<(), Box<dyn Error>> {
    info!(%server_url, ?poll_interval, "starting chat");
    let screen: SharedScreen = Arc::new(std::sync::Mutex::new(Screen::new(&server_url)));
    let client = Arc::new(ChatClient::new(
        HttpBackend::new(&server_url),
        TerminalView::new(Arc::clone(&screen)),
    ));
    let poller = client.spawn_ping_poller(poll_interval);

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &screen, &client).await;

    poller.abort();
    restore_terminal(&mut terminal)?;
    result
}
