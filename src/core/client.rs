//! The chat client controller.
//!
//! [`ChatClient`] turns user intent into server calls and server replies
//! into transcript mutations. It owns the transcript and the input gate;
//! the network and the screen are injected as [`ChatBackend`] and
//! [`ChatView`].
//!
//! Every flow that disables input re-enables it before returning, whatever
//! the outcome. The gate is cooperative: the ping poller checks it instead
//! of being blocked by it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::api::StreamEvent;
use crate::core::backend::{ChatBackend, ChatReply};
use crate::core::error::ClientError;
use crate::core::message::{BubbleId, Role};
use crate::core::stream_event::EventDecoder;
use crate::core::transcript::{Transcript, IMAGE_LOADER_LABEL};
use crate::core::view::ChatView;

pub const IMAGE_COMMAND_PREFIX: &str = "/imagine ";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const CLEAR_MEMORY_PROMPT: &str = "Erase all conversation history and long-term memory?";
pub const CLEAR_CONTROL_LABEL: &str = "Clear All Memory";
pub const CLEARING_LABEL: &str = "Clearing...";

const PING_DELAY_MIN_MS: u64 = 500;
const PING_DELAY_SPAN_MS: u64 = 1000;

/// What [`ChatClient::send_message`] did with the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Ignored,
    Chat,
    Image,
}

/// Classify raw input without side effects. Returns the text to send and
/// whether it is an image prompt.
pub fn classify_input(text: &str) -> Option<(&str, Dispatch)> {
    let message = text.trim();
    if message.is_empty() || message == IMAGE_COMMAND_PREFIX.trim_end() {
        return None;
    }
    match message.strip_prefix(IMAGE_COMMAND_PREFIX) {
        Some(prompt) => {
            let prompt = prompt.trim();
            (!prompt.is_empty()).then_some((prompt, Dispatch::Image))
        }
        None => Some((message, Dispatch::Chat)),
    }
}

/// Uniform in [500, 1500) ms: how long a ping "types" before it appears.
fn ping_reply_delay() -> Duration {
    let mut bytes = [0_u8; 8];
    let jitter = match getrandom::fill(&mut bytes) {
        Ok(()) => u64::from_le_bytes(bytes) % PING_DELAY_SPAN_MS,
        Err(_) => PING_DELAY_SPAN_MS / 2,
    };
    Duration::from_millis(PING_DELAY_MIN_MS + jitter)
}

struct ClientState {
    transcript: Transcript,
    input_enabled: bool,
    settings_visible: bool,
}

pub struct ChatClient<B, V> {
    backend: B,
    view: V,
    state: Mutex<ClientState>,
}

impl<B: ChatBackend, V: ChatView> ChatClient<B, V> {
    pub fn new(backend: B, view: V) -> Self {
        Self {
            backend,
            view,
            state: Mutex::new(ClientState {
                transcript: Transcript::new(),
                input_enabled: true,
                settings_visible: false,
            }),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    fn lock_state(&self) -> MutexGuard<'_, ClientState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate the transcript and re-render. The lock is released before
    /// returning, so it is never held across an await.
    fn update<R>(&self, mutate: impl FnOnce(&mut Transcript) -> R) -> R {
        let mut state = self.lock_state();
        let result = mutate(&mut state.transcript);
        self.view.render(&state.transcript);
        result
    }

    pub fn transcript(&self) -> Transcript {
        self.lock_state().transcript.clone()
    }

    pub fn input_enabled(&self) -> bool {
        self.lock_state().input_enabled
    }

    pub fn settings_visible(&self) -> bool {
        self.lock_state().settings_visible
    }

    fn set_input_enabled(&self, enabled: bool) {
        self.lock_state().input_enabled = enabled;
        self.view.set_input_enabled(enabled);
    }

    fn set_settings_visible(&self, visible: bool) {
        self.lock_state().settings_visible = visible;
        self.view.set_settings_visible(visible);
    }

    pub fn toggle_settings(&self) -> bool {
        let visible = !self.settings_visible();
        self.set_settings_visible(visible);
        visible
    }

    fn show_typing(&self) {
        self.update(Transcript::show_typing);
        self.view.scroll_to_bottom();
    }

    fn append_error(&self, content: String) {
        self.update(|transcript| transcript.append_error(Role::Assistant, content));
        self.view.scroll_to_bottom();
    }

    /// Validate and dispatch one line of user input.
    pub async fn send_message(&self, text: &str) -> Dispatch {
        let Some((payload, dispatch)) = classify_input(text) else {
            return Dispatch::Ignored;
        };

        self.view.clear_input();
        self.update(|transcript| transcript.append(Role::User, text.trim()));
        self.view.scroll_to_bottom();

        match dispatch {
            Dispatch::Image => self.request_image(payload).await,
            _ => self.stream_chat(payload).await,
        }
        dispatch
    }

    /// Run one streamed chat turn.
    pub async fn stream_chat(&self, message: &str) {
        self.set_input_enabled(false);
        self.show_typing();

        if let Err(err) = self.run_chat_turn(message).await {
            warn!(error = %err, "chat stream failed");
            self.update(|transcript| {
                transcript.remove_typing();
                transcript.append_error(Role::Assistant, format!("Connection error: {err}"));
            });
            self.view.scroll_to_bottom();
        }

        self.set_input_enabled(true);
    }

    async fn run_chat_turn(&self, message: &str) -> Result<(), ClientError> {
        let mut body = match self.backend.chat(message).await? {
            ChatReply::Streaming(body) => body,
            ChatReply::Rejected { status_text } => {
                self.update(Transcript::remove_typing);
                self.append_error(format!("Error: {status_text}"));
                self.set_input_enabled(true);
                return Ok(());
            }
        };

        let mut decoder = EventDecoder::new();
        let mut last_bubble: Option<BubbleId> = None;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for event in decoder.push(&chunk) {
                self.apply_event(event, &mut last_bubble);
            }
        }
        if decoder.has_pending() {
            debug!("discarding unterminated trailing stream line");
        }
        Ok(())
    }

    fn apply_event(&self, event: StreamEvent, last_bubble: &mut Option<BubbleId>) {
        match event {
            StreamEvent::Typing { .. } => self.show_typing(),
            StreamEvent::Message { content } => {
                let id = self.update(|transcript| {
                    transcript.remove_typing();
                    transcript.append(Role::Assistant, content)
                });
                self.view.scroll_to_bottom();
                *last_bubble = Some(id);
            }
            StreamEvent::ImageGenerating { .. } => {
                self.update(|transcript| {
                    transcript.remove_typing();
                    transcript.show_loader(IMAGE_LOADER_LABEL);
                });
                self.view.scroll_to_bottom();
            }
            StreamEvent::Image { url } => {
                let previous = *last_bubble;
                let id = self.update(|transcript| {
                    transcript.remove_loader();
                    let target = previous
                        .filter(|id| transcript.bubble(*id).is_some())
                        .unwrap_or_else(|| transcript.append(Role::Assistant, ""));
                    transcript.attach_image(target, url.as_str());
                    target
                });
                self.view.scroll_on_image_load(&url);
                *last_bubble = Some(id);
            }
            StreamEvent::Error { message } => {
                self.update(|transcript| {
                    transcript.remove_typing();
                    transcript.remove_loader();
                    transcript.append_error(Role::Assistant, message);
                });
                self.view.scroll_to_bottom();
            }
            StreamEvent::Done => {
                self.update(Transcript::remove_typing);
            }
        }
    }

    /// Explicit `/imagine` flow: one request, one JSON reply.
    pub async fn request_image(&self, prompt: &str) {
        self.set_input_enabled(false);
        self.update(|transcript| transcript.show_loader(IMAGE_LOADER_LABEL));
        self.view.scroll_to_bottom();

        match self.backend.imagine(prompt).await {
            Ok(reply) => match reply.image_url() {
                Some(url) => {
                    self.update(|transcript| {
                        transcript.remove_loader();
                        let id = transcript.append(Role::Assistant, "");
                        transcript.attach_image(id, url);
                    });
                    self.view.scroll_on_image_load(url);
                }
                None => {
                    self.update(Transcript::remove_loader);
                    self.append_error(format!(
                        "Image generation failed: {}",
                        reply.failure_reason()
                    ));
                }
            },
            Err(err) => {
                warn!(error = %err, "image request failed");
                self.update(Transcript::remove_loader);
                self.append_error(format!("Image generation failed: {err}"));
            }
        }

        self.set_input_enabled(true);
    }

    /// One poll for an unsolicited server message. Skipped while a turn is in
    /// flight; failures are swallowed. Returns whether a ping was shown.
    pub async fn poll_pings(&self) -> bool {
        if !self.input_enabled() {
            return false;
        }

        let message = match self.backend.pings().await {
            Ok(reply) => reply.into_message(),
            Err(err) => {
                debug!(error = %err, "ping poll failed");
                return false;
            }
        };
        let Some(message) = message else {
            return false;
        };

        self.show_typing();
        tokio::time::sleep(ping_reply_delay()).await;
        self.update(|transcript| {
            transcript.remove_typing();
            transcript.append(Role::Assistant, message);
        });
        self.view.scroll_to_bottom();
        true
    }

    /// Wipe server memory and the local transcript after confirmation.
    /// Returns whether the transcript was cleared.
    pub async fn clear_memory(&self) -> bool {
        if !self.view.confirm(CLEAR_MEMORY_PROMPT).await {
            return false;
        }

        self.view.set_clear_control(false, CLEARING_LABEL);
        let cleared = match self.backend.forget().await {
            Ok(true) => {
                self.update(Transcript::clear);
                self.set_settings_visible(false);
                true
            }
            Ok(false) => {
                debug!("server refused to forget");
                false
            }
            Err(err) => {
                self.view.alert(&format!("Failed to clear memory: {err}"));
                false
            }
        };
        self.view.set_clear_control(true, CLEAR_CONTROL_LABEL);
        cleared
    }
}

impl<B, V> ChatClient<B, V>
where
    B: ChatBackend + 'static,
    V: ChatView + 'static,
{
    /// Poll for pings every `every`, starting one interval from now. The task
    /// runs until aborted.
    pub fn spawn_ping_poller(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let client = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                client.poll_pings().await;
            }
        })
    }
}
