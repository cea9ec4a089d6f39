//! Terminal implementation of [`ChatView`].
//!
//! The client mutates a shared [`Screen`] through the view; the event loop
//! reads the same screen to draw frames and edits it in response to keys.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use ratatui::style::Style;
use tokio::sync::oneshot;
use tui_textarea::{CursorMove, TextArea};
use tracing::debug;

use crate::core::client::CLEAR_CONTROL_LABEL;
use crate::core::transcript::Transcript;
use crate::core::view::ChatView;

/// A yes/no question waiting for the user.
pub struct PendingConfirm {
    pub prompt: String,
    reply: oneshot::Sender<bool>,
}

impl PendingConfirm {
    pub(crate) fn new(prompt: &str, reply: oneshot::Sender<bool>) -> Self {
        Self {
            prompt: prompt.to_string(),
            reply,
        }
    }

    pub fn answer(self, yes: bool) {
        // The asking task may have gone away; nothing to do then.
        let _ = self.reply.send(yes);
    }
}

/// Everything the terminal draws.
pub struct Screen {
    pub server_url: String,
    pub transcript: Transcript,
    pub input: TextArea<'static>,
    pub input_enabled: bool,
    pub settings_visible: bool,
    pub clear_control_enabled: bool,
    pub clear_control_label: String,
    pub confirm: Option<PendingConfirm>,
    pub alert: Option<String>,
    pub scroll_offset: u16,
    /// Pin the viewport to the newest line on the next frame.
    pub follow_bottom: bool,
    /// Largest scroll offset seen by the last frame.
    pub max_scroll: u16,
    /// Transcript rows visible in the last frame.
    pub viewport_height: u16,
    pub started: Instant,
}

impl Screen {
    pub fn new(server_url: &str) -> Self {
        Self {
            server_url: server_url.to_string(),
            transcript: Transcript::new(),
            input: new_input(),
            input_enabled: true,
            settings_visible: false,
            clear_control_enabled: true,
            clear_control_label: CLEAR_CONTROL_LABEL.to_string(),
            confirm: None,
            alert: None,
            scroll_offset: 0,
            follow_bottom: true,
            max_scroll: 0,
            viewport_height: 0,
            started: Instant::now(),
        }
    }

    pub fn input_text(&self) -> String {
        self.input.lines().join("\n")
    }

    pub fn input_is_empty(&self) -> bool {
        self.input.lines().iter().all(|line| line.is_empty())
    }

    /// Replace the edit buffer, leaving the cursor after the last character.
    pub fn set_input(&mut self, text: &str) {
        self.input = TextArea::from(text.split('\n').map(str::to_string));
        self.input.set_cursor_line_style(Style::default());
        self.input.move_cursor(CursorMove::Bottom);
        self.input.move_cursor(CursorMove::End);
    }

    pub fn clear_input(&mut self) {
        self.input = new_input();
    }

    pub fn take_input(&mut self) -> String {
        let text = self.input_text();
        self.clear_input();
        text
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.follow_bottom = false;
        self.scroll_offset = self.scroll_offset.min(self.max_scroll).saturating_sub(rows);
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(rows).min(self.max_scroll);
        self.follow_bottom = self.scroll_offset >= self.max_scroll;
    }

    pub fn page_rows(&self) -> u16 {
        self.viewport_height.saturating_sub(1).max(1)
    }
}

fn new_input() -> TextArea<'static> {
    let mut input = TextArea::default();
    input.set_cursor_line_style(Style::default());
    input
}

pub type SharedScreen = Arc<Mutex<Screen>>;

pub fn lock_screen(screen: &SharedScreen) -> MutexGuard<'_, Screen> {
    screen.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct TerminalView {
    screen: SharedScreen,
}

impl TerminalView {
    pub fn new(screen: SharedScreen) -> Self {
        Self { screen }
    }

    pub fn screen(&self) -> &SharedScreen {
        &self.screen
    }

    fn with_screen(&self, edit: impl FnOnce(&mut Screen)) {
        edit(&mut lock_screen(&self.screen));
    }
}

#[async_trait]
impl ChatView for TerminalView {
    fn render(&self, transcript: &Transcript) {
        self.with_screen(|screen| screen.transcript = transcript.clone());
    }

    fn scroll_to_bottom(&self) {
        self.with_screen(|screen| screen.follow_bottom = true);
    }

    fn set_input_enabled(&self, enabled: bool) {
        self.with_screen(|screen| screen.input_enabled = enabled);
    }

    fn clear_input(&self) {
        self.with_screen(Screen::clear_input);
    }

    fn set_settings_visible(&self, visible: bool) {
        self.with_screen(|screen| screen.settings_visible = visible);
    }

    fn set_clear_control(&self, enabled: bool, label: &str) {
        self.with_screen(|screen| {
            screen.clear_control_enabled = enabled;
            screen.clear_control_label = label.to_string();
        });
    }

    async fn confirm(&self, prompt: &str) -> bool {
        let (reply, answer) = oneshot::channel();
        self.with_screen(|screen| {
            if let Some(previous) = screen.confirm.replace(PendingConfirm::new(prompt, reply)) {
                previous.answer(false);
            }
        });
        answer.await.unwrap_or_else(|_| {
            debug!("confirmation dropped without an answer");
            false
        })
    }

    fn alert(&self, message: &str) {
        self.with_screen(|screen| screen.alert = Some(message.to_string()));
    }
}
