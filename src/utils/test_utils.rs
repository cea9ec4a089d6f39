use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{ImagineResponse, PingResponse};
use crate::core::backend::{ChatBackend, ChatReply};
use crate::core::client::ChatClient;
use crate::core::error::ClientError;
use crate::core::transcript::Transcript;
use crate::core::view::ChatView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Chat(String),
    Imagine(String),
    Pings,
    Forget,
}

/// Canned reply for one chat request.
pub enum ScriptedChat {
    /// 2xx with these body chunks; an `Err` chunk fails the read there.
    Chunks(Vec<Result<Vec<u8>, String>>),
    Rejected(String),
    Unreachable(String),
}

impl ScriptedChat {
    pub fn lines(lines: &[&str]) -> Self {
        let body: String = lines.iter().map(|line| format!("{line}\n\n")).collect();
        ScriptedChat::Chunks(vec![Ok(body.into_bytes())])
    }
}

fn pop<T>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
    queue.lock().unwrap().pop_front()
}

#[derive(Default)]
pub struct ScriptedBackend {
    chat: Mutex<VecDeque<ScriptedChat>>,
    imagine: Mutex<VecDeque<Result<ImagineResponse, String>>>,
    pings: Mutex<VecDeque<Result<PingResponse, String>>>,
    forget: Mutex<VecDeque<Result<bool, String>>>,
    calls: Mutex<Vec<BackendCall>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chat(self, reply: ScriptedChat) -> Self {
        self.chat.lock().unwrap().push_back(reply);
        self
    }

    pub fn with_imagine(self, reply: Result<ImagineResponse, String>) -> Self {
        self.imagine.lock().unwrap().push_back(reply);
        self
    }

    pub fn with_ping(self, reply: Result<PingResponse, String>) -> Self {
        self.pings.lock().unwrap().push_back(reply);
        self
    }

    pub fn with_forget(self, reply: Result<bool, String>) -> Self {
        self.forget.lock().unwrap().push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn chat(&self, message: &str) -> Result<ChatReply, ClientError> {
        self.record(BackendCall::Chat(message.to_string()));
        match pop(&self.chat) {
            Some(ScriptedChat::Chunks(chunks)) => {
                let body = futures_util::stream::iter(
                    chunks
                        .into_iter()
                        .map(|chunk| chunk.map_err(ClientError::Transport)),
                );
                Ok(ChatReply::Streaming(Box::pin(body)))
            }
            Some(ScriptedChat::Rejected(status_text)) => Ok(ChatReply::Rejected { status_text }),
            Some(ScriptedChat::Unreachable(message)) => Err(ClientError::Transport(message)),
            None => Err(ClientError::Transport("no scripted chat reply".to_string())),
        }
    }

    async fn imagine(&self, prompt: &str) -> Result<ImagineResponse, ClientError> {
        self.record(BackendCall::Imagine(prompt.to_string()));
        pop(&self.imagine)
            .unwrap_or_else(|| Err("no scripted image reply".to_string()))
            .map_err(ClientError::Transport)
    }

    async fn pings(&self) -> Result<PingResponse, ClientError> {
        self.record(BackendCall::Pings);
        pop(&self.pings)
            .unwrap_or_else(|| Ok(PingResponse::default()))
            .map_err(ClientError::Transport)
    }

    async fn forget(&self) -> Result<bool, ClientError> {
        self.record(BackendCall::Forget);
        pop(&self.forget)
            .unwrap_or(Ok(true))
            .map_err(ClientError::Transport)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    InputEnabled(bool),
    ClearInput,
    Scroll,
    ImageScroll(String),
    SettingsVisible(bool),
    ClearControl(bool, String),
    Confirm(String),
    Alert(String),
}

pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
    rendered: Mutex<Transcript>,
    max_typing: Mutex<usize>,
    confirm_answer: bool,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::answering(true)
    }

    pub fn answering(confirm_answer: bool) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            rendered: Mutex::new(Transcript::new()),
            max_typing: Mutex::new(0),
            confirm_answer,
        }
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn rendered(&self) -> Transcript {
        self.rendered.lock().unwrap().clone()
    }

    /// Largest number of typing indicators seen in any single render.
    pub fn max_typing_seen(&self) -> usize {
        *self.max_typing.lock().unwrap()
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl ChatView for RecordingView {
    fn render(&self, transcript: &Transcript) {
        let typing = transcript
            .entries()
            .iter()
            .filter(|entry| matches!(entry, crate::core::transcript::Entry::Typing))
            .count();
        let mut max_typing = self.max_typing.lock().unwrap();
        *max_typing = (*max_typing).max(typing);
        *self.rendered.lock().unwrap() = transcript.clone();
    }

    fn scroll_to_bottom(&self) {
        self.push(ViewEvent::Scroll);
    }

    fn scroll_on_image_load(&self, url: &str) {
        self.push(ViewEvent::ImageScroll(url.to_string()));
    }

    fn set_input_enabled(&self, enabled: bool) {
        self.push(ViewEvent::InputEnabled(enabled));
    }

    fn clear_input(&self) {
        self.push(ViewEvent::ClearInput);
    }

    fn set_settings_visible(&self, visible: bool) {
        self.push(ViewEvent::SettingsVisible(visible));
    }

    fn set_clear_control(&self, enabled: bool, label: &str) {
        self.push(ViewEvent::ClearControl(enabled, label.to_string()));
    }

    async fn confirm(&self, prompt: &str) -> bool {
        self.push(ViewEvent::Confirm(prompt.to_string()));
        self.confirm_answer
    }

    fn alert(&self, message: &str) {
        self.push(ViewEvent::Alert(message.to_string()));
    }
}

pub fn create_test_client(backend: ScriptedBackend) -> ChatClient<ScriptedBackend, RecordingView> {
    ChatClient::new(backend, RecordingView::new())
}
