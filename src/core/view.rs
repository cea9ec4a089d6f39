use async_trait::async_trait;

use crate::core::transcript::Transcript;

/// Everything the chat client needs from its front end. Handles are injected
/// at construction so flows run the same against a terminal or a test double.
#[async_trait]
pub trait ChatView: Send + Sync {
    /// Called after every transcript mutation with the current state.
    fn render(&self, transcript: &Transcript);

    fn scroll_to_bottom(&self);

    /// An image was attached; its size is unknown until it loads, so the
    /// view scrolls once loading completes. Views without image loading
    /// scroll immediately.
    fn scroll_on_image_load(&self, _url: &str) {
        self.scroll_to_bottom();
    }

    fn set_input_enabled(&self, enabled: bool);

    fn clear_input(&self);

    fn set_settings_visible(&self, visible: bool);

    fn set_clear_control(&self, enabled: bool, label: &str);

    /// Ask the user a yes/no question and wait for the answer.
    async fn confirm(&self, prompt: &str) -> bool;

    fn alert(&self, message: &str);
}
