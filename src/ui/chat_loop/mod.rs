//! The interactive chat screen: terminal lifecycle, key handling and the
//! event loop that ties them to a [`crate::core::client::ChatClient`].

mod event_loop;
mod keybindings;
mod lifecycle;

pub use event_loop::run_chat;
pub use keybindings::{handle_key, handle_paste, KeyOutcome};
