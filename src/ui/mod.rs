//! Terminal front end built on `ratatui`.
//!
//! [`terminal_view::TerminalView`] implements the client's view capability
//! over a shared [`terminal_view::Screen`]; [`renderer`] draws that screen
//! and [`chat_loop`] drives input and redraws.

pub mod chat_loop;
pub mod renderer;
pub mod terminal_view;
