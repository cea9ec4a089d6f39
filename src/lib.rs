//! Companion is a terminal client for a companion chat server.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the chat client controller, the transcript, the stream
//!   decoder, the server backend, and persistent configuration.
//! - [`ui`] renders the terminal interface and runs the interactive event loop
//!   that drives user input and display updates.
//! - [`api`] defines the request bodies, JSON replies, and stream events the
//!   server exchanges with the client.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which loads configuration and dispatches into
//! [`ui::chat_loop`] for interactive sessions.

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
