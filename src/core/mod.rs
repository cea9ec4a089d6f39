pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod line_reader;
pub mod message;
pub mod stream_event;
pub mod transcript;
pub mod view;
