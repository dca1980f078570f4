pub mod api;
pub mod convert_engine;
pub mod converter;
pub mod error;
pub mod tui;
