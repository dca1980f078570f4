//! Interactive terminal front-end: pick a source, choose the output policy,
//! then watch each file convert.

pub mod app;
pub mod app_logic;
pub mod events;
pub mod models;
pub mod processing;
pub mod rendering;
pub mod utils;

pub use app::App;
pub use events::run_tui;
