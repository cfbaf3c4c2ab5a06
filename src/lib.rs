pub mod compose;
pub mod config;
pub mod docker;
pub mod errors;
pub mod logging;
pub mod options;
pub mod progress;
pub mod runner;
pub mod source;
pub mod stream;
pub mod ui;
