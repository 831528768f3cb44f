pub mod headless_mode;
pub mod setup;

pub use headless_mode::run_headless_mode;
pub use setup::{SessionData, WatchOptions, setup_session};
