pub mod api;
pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod reminder;
pub mod store;
pub mod tui;
pub mod utils;

pub use config::Config;
pub use models::{Task, TaskId};
pub use store::TaskStore;
pub use utils::Profile;
