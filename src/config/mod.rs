// Config layer - Environment, logging and database bootstrap
mod database;
mod logging;
mod settings;

pub use database::{init_database, run_migrations};
pub use logging::init_logging;
pub use settings::{Settings, SettingsError};
