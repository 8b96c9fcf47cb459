pub mod clean;
pub mod config;
pub mod discover;
pub mod enhance;
pub mod init;
pub mod modules;
pub mod toggle;

pub use clean::clean_command;
pub use config::config_command;
pub use discover::discover_command;
pub use enhance::enhance_command;
pub use init::init_command;
pub use modules::modules_command;
pub use toggle::toggle_command;
