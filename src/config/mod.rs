pub mod bot_config;
pub mod config_io;
