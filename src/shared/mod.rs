pub mod chunks;
pub mod config;
