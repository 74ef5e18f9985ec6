//! Telegram bot adapter (teloxide).

pub mod client;
pub mod mapper;
pub mod poller;

pub use client::TeloxideChat;
pub use poller::run_polling;
