//! Infrastructure adapters. Implement outbound ports.
//!
//! Telegram bot API and social HTTP API. Map errors to DomainError.

pub mod social;
pub mod telegram;
