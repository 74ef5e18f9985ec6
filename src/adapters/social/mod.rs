//! Social network adapter (HTTP).

pub mod client;

pub use client::HttpSocialClient;
