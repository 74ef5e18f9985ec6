//! tg-bridge: Telegram admin posts fanned out to a broadcast channel and a social account.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod pubsub;
pub mod shared;
pub mod usecases;

#[cfg(test)]
pub(crate) mod testing;
