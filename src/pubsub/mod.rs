//! Event bus. Explicitly constructed and shared; no global instance.

pub mod bus;
pub mod envelope;

pub use bus::{Bus, BusError, Subscription};
pub use envelope::{Envelope, Receipt, Settlement};
