//! Managed server instances
//!
//! A [`ServerHandle`] is the proxy for operating on one MySQL server: it
//! carries the server's identity and address, the two principals used to
//! reach it (one for SQL sessions, one for remote commands), the machine
//! capability for stopping and starting the service, and the transports for
//! config and command traffic. The handle is exclusively owned by its
//! caller; it performs no internal locking.

mod handle;
mod machine;
mod user;

pub use handle::{ServerHandle, ServerSpec};
pub use machine::{LinuxMachine, Machine, SolarisMachine};
pub use user::User;
