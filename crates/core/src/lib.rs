//! Shared vocabulary for the lockstep simulator.
//!
//! This crate defines the types every other crate speaks in:
//! - [`TxnId`] / [`ItemId`]: identifier newtypes
//! - [`LockMode`]: shared vs. exclusive access
//! - [`Command`]: the closed set of transaction operations
//! - [`Error`]: the unified error type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod error;
pub mod types;

pub use command::Command;
pub use error::{Error, Result};
pub use types::{ItemId, LockMode, TxnId};
