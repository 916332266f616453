//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the anonymizer.
//! All business crates may depend on this crate, reverse dependencies are prohibited.
//!
//! ## Delivery model
//! - Records are consumed from a partitioned, offset-addressable log
//! - Offsets are committed only after the batch holding them was accepted downstream
//! - Delivery is at-least-once: a crash between send and commit replays rows

mod config;
mod error;
mod policy;
mod record;
mod sink;
mod source;

pub use config::*;
pub use error::*;
pub use policy::*;
pub use record::*;
pub use sink::*;
pub use source::*;
