//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - Key-value record stores (file, in-memory)
//! - `profile` - Member profile lookup
//! - `booking` - Service booking hand-off

pub mod booking;
pub mod profile;
pub mod storage;

pub use booking::StubBookingGateway;
pub use profile::InMemoryProfileReader;
pub use storage::{FileKeyValueStore, InMemoryKeyValueStore};
