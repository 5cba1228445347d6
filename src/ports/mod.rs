//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `KeyValueStore` - Persistence of assistant, memory and feedback records
//! - `MemberProfileReader` - Read-only member profile lookup
//! - `BookingGateway` - Hand-off of a chosen action to service booking

mod booking_gateway;
mod key_value_store;
mod profile_reader;

pub use booking_gateway::{BookingConfirmation, BookingGateway, BookingRequest};
pub use key_value_store::{validate_key, KeyValueStore, StorageError};
pub use profile_reader::MemberProfileReader;
