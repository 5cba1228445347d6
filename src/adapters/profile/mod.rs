//! Member profile adapters.

mod in_memory_profile_reader;

pub use in_memory_profile_reader::InMemoryProfileReader;
