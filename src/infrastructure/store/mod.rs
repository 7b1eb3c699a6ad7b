//! Processing run storage adapters

mod memory;

pub use memory::InMemoryRunStore;
