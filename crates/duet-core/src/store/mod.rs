//! Built-in session stores.

mod memory;

pub use memory::MemorySessionStore;
