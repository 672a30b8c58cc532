//! Datastore contracts for the lead engine, plus an in-memory
//! implementation used by tests and by the binary's mock mode.

pub mod memory;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::{ActivityStore, LeadStore, SessionStore, TouchpointStore};
