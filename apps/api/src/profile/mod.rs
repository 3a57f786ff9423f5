// User profile storage and the loader that seeds the address selector from it.

pub mod document;
pub mod handlers;
pub mod loader;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use store::ProfileStore;
