// Thai administrative reference tables and the cascading address selector
// (province -> amphure -> tambon -> zip code) built on them.

pub mod filters;
pub mod handlers;
pub mod models;
pub mod reference;
pub mod selection;

pub use reference::ReferenceData;
