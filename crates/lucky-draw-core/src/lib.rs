// Library root: the draw lifecycle, winner selection, and the event loop
// that drives phase timers. Presentation crates consume `protocol` types.

pub mod app;
pub mod config;
pub mod error;
pub mod participant;
pub mod protocol;
pub mod selector;
pub mod session;
