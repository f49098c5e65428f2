pub mod clock;
pub mod collector;
pub mod memory;
pub mod reconcile;
pub mod snapshot;
pub mod stat;
