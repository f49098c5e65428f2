pub mod config;
pub mod format;
pub mod logging;
pub mod snoop;
pub mod system;
