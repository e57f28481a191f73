pub mod config;
pub mod gate;
pub mod page;
pub mod session;
pub mod simulate;
pub mod watch;
