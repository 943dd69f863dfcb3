pub mod config;
pub mod monitor;
pub mod task;
pub mod watch;
