// Infrastructure module - transports, configuration and logging
pub mod config;
pub mod logging;
pub mod serial;
pub mod tcp;
