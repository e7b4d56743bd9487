pub mod config;
pub mod error;
pub mod listing;
pub mod memory;
pub mod notify;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod utils;
