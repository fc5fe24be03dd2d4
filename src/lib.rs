pub mod client;
pub mod config;
pub mod pipeline;
pub mod tracker_core;
