pub mod backend;
pub mod config;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod sink;
pub mod source;
pub mod stream;
pub mod telemetry;
