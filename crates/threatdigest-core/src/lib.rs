pub mod aggregator;
pub mod ai;
pub mod api;
pub mod config;
pub mod digest;
pub mod error;
pub mod feed;
pub mod pipeline;
pub mod scheduler;
pub mod social;

pub use aggregator::Aggregator;
pub use config::AppConfig;
pub use error::{Error, Result};
pub use pipeline::DigestPipeline;
