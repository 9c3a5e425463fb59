pub mod client;
pub mod collector;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod query;
pub mod retry;

pub use client::{GithubGraphQlClient, GraphQlTransport};
pub use collector::Collector;
pub use error::{CollectError, TransportError};
pub use retry::RetryPolicy;
