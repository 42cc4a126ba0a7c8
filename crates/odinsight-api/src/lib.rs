// odinsight-api: async client for the upstream custody-metrics providers

pub mod client;
pub mod error;
pub mod models;
pub mod source;
pub mod transport;

pub use client::SourceClient;
pub use error::Error;
pub use source::{Endpoints, Query, SourceDescriptor, SourceKind};
pub use transport::TransportConfig;
