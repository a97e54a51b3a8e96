// ABOUTME: Main library entry point for the link metadata pipeline behind rich link cards.
// ABOUTME: Re-exports the public API: MetadataService, its builder and options, LinkMetadata, Error.

//! Linkcard - resolve a bare URL into the metadata for a rich link card.
//!
//! The pipeline looks the URL up in a TTL/capacity-bounded cache, fetches the
//! page with bounded retries on a miss, runs the Open Graph, Twitter Card and
//! standard-tag strategies over the HTML, optionally persists the card image
//! through a host-supplied saver, and caches the result.
//!
//! # Example
//!
//! ```no_run
//! use linkcard::{Error, MetadataService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let service = MetadataService::builder().build();
//!     let meta = service.get_metadata("https://www.rust-lang.org").await?;
//!     println!("{} ({:?})", meta.title, meta.host);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod extractors;
pub mod metadata;
pub mod options;
pub mod parser;
pub mod resource;
pub mod service;

pub use crate::cache::{CacheItem, CacheStats, MetadataCache};
pub use crate::error::{Error, ErrorCode, Result};
pub use crate::extractors::Strategy;
pub use crate::metadata::{LinkMetadata, PartialMetadata};
pub use crate::options::{CacheOptions, FetchOptions, MetadataServiceBuilder, ServiceOptions};
pub use crate::parser::Parser;
pub use crate::resource::{FetchResult, Fetcher, ReqwestTransport, Transport, TransportError};
pub use crate::service::{ImageSaver, MetadataService};
