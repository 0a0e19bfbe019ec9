//! Import module.
//!
//! Bulk import of employees from external sources:
//! - Pipeline: batch loop shared by every format, summary reporting
//! - Feed: remote JSON feed client and element mapping

pub mod feed;
pub mod pipeline;

pub use feed::{FeedClient, FeedFallback, DEFAULT_FEED_TIMEOUT};
pub use pipeline::{ImportOptions, ImportPipeline};
