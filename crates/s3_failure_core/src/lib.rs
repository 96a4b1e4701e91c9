//! Shared primitives for the S3 failure notification handler.
//!
//! This crate owns event decoding, failure key derivation, notification
//! content and configuration. It excludes AWS SDK and Lambda runtime
//! concerns; those live in `s3_failure_lambda`.

pub mod config;
pub mod error;
pub mod event;
pub mod keys;
pub mod notification;

pub use config::NotifyConfig;
pub use error::NotifyError;
pub use event::{EventRecord, QueueBatch, QueueMessage};
