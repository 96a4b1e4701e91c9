//! AWS-oriented adapters and handlers for the S3 failure notification Lambda.
//!
//! The handler logic is written against the `ObjectStore` and `Mailer`
//! seams; the SDK-backed implementations live in the `failure_notify`
//! binary.

pub mod adapters;
pub mod handlers;
