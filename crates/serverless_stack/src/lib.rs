//! Declarative stack for the private, versioned storage bucket.
//!
//! `ServerlessStack` declares the resources; `Stack::synthesize` renders the
//! CloudFormation template that gets deployed.

pub mod bucket;
pub mod error;
pub mod stack;
pub mod template;

pub use bucket::{BlockPublicAccess, BucketProps, RemovalPolicy};
pub use error::StackError;
pub use stack::{ServerlessStack, Stack, SERVERLESS_BUCKET_ID};
pub use template::Template;
