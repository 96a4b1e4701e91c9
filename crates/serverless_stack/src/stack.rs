use std::collections::BTreeMap;

use crate::bucket::{BlockPublicAccess, Bucket, BucketProps};
use crate::error::StackError;
use crate::template::{Output, Resource, Template, TEMPLATE_FORMAT_VERSION};

pub const SERVERLESS_BUCKET_ID: &str = "cdk-bucket";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    id: String,
    description: Option<String>,
    buckets: Vec<Bucket>,
}

impl Stack {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
            buckets: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn add_bucket(&mut self, id: &str, props: BucketProps) -> Result<&Bucket, StackError> {
        let logical_id = logical_id(id)?;
        if self
            .buckets
            .iter()
            .any(|bucket| bucket.id == id || bucket.logical_id == logical_id)
        {
            return Err(StackError::DuplicateConstruct(id.to_string()));
        }

        let bucket = Bucket {
            id: id.to_string(),
            logical_id,
            props,
        };
        tracing::debug!(
            stack = %self.id,
            construct = id,
            logical_id = %bucket.logical_id,
            "declared bucket"
        );
        self.buckets.push(bucket);
        Ok(self.buckets.last().expect("bucket was just pushed"))
    }

    pub fn synthesize(&self) -> Template {
        let mut resources = BTreeMap::new();
        let mut outputs = BTreeMap::new();
        for bucket in &self.buckets {
            resources.insert(bucket.logical_id.clone(), Resource::for_bucket(bucket));
            outputs.insert(
                format!("{}Name", bucket.logical_id),
                Output::bucket_name(bucket),
            );
        }

        Template {
            format_version: TEMPLATE_FORMAT_VERSION.to_string(),
            description: self.description.clone(),
            resources,
            outputs,
        }
    }

    pub fn to_template_json(&self) -> Result<String, StackError> {
        Ok(serde_json::to_string_pretty(&self.synthesize())?)
    }
}

/// The stack holding the private, versioned bucket.
#[derive(Debug, Clone, Copy)]
pub struct ServerlessStack;

impl ServerlessStack {
    pub fn build(stack_id: &str) -> Result<Stack, StackError> {
        let mut stack = Stack::new(stack_id)
            .with_description("Private versioned bucket for failed file processing");
        stack.add_bucket(
            SERVERLESS_BUCKET_ID,
            BucketProps {
                versioned: true,
                block_public_access: Some(BlockPublicAccess::BLOCK_ALL),
                ..BucketProps::default()
            },
        )?;
        Ok(stack)
    }
}

/// `cdk-bucket` becomes `CdkBucket`.
fn logical_id(construct_id: &str) -> Result<String, StackError> {
    let logical: String = construct_id
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    if logical.is_empty() {
        return Err(StackError::InvalidConstructId(construct_id.to_string()));
    }
    Ok(logical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_ids_are_pascal_cased_alphanumerics() {
        assert_eq!(logical_id("cdk-bucket").expect("valid id"), "CdkBucket");
        assert_eq!(
            logical_id("raw_uploads.v2").expect("valid id"),
            "RawUploadsV2"
        );
        assert!(matches!(
            logical_id("--"),
            Err(StackError::InvalidConstructId(_))
        ));
    }

    #[test]
    fn rejects_duplicate_constructs() {
        let mut stack = Stack::new("test");
        stack
            .add_bucket("cdk-bucket", BucketProps::default())
            .expect("first bucket");

        let error = stack
            .add_bucket("cdk_bucket", BucketProps::default())
            .expect_err("logical id collides");
        assert!(matches!(error, StackError::DuplicateConstruct(_)));
        assert_eq!(stack.buckets().len(), 1);
    }

    #[test]
    fn serverless_stack_declares_one_private_versioned_bucket() {
        let stack = ServerlessStack::build("serverless").expect("stack should build");

        assert_eq!(stack.id(), "serverless");
        let buckets = stack.buckets();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].id, SERVERLESS_BUCKET_ID);
        assert!(buckets[0].props.versioned);
        assert_eq!(
            buckets[0].props.block_public_access,
            Some(BlockPublicAccess::BLOCK_ALL)
        );
    }
}
