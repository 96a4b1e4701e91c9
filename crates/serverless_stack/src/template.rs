use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

use crate::bucket::Bucket;

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";
pub const BUCKET_RESOURCE_TYPE: &str = "AWS::S3::Bucket";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub resources: BTreeMap<String, Resource>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    pub properties: BucketProperties,
    pub update_replace_policy: String,
    pub deletion_policy: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct BucketProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_access_block_configuration: Option<PublicAccessBlockConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versioning_configuration: Option<VersioningConfiguration>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PublicAccessBlockConfiguration {
    pub block_public_acls: bool,
    pub block_public_policy: bool,
    pub ignore_public_acls: bool,
    pub restrict_public_buckets: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VersioningConfiguration {
    #[serde(rename = "Status")]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub description: String,
    pub value: Value,
}

impl Resource {
    pub fn for_bucket(bucket: &Bucket) -> Self {
        let props = &bucket.props;
        let public_access_block_configuration =
            props
                .block_public_access
                .map(|block| PublicAccessBlockConfiguration {
                    block_public_acls: block.block_public_acls,
                    block_public_policy: block.block_public_policy,
                    ignore_public_acls: block.ignore_public_acls,
                    restrict_public_buckets: block.restrict_public_buckets,
                });
        let versioning_configuration = props.versioned.then(|| VersioningConfiguration {
            status: "Enabled".to_string(),
        });

        Self {
            resource_type: BUCKET_RESOURCE_TYPE.to_string(),
            properties: BucketProperties {
                public_access_block_configuration,
                versioning_configuration,
            },
            update_replace_policy: props.removal_policy.as_str().to_string(),
            deletion_policy: props.removal_policy.as_str().to_string(),
        }
    }
}

impl Output {
    pub fn bucket_name(bucket: &Bucket) -> Self {
        Self {
            description: format!("Name of the {} bucket", bucket.id),
            value: json!({ "Ref": bucket.logical_id }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::{BlockPublicAccess, BucketProps, RemovalPolicy};

    fn bucket(props: BucketProps) -> Bucket {
        Bucket {
            id: "cdk-bucket".to_string(),
            logical_id: "CdkBucket".to_string(),
            props,
        }
    }

    #[test]
    fn unversioned_bucket_omits_versioning_configuration() {
        let resource = Resource::for_bucket(&bucket(BucketProps::default()));
        let rendered = serde_json::to_value(&resource).expect("resource should serialize");

        assert_eq!(rendered["Type"], "AWS::S3::Bucket");
        assert_eq!(rendered["Properties"], json!({}));
        assert_eq!(rendered["DeletionPolicy"], "Retain");
    }

    #[test]
    fn renders_public_access_flags_and_versioning() {
        let resource = Resource::for_bucket(&bucket(BucketProps {
            versioned: true,
            block_public_access: Some(BlockPublicAccess::BLOCK_ALL),
            removal_policy: RemovalPolicy::Destroy,
        }));
        let rendered = serde_json::to_value(&resource).expect("resource should serialize");

        assert_eq!(
            rendered["Properties"],
            json!({
                "PublicAccessBlockConfiguration": {
                    "BlockPublicAcls": true,
                    "BlockPublicPolicy": true,
                    "IgnorePublicAcls": true,
                    "RestrictPublicBuckets": true
                },
                "VersioningConfiguration": {"Status": "Enabled"}
            })
        );
        assert_eq!(rendered["UpdateReplacePolicy"], "Delete");
    }
}
