#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPublicAccess {
    pub block_public_acls: bool,
    pub block_public_policy: bool,
    pub ignore_public_acls: bool,
    pub restrict_public_buckets: bool,
}

impl BlockPublicAccess {
    pub const BLOCK_ALL: Self = Self {
        block_public_acls: true,
        block_public_policy: true,
        ignore_public_acls: true,
        restrict_public_buckets: true,
    };

    pub fn blocks_everything(&self) -> bool {
        *self == Self::BLOCK_ALL
    }
}

/// What CloudFormation does with the bucket when it leaves the stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemovalPolicy {
    #[default]
    Retain,
    Destroy,
}

impl RemovalPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Retain => "Retain",
            Self::Destroy => "Delete",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketProps {
    pub versioned: bool,
    pub block_public_access: Option<BlockPublicAccess>,
    pub removal_policy: RemovalPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub id: String,
    pub logical_id: String,
    pub props: BucketProps,
}
