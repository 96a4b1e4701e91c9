use serde::Serialize;

use crate::config::NotifyConfig;
use crate::event::EventRecord;

pub const FAILURE_SUBJECT: &str = "File Processing Failed";
pub const CHARSET: &str = "UTF-8";

/// Plain-text email telling the operator where the failed file was moved.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FailureNotification {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl FailureNotification {
    pub fn for_record(record: &EventRecord, config: &NotifyConfig) -> Self {
        Self {
            from: config.sender_email.clone(),
            to: vec![config.recipient_email.clone()],
            reply_to: vec![config.sender_email.clone()],
            subject: FAILURE_SUBJECT.to_string(),
            body: failure_body(&record.failure_key(), &record.bucket),
        }
    }
}

pub fn failure_body(failure_key: &str, bucket: &str) -> String {
    format!("Check the unprocessed file {failure_key} located at {bucket}")
}
