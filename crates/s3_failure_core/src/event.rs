use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::NotifyError;
use crate::keys::failure_object_key;

pub const S3_TEST_EVENT: &str = "s3:TestEvent";

/// SQS batch as delivered to the Lambda function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueBatch {
    #[serde(rename = "Records")]
    pub records: Vec<QueueMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueMessage {
    #[serde(rename = "messageId", default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Bucket and decoded object key of one object-created notification.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EventRecord {
    #[serde(rename = "bucketName")]
    pub bucket: String,
    pub key: String,
}

impl EventRecord {
    pub fn failure_key(&self) -> String {
        failure_object_key(&self.key)
    }
}

#[derive(Debug, Deserialize)]
struct StorageEvent {
    #[serde(rename = "Records")]
    records: Option<Vec<StorageRecord>>,
    #[serde(rename = "Event")]
    event: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StorageRecord {
    s3: StorageEntity,
}

#[derive(Debug, Deserialize)]
struct StorageEntity {
    bucket: StorageBucket,
    object: StorageObject,
}

#[derive(Debug, Deserialize)]
struct StorageBucket {
    name: String,
}

#[derive(Debug, Deserialize)]
struct StorageObject {
    key: String,
}

pub fn parse_queue_batch(value: Value) -> Result<QueueBatch, NotifyError> {
    serde_json::from_value(value)
        .map_err(|error| NotifyError::malformed(format!("invalid queue batch: {error}")))
}

impl QueueMessage {
    pub fn event_records(&self) -> Result<Vec<EventRecord>, NotifyError> {
        let Some(body) = self.body.as_deref() else {
            return Err(NotifyError::malformed(format!(
                "queue message {} has no body",
                self.message_id.as_deref().unwrap_or("<unknown>")
            )));
        };
        parse_storage_event(body)
    }
}

/// Decodes the S3 notification carried in a queue message body.
///
/// The `s3:TestEvent` sent when a notification is first configured carries
/// no records and decodes to an empty list.
pub fn parse_storage_event(body: &str) -> Result<Vec<EventRecord>, NotifyError> {
    let event: StorageEvent = serde_json::from_str(body)
        .map_err(|error| NotifyError::malformed(format!("invalid storage event: {error}")))?;

    let Some(records) = event.records else {
        if event.event.as_deref() == Some(S3_TEST_EVENT) {
            tracing::debug!("skipping s3 test event");
            return Ok(Vec::new());
        }
        return Err(NotifyError::malformed("storage event has no Records"));
    };

    records
        .into_iter()
        .map(|record| {
            let bucket = record.s3.bucket.name;
            if bucket.is_empty() {
                return Err(NotifyError::malformed("bucket name cannot be empty"));
            }
            let key = decode_object_key(&record.s3.object.key)?;
            if key.is_empty() {
                return Err(NotifyError::malformed("object key cannot be empty"));
            }
            Ok(EventRecord { bucket, key })
        })
        .collect()
}

/// S3 notifications carry form-encoded keys: `+` stands for a space.
pub fn decode_object_key(raw: &str) -> Result<String, NotifyError> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|error| {
            NotifyError::malformed(format!("object key {raw:?} is not UTF-8: {error}"))
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn storage_event(records: &[(&str, &str)]) -> String {
        let records: Vec<Value> = records
            .iter()
            .map(|(bucket, key)| {
                json!({
                    "eventName": "ObjectCreated:Put",
                    "s3": {
                        "bucket": {"name": bucket, "arn": format!("arn:aws:s3:::{bucket}")},
                        "object": {"key": key, "size": 1024}
                    }
                })
            })
            .collect();
        json!({ "Records": records }).to_string()
    }

    #[test]
    fn extracts_every_record_in_order() {
        let body = storage_event(&[
            ("uploads", "INCOMING/ALL_EMAILS/a.csv"),
            ("uploads", "INCOMING/ALL_EMAILS/b.csv"),
        ]);

        let records = parse_storage_event(&body).expect("event should parse");
        assert_eq!(
            records,
            vec![
                EventRecord {
                    bucket: "uploads".to_string(),
                    key: "INCOMING/ALL_EMAILS/a.csv".to_string(),
                },
                EventRecord {
                    bucket: "uploads".to_string(),
                    key: "INCOMING/ALL_EMAILS/b.csv".to_string(),
                },
            ]
        );
    }

    #[test]
    fn decodes_form_encoded_keys() {
        let body = storage_event(&[("uploads", "INCOMING/monthly+report%282%29.csv")]);
        let records = parse_storage_event(&body).expect("event should parse");
        assert_eq!(records[0].key, "INCOMING/monthly report(2).csv");
        assert_eq!(
            records[0].failure_key(),
            "FAILURE/INCOMING/monthly report(2).csv"
        );
    }

    #[test]
    fn test_event_yields_no_records() {
        let body = json!({
            "Service": "Amazon S3",
            "Event": "s3:TestEvent",
            "Bucket": "uploads"
        })
        .to_string();

        assert!(parse_storage_event(&body).expect("test event").is_empty());
    }

    #[test]
    fn rejects_body_that_is_not_json() {
        let error = parse_storage_event("not json").expect_err("should fail");
        assert!(matches!(error, NotifyError::MalformedEvent(_)));
    }

    #[test]
    fn rejects_record_without_object_key() {
        let body = json!({
            "Records": [{"s3": {"bucket": {"name": "uploads"}, "object": {"size": 1}}}]
        })
        .to_string();

        let error = parse_storage_event(&body).expect_err("should fail");
        assert!(error.to_string().contains("key"));
    }

    #[test]
    fn rejects_key_that_is_not_utf8_after_decoding() {
        let body = storage_event(&[("uploads", "INCOMING/a%FF")]);
        let error = parse_storage_event(&body).expect_err("should fail");

        assert!(matches!(error, NotifyError::MalformedEvent(_)));
        assert!(error.to_string().contains("not UTF-8"));
    }

    #[test]
    fn rejects_empty_object_key() {
        let body = storage_event(&[("uploads", "")]);
        let error = parse_storage_event(&body).expect_err("should fail");
        assert_eq!(error, NotifyError::malformed("object key cannot be empty"));
    }

    #[test]
    fn stray_percent_signs_are_kept_verbatim() {
        assert_eq!(
            decode_object_key("100%+done%").expect("decodes"),
            "100% done%"
        );
        assert_eq!(decode_object_key("+").expect("decodes"), " ");
    }

    #[test]
    fn rejects_empty_bucket_name() {
        let body = storage_event(&[("", "INCOMING/a.csv")]);
        let error = parse_storage_event(&body).expect_err("should fail");
        assert_eq!(error, NotifyError::malformed("bucket name cannot be empty"));
    }

    #[test]
    fn rejects_event_without_records() {
        let error = parse_storage_event("{}").expect_err("should fail");
        assert_eq!(
            error,
            NotifyError::malformed("storage event has no Records")
        );
    }

    #[test]
    fn message_without_body_is_malformed() {
        let message = QueueMessage {
            message_id: Some("m-1".to_string()),
            body: None,
        };
        let error = message.event_records().expect_err("should fail");
        assert_eq!(
            error,
            NotifyError::malformed("queue message m-1 has no body")
        );
    }

    #[test]
    fn queue_batch_requires_records() {
        let error = parse_queue_batch(json!({"detail": {}})).expect_err("should fail");
        assert!(matches!(error, NotifyError::MalformedEvent(_)));

        let batch = parse_queue_batch(json!({
            "Records": [{"messageId": "m-1", "body": "{}", "eventSource": "aws:sqs"}]
        }))
        .expect("batch should parse");
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].message_id.as_deref(), Some("m-1"));
    }
}
