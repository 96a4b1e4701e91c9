use s3_failure_core::event::parse_queue_batch;
use s3_failure_core::notification::FailureNotification;
use s3_failure_core::{EventRecord, NotifyConfig, NotifyError, QueueBatch};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapters::mailer::Mailer;
use crate::adapters::object_store::ObjectStore;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchSummary {
    pub messages: usize,
    pub records: usize,
    pub failure_keys: Vec<String>,
}

/// Entry point for the raw Lambda payload.
pub fn handle_queue_event(
    event: Value,
    config: &NotifyConfig,
    store: &impl ObjectStore,
    mailer: &impl Mailer,
) -> Result<BatchSummary, NotifyError> {
    tracing::info!(event = %event, "received queue batch");

    let batch = parse_queue_batch(event).inspect_err(|error| {
        tracing::error!(code = error.code(), error = %error, "rejected queue batch");
    })?;
    handle_queue_batch(&batch, config, store, mailer)
}

/// Moves every referenced object under `FAILURE/` and notifies the recipient.
///
/// The first failure aborts the batch and is returned as-is. The last record
/// touched is logged whether or not the batch succeeded.
pub fn handle_queue_batch(
    batch: &QueueBatch,
    config: &NotifyConfig,
    store: &impl ObjectStore,
    mailer: &impl Mailer,
) -> Result<BatchSummary, NotifyError> {
    let mut last_record: Option<EventRecord> = None;
    let result = process_batch(batch, config, store, mailer, &mut last_record);

    match &last_record {
        Some(record) => tracing::debug!(
            bucket = %record.bucket,
            key = %record.key,
            "last processed record"
        ),
        None => tracing::debug!("no record processed"),
    }

    match &result {
        Ok(summary) => tracing::info!(
            messages = summary.messages,
            records = summary.records,
            "batch completed"
        ),
        Err(error) => tracing::error!(code = error.code(), error = %error, "batch failed"),
    }

    result
}

fn process_batch(
    batch: &QueueBatch,
    config: &NotifyConfig,
    store: &impl ObjectStore,
    mailer: &impl Mailer,
    last_record: &mut Option<EventRecord>,
) -> Result<BatchSummary, NotifyError> {
    let mut summary = BatchSummary::default();

    for message in &batch.records {
        let records = message.event_records()?;
        tracing::debug!(
            message_id = message.message_id.as_deref().unwrap_or_default(),
            records = records.len(),
            "decoded storage event"
        );

        for record in records {
            *last_record = Some(record.clone());
            let failure_key = move_to_failure(&record, store)?;
            notify(&record, config, mailer)?;
            summary.records += 1;
            summary.failure_keys.push(failure_key);
        }
        summary.messages += 1;
    }

    Ok(summary)
}

fn move_to_failure(record: &EventRecord, store: &impl ObjectStore) -> Result<String, NotifyError> {
    let failure_key = record.failure_key();

    store
        .copy_object(&record.bucket, &record.key, &failure_key)
        .map_err(|message| NotifyError::Copy {
            bucket: record.bucket.clone(),
            key: record.key.clone(),
            message,
        })?;

    store
        .delete_object(&record.bucket, &record.key)
        .map_err(|message| NotifyError::Delete {
            bucket: record.bucket.clone(),
            key: record.key.clone(),
            message,
        })?;

    tracing::info!(
        bucket = %record.bucket,
        key = %record.key,
        failure_key = %failure_key,
        "moved object to failure prefix"
    );
    Ok(failure_key)
}

fn notify(
    record: &EventRecord,
    config: &NotifyConfig,
    mailer: &impl Mailer,
) -> Result<(), NotifyError> {
    let notification = FailureNotification::for_record(record, config);
    mailer
        .send_email(&notification)
        .map_err(|message| NotifyError::Email {
            bucket: record.bucket.clone(),
            key: record.key.clone(),
            message,
        })
}
