use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use s3_failure_core::keys::copy_source;
use s3_failure_core::notification::{FailureNotification, CHARSET};
use s3_failure_core::NotifyConfig;
use s3_failure_lambda::adapters::mailer::Mailer;
use s3_failure_lambda::adapters::object_store::ObjectStore;
use s3_failure_lambda::handlers::failure::{handle_queue_event, BatchSummary};
use tracing_subscriber::EnvFilter;

struct S3ObjectStore {
    s3_client: aws_sdk_s3::Client,
}

impl ObjectStore for S3ObjectStore {
    fn copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> Result<(), String> {
        let bucket = bucket.to_string();
        let source = copy_source(&bucket, source_key);
        let destination_key = destination_key.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .copy_object()
                    .bucket(bucket)
                    .copy_source(source)
                    .key(destination_key)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to copy object in s3: {error}"))
            })
        })
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), String> {
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .delete_object()
                    .bucket(bucket)
                    .key(object_key)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to delete object from s3: {error}"))
            })
        })
    }
}

struct SesMailer {
    ses_client: aws_sdk_sesv2::Client,
}

impl Mailer for SesMailer {
    fn send_email(&self, notification: &FailureNotification) -> Result<(), String> {
        let content = build_email_content(notification)?;
        let destination = Destination::builder()
            .set_to_addresses(Some(notification.to.clone()))
            .build();
        let from = notification.from.clone();
        let reply_to = notification.reply_to.clone();
        let client = self.ses_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .send_email()
                    .from_email_address(from)
                    .destination(destination)
                    .set_reply_to_addresses(Some(reply_to))
                    .content(content)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to send email via ses: {error}"))
            })
        })
    }
}

fn build_email_content(notification: &FailureNotification) -> Result<EmailContent, String> {
    let subject = Content::builder()
        .data(notification.subject.as_str())
        .charset(CHARSET)
        .build()
        .map_err(|error| format!("failed to build email subject: {error}"))?;
    let text = Content::builder()
        .data(notification.body.as_str())
        .charset(CHARSET)
        .build()
        .map_err(|error| format!("failed to build email body: {error}"))?;

    let message = Message::builder()
        .subject(subject)
        .body(Body::builder().text(text).build())
        .build();
    Ok(EmailContent::builder().simple(message).build())
}

async fn handle_request(
    event: LambdaEvent<serde_json::Value>,
    config: &NotifyConfig,
    store: &S3ObjectStore,
    mailer: &SesMailer,
) -> Result<BatchSummary, Error> {
    tracing::debug!(request_id = %event.context.request_id, "handling invocation");
    handle_queue_event(event.payload, config, store, mailer).map_err(Error::from)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = NotifyConfig::from_env()?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = S3ObjectStore {
        s3_client: aws_sdk_s3::Client::new(&aws_config),
    };
    let mailer = SesMailer {
        ses_client: aws_sdk_sesv2::Client::new(&aws_config),
    };
    tracing::info!(recipient = %config.recipient_email, "failure notifier initialised");

    lambda_runtime::run(service_fn(|event| {
        handle_request(event, &config, &store, &mailer)
    }))
    .await
}
