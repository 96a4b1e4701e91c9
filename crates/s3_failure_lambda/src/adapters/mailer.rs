use s3_failure_core::notification::FailureNotification;

pub trait Mailer {
    fn send_email(&self, notification: &FailureNotification) -> Result<(), String>;
}
