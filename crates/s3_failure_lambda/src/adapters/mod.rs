pub mod mailer;
pub mod object_store;
