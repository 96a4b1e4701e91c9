use crate::error::NotifyError;

pub const SENDER_EMAIL_VAR: &str = "SENDER_EMAIL";
pub const RECIPIENT_EMAIL_VAR: &str = "RECIPIENT_EMAIL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyConfig {
    pub sender_email: String,
    pub recipient_email: String,
}

impl NotifyConfig {
    pub fn from_env() -> Result<Self, NotifyError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, NotifyError> {
        let required = |variable: &'static str| {
            lookup(variable)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(NotifyError::Misconfigured { variable })
        };

        Ok(Self {
            sender_email: required(SENDER_EMAIL_VAR)?,
            recipient_email: required(RECIPIENT_EMAIL_VAR)?,
        })
    }
}
