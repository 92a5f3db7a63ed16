use async_trait::async_trait;
use service_core::error::AppError;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Notification channel unavailable")]
    Unavailable,
}

impl From<NotifierError> for AppError {
    fn from(err: NotifierError) -> Self {
        match err {
            NotifierError::Delivery(e) => AppError::InternalError(anyhow::anyhow!(e)),
            NotifierError::Unavailable => AppError::ServiceUnavailable,
        }
    }
}

/// Delivers an issued temporary password to its owner.
#[async_trait]
pub trait CredentialNotifier: Send + Sync {
    async fn send_temporary_password(
        &self,
        to_email: &str,
        full_name: &str,
        temporary_password: &str,
    ) -> Result<(), NotifierError>;
}

/// Records that a credential was issued without delivering it anywhere.
#[derive(Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl CredentialNotifier for LogNotifier {
    async fn send_temporary_password(
        &self,
        to_email: &str,
        full_name: &str,
        _temporary_password: &str,
    ) -> Result<(), NotifierError> {
        tracing::info!(
            to_email = %to_email,
            full_name = %full_name,
            "Temporary password issued; no delivery channel configured"
        );
        Ok(())
    }
}

/// Keeps every notification in memory; can be told to fail.
#[derive(Default)]
pub struct MockNotifier {
    pub sent: Mutex<Vec<(String, String, String)>>,
    pub fail: bool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.sent
            .lock()
            .map(|sent| sent.iter().map(|(email, _, _)| email.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CredentialNotifier for MockNotifier {
    async fn send_temporary_password(
        &self,
        to_email: &str,
        full_name: &str,
        temporary_password: &str,
    ) -> Result<(), NotifierError> {
        if self.fail {
            return Err(NotifierError::Unavailable);
        }
        self.sent
            .lock()
            .map_err(|e| NotifierError::Delivery(format!("mock notifier mutex poisoned: {}", e)))?
            .push((
                to_email.to_string(),
                full_name.to_string(),
                temporary_password.to_string(),
            ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_records_deliveries() {
        let notifier = MockNotifier::new();
        tokio_test::assert_ok!(
            notifier
                .send_temporary_password("ana@example.com", "Ana Ruiz", "Tmp#1234")
                .await
        );
        assert_eq!(notifier.sent_to(), vec!["ana@example.com".to_string()]);
    }

    #[tokio::test]
    async fn failing_mock_reports_an_error() {
        let notifier = MockNotifier::failing();
        let result = notifier
            .send_temporary_password("ana@example.com", "Ana Ruiz", "Tmp#1234")
            .await;
        assert!(matches!(result, Err(NotifierError::Unavailable)));
        assert!(notifier.sent_to().is_empty());
        assert_eq!(
            AppError::from(NotifierError::Unavailable).status_code(),
            axum::http::StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
