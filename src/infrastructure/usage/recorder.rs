//! Fire-and-forget usage recording
//!
//! Recording happens on a detached task after the response is already
//! determined. Both the fact row and the daily aggregate are written; any
//! failure is logged and dropped so billing writes can never alter an HTTP
//! outcome. Usage may undercount during storage outages.

use std::sync::Arc;
use tracing::warn;

use crate::domain::usage::{UsageEvent, UsageRepository};

#[derive(Debug, Clone)]
pub struct UsageRecorder {
    usage: Arc<dyn UsageRepository>,
}

impl UsageRecorder {
    pub fn new(usage: Arc<dyn UsageRepository>) -> Self {
        Self { usage }
    }

    /// Dispatch the event without waiting for the writes.
    pub fn record(&self, event: UsageEvent) {
        let usage = self.usage.clone();

        tokio::spawn(async move {
            if let Err(err) = Self::write(usage.as_ref(), &event).await {
                warn!(
                    organization_id = %event.organization_id,
                    endpoint = %event.endpoint,
                    error = %err,
                    "failed to record usage event"
                );
            }
        });
    }

    /// Write both the fact row and the aggregate, awaiting completion.
    /// Used directly by tests and by the detached task above.
    pub async fn record_now(&self, event: &UsageEvent) -> Result<(), crate::domain::DomainError> {
        Self::write(self.usage.as_ref(), event).await
    }

    async fn write(
        usage: &dyn UsageRepository,
        event: &UsageEvent,
    ) -> Result<(), crate::domain::DomainError> {
        usage.insert_event(event).await?;
        usage.increment_daily(&event.daily_key(), 1, 1).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credential::CredentialId;
    use crate::domain::organization::OrganizationId;
    use crate::infrastructure::usage::InMemoryUsageRepository;

    fn event() -> UsageEvent {
        UsageEvent::new(
            CredentialId::generate(),
            OrganizationId::generate(),
            "/v1/vehicles",
            "GET",
        )
    }

    #[tokio::test]
    async fn test_record_now_writes_event_and_aggregate() {
        let repo = Arc::new(InMemoryUsageRepository::new());
        let recorder = UsageRecorder::new(repo.clone());

        recorder.record_now(&event()).await.unwrap();

        assert_eq!(repo.event_count().await, 1);
        assert_eq!(repo.daily_aggregates().await.len(), 1);
    }

    #[tokio::test]
    async fn test_record_failure_is_swallowed() {
        let repo = Arc::new(InMemoryUsageRepository::new());
        repo.set_should_fail(true).await;
        let recorder = UsageRecorder::new(repo.clone());

        // Must not panic or propagate anything.
        recorder.record(event());
        tokio::task::yield_now().await;

        assert_eq!(repo.daily_aggregates().await.len(), 0);
    }
}
