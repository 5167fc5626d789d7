//! Release service - applies a planned batch of service updates
//!
//! Ordinary updates go to the platform in one call and get a per-service
//! outcome. Updates to the releaser itself are applied afterwards without
//! waiting for a reply, since the process applying them may be restarted.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::domain::{
    partition, summarise_update, ReleaseResult, ReleaseStatus, SelfServiceNames, ServiceId,
    ServiceUpdate,
};
use crate::error::ApplyError;
use crate::infrastructure::{EventLog, Platform, ServiceDefinition};

/// Service for applying releases
pub struct ReleaseService {
    platform: Arc<dyn Platform>,
    events: Arc<dyn EventLog>,
    self_names: SelfServiceNames,
}

impl ReleaseService {
    /// Create a new release service
    pub fn new(platform: Arc<dyn Platform>, events: Arc<dyn EventLog>) -> Self {
        Self {
            platform,
            events,
            self_names: SelfServiceNames::default(),
        }
    }

    /// Builder: set the names that identify the releaser's own services
    pub fn with_self_names(mut self, names: SelfServiceNames) -> Self {
        self.self_names = names;
        self
    }

    /// Apply `updates` to the platform, recording each outcome in `results`.
    ///
    /// Returns an error only when the platform failed the whole batch; every
    /// service in `updates` is then marked unknown and the self updates are
    /// not attempted. The ledger message is the error's full chain, i.e.
    /// `format!("{:#}", err)` of the returned error. Per-service failures are
    /// recorded in `results` and do not fail the call.
    pub async fn apply_changes(
        &self,
        updates: &[ServiceUpdate],
        results: &mut ReleaseResult,
    ) -> Result<()> {
        let batch = partition(updates, &self.self_names);
        info!(
            ordinary = batch.ordinary.len(),
            self_updates = batch.self_updates.len(),
            "Applying release"
        );

        for update in updates {
            let (namespace, service_name) = update.service_id.components();
            let summary = summarise_update(&update.updates);
            if self.self_names.matches(service_name) {
                self.events.log_event(
                    namespace,
                    service_name,
                    &format!("Starting {}. (no result expected)", summary),
                );
            } else {
                self.events
                    .log_event(namespace, service_name, &format!("Starting {}", summary));
            }
            // Successful until we hear otherwise
            results.mark_provisional_success(update);
        }

        let defs = batch
            .ordinary
            .iter()
            .map(|update| ServiceDefinition::from_update(update, false))
            .collect();

        match self.platform.apply(defs).await {
            Ok(()) => {}
            Err(ApplyError::PerService(causes)) => {
                let ordinary: HashSet<&ServiceId> =
                    batch.ordinary.iter().map(|u| &u.service_id).collect();
                for (id, cause) in causes {
                    if !ordinary.contains(&id) {
                        warn!(service_id = %id, "Ignoring apply error for service outside the release");
                        continue;
                    }
                    results.mark(&id, ReleaseStatus::Failed, cause);
                }
            }
            Err(ApplyError::Coverall(err)) => {
                // Nothing can be said about any service, self updates included;
                // those are not attempted.
                let message = format!("{:#}", err);
                error!(error = %message, "Release apply failed for the whole batch");
                for update in updates {
                    results.mark(&update.service_id, ReleaseStatus::Unknown, &message);
                }
                return Err(err);
            }
        }

        for update in &batch.ordinary {
            self.report(&update.service_id, results);
        }

        if !batch.self_updates.is_empty() {
            let defs = batch
                .self_updates
                .iter()
                .map(|update| ServiceDefinition::from_update(update, true))
                .collect();
            // The reply, if any, is of no use: this release restarts us.
            if let Err(e) = self.platform.apply(defs).await {
                debug!(error = %e, "Discarding result of self update");
            }
        }

        Ok(())
    }

    fn report(&self, id: &ServiceId, results: &ReleaseResult) {
        let (namespace, service_name) = id.components();
        let Some(result) = results.get(id) else {
            error!(service_id = %id, "No release result recorded for service");
            return;
        };
        let summary = summarise_update(&result.per_container);
        let error = result.error.as_deref().unwrap_or_default();
        let message = match result.status {
            ReleaseStatus::Success => format!("Release {} succeeded", summary),
            ReleaseStatus::Failed => format!("Release {} failed: {}", summary, error),
            ReleaseStatus::Unknown => format!("Release {} outcome unknown: {}", summary, error),
        };
        self.events.log_event(namespace, service_name, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContainerUpdate, ServiceResult};
    use async_trait::async_trait;
    use std::collections::{BTreeMap, VecDeque};
    use std::sync::Mutex;

    enum Reply {
        Ok,
        PerService(Vec<(&'static str, &'static str)>),
        Coverall(&'static str),
    }

    #[derive(Default)]
    struct FakePlatform {
        replies: Mutex<VecDeque<Reply>>,
        calls: Mutex<Vec<Vec<ServiceDefinition>>>,
    }

    impl FakePlatform {
        fn replying(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::default(),
            })
        }

        fn calls(&self) -> Vec<Vec<ServiceDefinition>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Platform for FakePlatform {
        async fn apply(&self, defs: Vec<ServiceDefinition>) -> Result<(), ApplyError> {
            self.calls.lock().unwrap().push(defs);
            match self.replies.lock().unwrap().pop_front().unwrap_or(Reply::Ok) {
                Reply::Ok => Ok(()),
                Reply::PerService(causes) => Err(ApplyError::PerService(
                    causes
                        .into_iter()
                        .map(|(id, cause)| (id.parse().unwrap(), cause.to_string()))
                        .collect::<BTreeMap<_, _>>(),
                )),
                Reply::Coverall(message) => Err(anyhow::anyhow!(message).into()),
            }
        }
    }

    #[derive(Default)]
    struct RecordingEventLog {
        events: Mutex<Vec<(String, String, String)>>,
    }

    impl RecordingEventLog {
        fn messages_for(&self, id: &str) -> Vec<String> {
            let (namespace, service) = id.split_once('/').unwrap();
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|(ns, svc, _)| ns == namespace && svc == service)
                .map(|(_, _, message)| message.clone())
                .collect()
        }

        fn release_lines(&self) -> Vec<String> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, _, message)| message.starts_with("Release "))
                .map(|(ns, svc, message)| format!("{}/{}: {}", ns, svc, message))
                .collect()
        }
    }

    impl EventLog for RecordingEventLog {
        fn log_event(&self, namespace: &str, service: &str, message: &str) {
            self.events.lock().unwrap().push((
                namespace.to_string(),
                service.to_string(),
                message.to_string(),
            ));
        }
    }

    fn update(id: &str) -> ServiceUpdate {
        ServiceUpdate::new(id.parse().unwrap(), format!("# manifest for {}", id))
    }

    fn id(raw: &str) -> ServiceId {
        raw.parse().unwrap()
    }

    fn service(platform: &Arc<FakePlatform>, events: &Arc<RecordingEventLog>) -> ReleaseService {
        ReleaseService::new(platform.clone(), events.clone())
    }

    fn status(results: &ReleaseResult, raw: &str) -> ReleaseStatus {
        results.get(&id(raw)).unwrap().status
    }

    #[tokio::test]
    async fn test_all_succeed() {
        let platform = FakePlatform::replying(vec![]);
        let events = Arc::new(RecordingEventLog::default());
        let updates = vec![
            update("ns/a").with_update(ContainerUpdate::new("app", "a:1", "a:2")),
            update("ns/b"),
        ];
        let mut results = ReleaseResult::new();

        service(&platform, &events)
            .apply_changes(&updates, &mut results)
            .await
            .unwrap();

        assert_eq!(status(&results, "ns/a"), ReleaseStatus::Success);
        assert_eq!(status(&results, "ns/b"), ReleaseStatus::Success);
        assert_eq!(
            events.release_lines(),
            vec![
                "ns/a: Release app (a:1 -> a:2) succeeded",
                "ns/b: Release (no image changes) succeeded",
            ]
        );
        assert_eq!(platform.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_per_service_failures_are_localized() {
        let platform =
            FakePlatform::replying(vec![Reply::PerService(vec![("ns/b", "image pull failed")])]);
        let events = Arc::new(RecordingEventLog::default());
        let updates = vec![update("ns/a"), update("ns/b"), update("ns/c")];
        let mut results = ReleaseResult::new();

        service(&platform, &events)
            .apply_changes(&updates, &mut results)
            .await
            .unwrap();

        assert_eq!(status(&results, "ns/a"), ReleaseStatus::Success);
        assert_eq!(status(&results, "ns/c"), ReleaseStatus::Success);
        let failed = results.get(&id("ns/b")).unwrap();
        assert_eq!(failed.status, ReleaseStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("image pull failed"));
        assert_eq!(
            events.release_lines(),
            vec![
                "ns/a: Release (no image changes) succeeded",
                "ns/b: Release (no image changes) failed: image pull failed",
                "ns/c: Release (no image changes) succeeded",
            ]
        );
    }

    #[tokio::test]
    async fn test_per_service_error_outside_batch_is_ignored() {
        let platform = FakePlatform::replying(vec![Reply::PerService(vec![(
            "other/stranger",
            "boom",
        )])]);
        let events = Arc::new(RecordingEventLog::default());
        let updates = vec![update("ns/a")];
        let mut results = ReleaseResult::new();

        service(&platform, &events)
            .apply_changes(&updates, &mut results)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results.get(&id("other/stranger")).is_none());
        assert_eq!(status(&results, "ns/a"), ReleaseStatus::Success);
    }

    #[tokio::test]
    async fn test_coverall_error_marks_everything_unknown() {
        let platform = FakePlatform::replying(vec![Reply::Coverall("connection refused")]);
        let events = Arc::new(RecordingEventLog::default());
        let updates = vec![update("ns/a"), update("flux/fluxd"), update("ns/b")];
        let mut results = ReleaseResult::new();

        let err = service(&platform, &events)
            .apply_changes(&updates, &mut results)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "connection refused");
        for raw in ["ns/a", "flux/fluxd", "ns/b"] {
            let result = results.get(&id(raw)).unwrap();
            assert_eq!(result.status, ReleaseStatus::Unknown);
            assert_eq!(result.error.as_deref(), Some("connection refused"));
        }
        assert!(events.release_lines().is_empty());
        // Only the ordinary apply; the self update is never attempted
        assert_eq!(platform.calls().len(), 1);
        assert_eq!(platform.calls()[0].len(), 2);
    }

    #[tokio::test]
    async fn test_per_service_failure_still_applies_self_updates() {
        let platform = FakePlatform::replying(vec![Reply::PerService(vec![
            ("ns/a", "quota exceeded"),
            ("flux/fluxd", "not part of this apply"),
        ])]);
        let events = Arc::new(RecordingEventLog::default());
        let updates = vec![update("ns/a"), update("flux/fluxd"), update("ns/b")];
        let mut results = ReleaseResult::new();

        service(&platform, &events)
            .apply_changes(&updates, &mut results)
            .await
            .unwrap();

        let calls = platform.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].len(), 1);
        assert_eq!(calls[1][0].service_id, id("flux/fluxd"));

        let failed = results.get(&id("ns/a")).unwrap();
        assert_eq!(failed.status, ReleaseStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("quota exceeded"));
        assert_eq!(status(&results, "ns/b"), ReleaseStatus::Success);

        // A self service named in the ordinary reply is not marked failed
        let fluxd = results.get(&id("flux/fluxd")).unwrap();
        assert_eq!(fluxd.status, ReleaseStatus::Success);
        assert_eq!(fluxd.error, None);
        assert_eq!(
            events.messages_for("flux/fluxd"),
            vec!["Starting (no image changes). (no result expected)"]
        );
    }

    #[tokio::test]
    async fn test_coverall_message_matches_returned_error_chain() {
        let platform = Arc::new(ContextPlatform);
        let events = Arc::new(RecordingEventLog::default());
        let updates = vec![update("ns/a"), update("flux/fluxsvc")];
        let mut results = ReleaseResult::new();

        let err = ReleaseService::new(platform, events)
            .apply_changes(&updates, &mut results)
            .await
            .unwrap_err();

        let chain = format!("{:#}", err);
        assert_eq!(chain, "Kubernetes API server is unreachable: connection refused");
        for raw in ["ns/a", "flux/fluxsvc"] {
            assert_eq!(
                results.get(&id(raw)).unwrap().error.as_deref(),
                Some(chain.as_str())
            );
        }
    }

    struct ContextPlatform;

    #[async_trait]
    impl Platform for ContextPlatform {
        async fn apply(&self, _defs: Vec<ServiceDefinition>) -> Result<(), ApplyError> {
            Err(anyhow::anyhow!("connection refused")
                .context("Kubernetes API server is unreachable")
                .into())
        }
    }

    #[tokio::test]
    async fn test_self_update_applied_last_without_reply() {
        let platform = FakePlatform::replying(vec![
            Reply::Ok,
            Reply::Coverall("connection reset by peer"),
        ]);
        let events = Arc::new(RecordingEventLog::default());
        let updates = vec![update("flux/fluxsvc"), update("ns/a"), update("flux/fluxd")];
        let mut results = ReleaseResult::new();

        service(&platform, &events)
            .apply_changes(&updates, &mut results)
            .await
            .unwrap();

        let calls = platform.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].len(), 1);
        assert!(!calls[0][0].is_async);
        let self_ids: Vec<String> = calls[1].iter().map(|d| d.service_id.to_string()).collect();
        assert_eq!(self_ids, vec!["flux/fluxsvc", "flux/fluxd"]);
        assert!(calls[1].iter().all(|d| d.is_async));

        // The failed self apply leaves the provisional outcome alone
        assert_eq!(status(&results, "flux/fluxsvc"), ReleaseStatus::Success);
        assert_eq!(status(&results, "flux/fluxd"), ReleaseStatus::Success);
        assert_eq!(
            events.messages_for("flux/fluxd"),
            vec!["Starting (no image changes). (no result expected)"]
        );
    }

    #[tokio::test]
    async fn test_no_self_apply_without_self_updates() {
        let platform = FakePlatform::replying(vec![]);
        let events = Arc::new(RecordingEventLog::default());
        let mut results = ReleaseResult::new();

        service(&platform, &events)
            .apply_changes(&[update("ns/a")], &mut results)
            .await
            .unwrap();

        assert_eq!(platform.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_release_with_custom_self_names() {
        let platform = FakePlatform::replying(vec![]);
        let events = Arc::new(RecordingEventLog::default());
        let updates = vec![
            update("ns/web").with_update(ContainerUpdate::new("app", "v1", "v2")),
            update("ns/flux"),
        ];
        let mut results = ReleaseResult::new();

        service(&platform, &events)
            .with_self_names(SelfServiceNames::new("flux", "flux-agent"))
            .apply_changes(&updates, &mut results)
            .await
            .unwrap();

        assert_eq!(status(&results, "ns/web"), ReleaseStatus::Success);
        assert_eq!(
            events.messages_for("ns/web"),
            vec!["Starting app (v1 -> v2)", "Release app (v1 -> v2) succeeded"]
        );
        assert_eq!(
            events.messages_for("ns/flux"),
            vec!["Starting (no image changes). (no result expected)"]
        );

        let calls = platform.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].len(), 1);
        assert_eq!(calls[1][0].service_id, id("ns/flux"));
    }

    #[tokio::test]
    async fn test_existing_results_are_merged() {
        let platform = FakePlatform::replying(vec![]);
        let events = Arc::new(RecordingEventLog::default());
        let mut results = ReleaseResult::new();
        results.insert(
            id("ns/a"),
            ServiceResult {
                status: ReleaseStatus::Unknown,
                error: Some("noted during planning".to_string()),
                per_container: vec![ContainerUpdate::new("app", "v0", "v1")],
            },
        );
        results.insert(
            id("ns/untouched"),
            ServiceResult {
                status: ReleaseStatus::Failed,
                error: Some("earlier".to_string()),
                per_container: vec![],
            },
        );

        service(&platform, &events)
            .apply_changes(&[update("ns/a")], &mut results)
            .await
            .unwrap();

        let merged = results.get(&id("ns/a")).unwrap();
        assert_eq!(merged.status, ReleaseStatus::Success);
        assert_eq!(merged.error.as_deref(), Some("noted during planning"));
        assert_eq!(status(&results, "ns/untouched"), ReleaseStatus::Failed);
        assert_eq!(
            events.release_lines(),
            vec!["ns/a: Release app (v0 -> v1) succeeded"]
        );
    }
}
