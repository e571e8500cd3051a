//! Level-triggered reconciliation loop

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::reconcile::{DesiredState, DesiredStateSource, ReconcilePlan, TeamsBackend};
use crate::domain::DomainError;

/// Timing of the reconciliation loop and the backend's naming policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerSettings {
    /// Wait after a clean cycle
    pub poll_interval: Duration,
    /// First wait after a cycle with failures
    pub retry_delay: Duration,
    /// Upper bound for the backoff wait
    pub max_backoff: Duration,
    /// The backend rejects names that differ only by case
    pub unique_names: bool,
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            retry_delay: Duration::from_secs(5),
            max_backoff: Duration::from_secs(300),
            unique_names: true,
        }
    }
}

impl ReconcilerSettings {
    /// Wait before the next cycle given the number of consecutive failed cycles
    pub fn next_delay(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 {
            return self.poll_interval;
        }

        let factor = 1u32.checked_shl(consecutive_failures - 1).unwrap_or(u32::MAX);
        self.retry_delay
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Outcome of one cycle that got as far as applying a plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub created: usize,
    pub deleted: usize,
    pub failed: usize,
}

impl CycleReport {
    /// Corrections that changed actual state
    pub fn mutations(&self) -> usize {
        self.created + self.deleted
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Drives a [`TeamsBackend`] toward the state declared by a
/// [`DesiredStateSource`]
#[derive(Debug)]
pub struct Reconciler {
    source: Arc<dyn DesiredStateSource>,
    backend: Arc<dyn TeamsBackend>,
    settings: ReconcilerSettings,
}

impl Reconciler {
    pub fn new(
        source: Arc<dyn DesiredStateSource>,
        backend: Arc<dyn TeamsBackend>,
        settings: ReconcilerSettings,
    ) -> Self {
        Self {
            source,
            backend,
            settings,
        }
    }

    /// Run a single cycle.
    ///
    /// Returns an error, without touching actual state, when either desired
    /// or actual state cannot be observed. Individual correction failures are
    /// logged and counted; they are retried by a later cycle.
    #[instrument(skip(self), fields(source = %self.source.describe()))]
    pub async fn reconcile_once(&self) -> Result<CycleReport, DomainError> {
        counter!("teams_reconcile_cycles_total").increment(1);

        let desired = self
            .source
            .observe()
            .await
            .and_then(|desired| self.check_names(&desired).map(|()| desired))
            .inspect_err(|e| {
                counter!("teams_reconcile_aborted_total", "stage" => "desired").increment(1);
                warn!(error = %e, "Could not observe desired state, skipping cycle");
            })?;

        let actual = self.backend.list_teams().await.inspect_err(|e| {
            counter!("teams_reconcile_aborted_total", "stage" => "actual").increment(1);
            warn!(error = %e, "Could not observe actual state, skipping cycle");
        })?;

        let plan = ReconcilePlan::compute(&desired, &actual);

        if plan.is_empty() {
            debug!(teams = actual.len(), "Desired and actual state match");
            return Ok(CycleReport::default());
        }

        info!(
            create = plan.to_create.len(),
            delete = plan.to_delete.len(),
            "Applying reconcile plan"
        );

        let mut report = CycleReport::default();

        // Deletes first so a renamed team frees its name before the create
        for team in &plan.to_delete {
            match self.backend.delete_team(team.id()).await {
                Ok(()) => {
                    info!(id = %team.id(), name = %team.name(), "Deleted team");
                    report.deleted += 1;
                }
                Err(DomainError::NotFound { .. }) => {
                    debug!(id = %team.id(), "Team already gone");
                }
                Err(e) => {
                    warn!(id = %team.id(), error = %e, retryable = e.is_retryable(), "Failed to delete team");
                    report.failed += 1;
                }
            }
        }

        for name in &plan.to_create {
            match self.backend.create_team(name).await {
                Ok(team) => {
                    info!(id = %team.id(), name = %team.name(), "Created team");
                    report.created += 1;
                }
                Err(e) => {
                    warn!(name = %name, error = %e, retryable = e.is_retryable(), "Failed to create team");
                    report.failed += 1;
                }
            }
        }

        counter!("teams_reconcile_corrections_total", "action" => "create")
            .increment(report.created as u64);
        counter!("teams_reconcile_corrections_total", "action" => "delete")
            .increment(report.deleted as u64);
        counter!("teams_reconcile_failures_total").increment(report.failed as u64);

        info!(
            created = report.created,
            deleted = report.deleted,
            failed = report.failed,
            "Reconciliation cycle complete"
        );

        Ok(report)
    }

    /// A desired set the backend could never hold is rejected before any mutation
    fn check_names(&self, desired: &DesiredState) -> Result<(), DomainError> {
        if !self.settings.unique_names {
            return Ok(());
        }

        match desired.case_insensitive_duplicate() {
            Some((first, second)) => Err(DomainError::invalid_input(format!(
                "Desired teams '{}' and '{}' differ only by case",
                first, second
            ))),
            None => Ok(()),
        }
    }

    /// Loop until `shutdown` is cancelled.
    ///
    /// A cycle that has started always runs to completion; cancellation is
    /// only observed between cycles.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(
            source = %self.source.describe(),
            poll_interval_secs = self.settings.poll_interval.as_secs(),
            "Reconciler starting"
        );

        let mut consecutive_failures: u32 = 0;

        while !shutdown.is_cancelled() {
            match self.reconcile_once().await {
                Ok(report) if report.is_clean() => consecutive_failures = 0,
                Ok(_) => consecutive_failures = consecutive_failures.saturating_add(1),
                Err(e) => {
                    error!(error = %e, "Reconciliation cycle aborted");
                    consecutive_failures = consecutive_failures.saturating_add(1);
                }
            }

            let delay = self.settings.next_delay(consecutive_failures);
            debug!(delay_ms = delay.as_millis() as u64, "Waiting for next cycle");

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
                _ = self.source.changed() => {
                    debug!("Desired state changed");
                }
            }
        }

        info!("Reconciler stopped");
    }

    /// Run the loop on a background task
    pub fn spawn(self: Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(shutdown).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reconcile::{DesiredTeam, MockTeamsBackend};
    use crate::domain::team::{Team, TeamId};
    use crate::infrastructure::reconcile::{ChannelSource, StaticSource};
    use crate::infrastructure::team::{InMemoryTeamRepository, TeamService};
    use async_trait::async_trait;

    fn service() -> Arc<TeamService> {
        Arc::new(TeamService::new(Arc::new(
            InMemoryTeamRepository::with_unique_names(false),
        )))
    }

    fn source(names: &[&str]) -> Arc<StaticSource> {
        Arc::new(StaticSource::new(names.iter().map(|n| DesiredTeam::new(*n))))
    }

    fn reconciler(source: Arc<dyn DesiredStateSource>, backend: Arc<dyn TeamsBackend>) -> Reconciler {
        Reconciler::new(source, backend, ReconcilerSettings::default())
    }

    async fn names(service: &TeamService) -> Vec<String> {
        let mut names: Vec<String> = service
            .list_teams()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name().to_string())
            .collect();
        names.sort();
        names
    }

    #[derive(Debug)]
    struct FailingSource;

    #[async_trait]
    impl DesiredStateSource for FailingSource {
        async fn observe(&self) -> Result<crate::domain::DesiredState, DomainError> {
            Err(DomainError::backend("manifest unreachable"))
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    #[test]
    fn test_next_delay_backoff() {
        let settings = ReconcilerSettings {
            poll_interval: Duration::from_secs(30),
            retry_delay: Duration::from_secs(5),
            max_backoff: Duration::from_secs(60),
            unique_names: true,
        };

        assert_eq!(settings.next_delay(0), Duration::from_secs(30));
        assert_eq!(settings.next_delay(1), Duration::from_secs(5));
        assert_eq!(settings.next_delay(2), Duration::from_secs(10));
        assert_eq!(settings.next_delay(3), Duration::from_secs(20));
        assert_eq!(settings.next_delay(4), Duration::from_secs(40));
        assert_eq!(settings.next_delay(5), Duration::from_secs(60));
        assert_eq!(settings.next_delay(100), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_convergence() {
        let service = service();
        service.create_team("Y").await.unwrap();
        service.create_team("Z").await.unwrap();

        let reconciler = reconciler(source(&["X", "Y"]), service.clone());
        let report = reconciler.reconcile_once().await.unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(report.deleted, 1);
        assert_eq!(names(&service).await, vec!["X", "Y"]);
    }

    #[tokio::test]
    async fn test_rename_by_case_converges_with_unique_names() {
        let service = Arc::new(TeamService::new(Arc::new(InMemoryTeamRepository::new())));
        service.create_team("backend").await.unwrap();
        service.create_team("Data").await.unwrap();

        let reconciler = reconciler(source(&["Backend", "Data"]), service.clone());
        let report = reconciler.reconcile_once().await.unwrap();

        assert_eq!(
            report,
            CycleReport {
                created: 1,
                deleted: 1,
                failed: 0
            }
        );
        assert_eq!(names(&service).await, vec!["Backend", "Data"]);
        assert_eq!(reconciler.reconcile_once().await.unwrap().mutations(), 0);
    }

    #[tokio::test]
    async fn test_convergence_with_unique_names() {
        let service = Arc::new(TeamService::new(Arc::new(InMemoryTeamRepository::new())));
        service.create_team("Y").await.unwrap();
        service.create_team("Z").await.unwrap();

        let reconciler = reconciler(source(&["X", "Y"]), service.clone());
        let report = reconciler.reconcile_once().await.unwrap();

        assert!(report.is_clean());
        assert_eq!(names(&service).await, vec!["X", "Y"]);
    }

    #[tokio::test]
    async fn test_case_colliding_desired_names_abort_without_mutation() {
        let service = Arc::new(TeamService::new(Arc::new(InMemoryTeamRepository::new())));
        service.create_team("Backend").await.unwrap();
        service.create_team("Other").await.unwrap();

        let reconciler = reconciler(source(&["Backend", "backend"]), service.clone());
        let result = reconciler.reconcile_once().await;

        assert!(matches!(result, Err(DomainError::InvalidInput { .. })));
        assert_eq!(names(&service).await, vec!["Backend", "Other"]);
    }

    #[tokio::test]
    async fn test_case_variants_allowed_without_unique_names() {
        let service = service();
        let settings = ReconcilerSettings {
            unique_names: false,
            ..ReconcilerSettings::default()
        };
        let reconciler = Reconciler::new(source(&["Backend", "backend"]), service.clone(), settings);

        let report = reconciler.reconcile_once().await.unwrap();

        assert_eq!(report.created, 2);
        assert_eq!(names(&service).await, vec!["Backend", "backend"]);
    }

    #[tokio::test]
    async fn test_deletes_run_before_creates() {
        let stale = Team::new(TeamId::generate(), "Old").unwrap();
        let mut sequence = mockall::Sequence::new();
        let mut backend = MockTeamsBackend::new();
        backend
            .expect_list_teams()
            .returning(move || Ok(vec![stale.clone()]));
        backend
            .expect_delete_team()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(()));
        backend
            .expect_create_team()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|name: &str| Ok(Team::new(TeamId::generate(), name).unwrap()));

        let reconciler = reconciler(source(&["New"]), Arc::new(backend));

        assert!(reconciler.reconcile_once().await.unwrap().is_clean());
    }

    #[tokio::test]
    async fn test_second_cycle_is_noop() {
        let service = service();
        service.create_team("Z").await.unwrap();
        let reconciler = reconciler(source(&["X", "Y"]), service.clone());

        let first = reconciler.reconcile_once().await.unwrap();
        assert_eq!(first.mutations(), 3);

        let ids_before: Vec<TeamId> = service
            .list_teams()
            .await
            .unwrap()
            .iter()
            .map(|t| t.id().clone())
            .collect();

        let second = reconciler.reconcile_once().await.unwrap();
        assert_eq!(second, CycleReport::default());

        let ids_after: Vec<TeamId> = service
            .list_teams()
            .await
            .unwrap()
            .iter()
            .map(|t| t.id().clone())
            .collect();
        assert_eq!(ids_before, ids_after);
    }

    #[tokio::test]
    async fn test_noop_cycle_never_mutates_backend() {
        let existing = Team::new(TeamId::generate(), "A").unwrap();
        let mut backend = MockTeamsBackend::new();
        backend
            .expect_list_teams()
            .times(2)
            .returning(move || Ok(vec![existing.clone()]));
        backend.expect_create_team().never();
        backend.expect_delete_team().never();

        let reconciler = reconciler(source(&["A"]), Arc::new(backend));

        assert_eq!(reconciler.reconcile_once().await.unwrap().mutations(), 0);
        assert_eq!(reconciler.reconcile_once().await.unwrap().mutations(), 0);
    }

    #[tokio::test]
    async fn test_desired_observation_failure_aborts_without_mutation() {
        let mut backend = MockTeamsBackend::new();
        backend.expect_list_teams().never();
        backend.expect_create_team().never();
        backend.expect_delete_team().never();

        let reconciler = reconciler(Arc::new(FailingSource), Arc::new(backend));
        let result = reconciler.reconcile_once().await;

        assert!(matches!(result, Err(DomainError::Backend { .. })));
    }

    #[tokio::test]
    async fn test_actual_observation_failure_aborts_without_mutation() {
        let mut backend = MockTeamsBackend::new();
        backend
            .expect_list_teams()
            .returning(|| Err(DomainError::backend("connection refused")));
        backend.expect_create_team().never();
        backend.expect_delete_team().never();

        let reconciler = reconciler(source(&["A"]), Arc::new(backend));
        assert!(reconciler.reconcile_once().await.is_err());
    }

    #[tokio::test]
    async fn test_failed_correction_is_counted_and_others_continue() {
        let stale = Team::new(TeamId::generate(), "Old").unwrap();
        let mut backend = MockTeamsBackend::new();
        backend
            .expect_list_teams()
            .returning(move || Ok(vec![stale.clone()]));
        backend
            .expect_create_team()
            .withf(|name: &str| name == "A")
            .returning(|_| Err(DomainError::backend("timeout")));
        backend
            .expect_create_team()
            .withf(|name: &str| name == "B")
            .returning(|name: &str| Ok(Team::new(TeamId::generate(), name).unwrap()));
        backend.expect_delete_team().times(1).returning(|_| Ok(()));

        let reconciler = reconciler(source(&["A", "B"]), Arc::new(backend));
        let report = reconciler.reconcile_once().await.unwrap();

        assert_eq!(
            report,
            CycleReport {
                created: 1,
                deleted: 1,
                failed: 1
            }
        );
        assert!(!report.is_clean());
    }

    #[tokio::test]
    async fn test_delete_of_vanished_team_is_not_a_failure() {
        let ghost = Team::new(TeamId::generate(), "Ghost").unwrap();
        let mut backend = MockTeamsBackend::new();
        backend
            .expect_list_teams()
            .returning(move || Ok(vec![ghost.clone()]));
        backend
            .expect_delete_team()
            .returning(|_| Err(DomainError::not_found("Team not found")));

        let reconciler = reconciler(source(&[]), Arc::new(backend));
        let report = reconciler.reconcile_once().await.unwrap();

        assert!(report.is_clean());
        assert_eq!(report.mutations(), 0);
    }

    #[tokio::test]
    async fn test_manual_changes_are_corrected() {
        let service = service();
        let reconciler = reconciler(source(&["Platform"]), service.clone());
        reconciler.reconcile_once().await.unwrap();

        // A client deletes the managed team and adds an unmanaged one
        let platform = service.list_teams().await.unwrap().remove(0);
        service.delete_team(platform.id().as_str()).await.unwrap();
        service.create_team("Rogue").await.unwrap();

        reconciler.reconcile_once().await.unwrap();
        assert_eq!(names(&service).await, vec!["Platform"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_shutdown() {
        let service = service();
        let reconciler = Arc::new(reconciler(source(&["A"]), service.clone()));
        let shutdown = CancellationToken::new();

        let handle = reconciler.clone().spawn(shutdown.clone());
        tokio::time::sleep(Duration::from_secs(1)).await;
        shutdown.cancel();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("reconciler did not stop")
            .unwrap();

        assert_eq!(names(&service).await, vec!["A"]);
    }

    /// Holds the first create until released
    #[derive(Debug)]
    struct GatedBackend {
        inner: Arc<TeamService>,
        entered: tokio::sync::Notify,
        release: tokio::sync::Notify,
        list_calls: std::sync::atomic::AtomicUsize,
        gated_name: &'static str,
    }

    #[async_trait]
    impl TeamsBackend for GatedBackend {
        async fn list_teams(&self) -> Result<Vec<Team>, DomainError> {
            self.list_calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.list_teams().await
        }

        async fn create_team(&self, name: &str) -> Result<Team, DomainError> {
            if name == self.gated_name {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.create_team(name).await
        }

        async fn delete_team(&self, id: &TeamId) -> Result<(), DomainError> {
            TeamsBackend::delete_team(self.inner.as_ref(), id).await
        }
    }

    #[tokio::test]
    async fn test_cycle_in_flight_completes_after_shutdown() {
        let service = service();
        service.create_team("Stale").await.unwrap();
        let backend = Arc::new(GatedBackend {
            inner: service.clone(),
            entered: tokio::sync::Notify::new(),
            release: tokio::sync::Notify::new(),
            list_calls: std::sync::atomic::AtomicUsize::new(0),
            gated_name: "A",
        });
        let reconciler = Arc::new(reconciler(source(&["A", "B", "C"]), backend.clone()));
        let shutdown = CancellationToken::new();
        let handle = reconciler.clone().spawn(shutdown.clone());

        tokio::time::timeout(Duration::from_secs(5), backend.entered.notified())
            .await
            .expect("create was never attempted");
        shutdown.cancel();
        backend.release.notify_one();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("reconciler did not stop")
            .unwrap();

        assert_eq!(names(&service).await, vec!["A", "B", "C"]);
        assert_eq!(
            backend.list_calls.load(std::sync::atomic::Ordering::SeqCst),
            1
        );
    }

    #[tokio::test]
    async fn test_run_does_not_start_after_cancellation() {
        let mut backend = MockTeamsBackend::new();
        backend.expect_list_teams().never();

        let shutdown = CancellationToken::new();
        shutdown.cancel();

        reconciler(source(&["A"]), Arc::new(backend)).run(shutdown).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_reacts_to_push_source() {
        let service = service();
        let (source, sender) = ChannelSource::new(vec![DesiredTeam::new("A")]);
        let settings = ReconcilerSettings {
            poll_interval: Duration::from_secs(3600),
            ..ReconcilerSettings::default()
        };
        let reconciler = Arc::new(Reconciler::new(Arc::new(source), service.clone(), settings));
        let shutdown = CancellationToken::new();
        let handle = reconciler.clone().spawn(shutdown.clone());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(names(&service).await, vec!["A"]);

        sender
            .send(vec![DesiredTeam::new("A"), DesiredTeam::new("B")])
            .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(names(&service).await, vec!["A", "B"]);

        shutdown.cancel();
        handle.await.unwrap();
    }
}
