//! Phase gate evaluation over prior-phase completion statistics.

use crate::task::{
    domain::{Phase, Task, TaskStatus, TeamId},
    ports::{TaskFilter, TaskStore, TaskStoreResult, chunked_query},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Completion statistics over one team's tasks in a prior phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateStats {
    /// Number of tasks in the prior phase.
    pub total: usize,
    /// Number of those tasks with status `Completed`.
    pub completed: usize,
    /// True when every task has a due instant at or before `now`.
    pub all_due_passed: bool,
}

impl GateStats {
    /// Computes statistics from a prior-phase snapshot at the given instant.
    #[must_use]
    pub fn from_tasks(tasks: &[Task], now: DateTime<Utc>) -> Self {
        Self {
            total: tasks.len(),
            completed: tasks
                .iter()
                .filter(|task| task.status() == TaskStatus::Completed)
                .count(),
            all_due_passed: tasks.iter().all(|task| task.schedule().is_due_by(now)),
        }
    }

    /// Returns the gate predicate: every task exists, is completed, and its
    /// deadline has elapsed. An empty prior phase keeps the gate closed; a
    /// vacuous "0 of 0" never counts as completion.
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        self.total > 0 && self.completed == self.total && self.all_due_passed
    }
}

/// Whether a team may create tasks in a candidate phase, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDecision {
    /// The candidate phase.
    pub phase: Phase,
    /// The phase whose completion the gate inspects; `None` for the first
    /// phase, which is always open.
    pub prior: Option<Phase>,
    /// Prior-phase statistics; `None` when there is no prior phase.
    pub stats: Option<GateStats>,
    /// True when task creation is permitted.
    pub open: bool,
}

impl GateDecision {
    const fn always_open(phase: Phase) -> Self {
        Self {
            phase,
            prior: None,
            stats: None,
            open: true,
        }
    }
}

fn decide(
    phase: Phase,
    prior: Phase,
    tasks: &[Task],
    now: DateTime<Utc>,
    reoral_ok: bool,
) -> GateDecision {
    let stats = GateStats::from_tasks(tasks, now);
    GateDecision {
        phase,
        prior: Some(prior),
        stats: Some(stats),
        open: stats.is_satisfied() && reoral_ok,
    }
}

fn verdict_for(verdicts: &RwLock<HashMap<TeamId, bool>>, team: &TeamId) -> bool {
    let guard = verdicts.read().unwrap_or_else(PoisonError::into_inner);
    guard.get(team).copied().unwrap_or(false)
}

/// Reactive gate handle recomputed on every prior-phase change.
///
/// Dropping the watch tears down the underlying store subscription.
#[derive(Debug)]
pub struct GateWatch {
    rx: watch::Receiver<GateDecision>,
    handle: JoinHandle<()>,
}

impl GateWatch {
    /// Returns the latest decision.
    #[must_use]
    pub fn current(&self) -> GateDecision {
        self.rx.borrow().clone()
    }

    /// Awaits the next decision change; false once the stream has closed.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

impl Drop for GateWatch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Evaluates, per team and candidate phase, whether the prior phase's
/// completion state permits creating new tasks.
///
/// The gate is per-team: a manager running several teams gets an
/// independent decision for each. `FinalRedefense` additionally requires the
/// externally issued Re-Oral verdict, recorded through
/// [`PhaseGateEvaluator::record_reoral_verdict`].
pub struct PhaseGateEvaluator<S, C> {
    store: Arc<S>,
    clock: Arc<C>,
    reoral_verdicts: Arc<RwLock<HashMap<TeamId, bool>>>,
}

impl<S, C> Clone for PhaseGateEvaluator<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            reoral_verdicts: Arc::clone(&self.reoral_verdicts),
        }
    }
}

impl<S, C> PhaseGateEvaluator<S, C>
where
    S: TaskStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates an evaluator over the given store and clock.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            store,
            clock,
            reoral_verdicts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Records the external Re-Oral verdict for a team.
    pub fn record_reoral_verdict(&self, team: TeamId, passed: bool) {
        let mut guard = self
            .reoral_verdicts
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard.insert(team, passed);
    }

    fn reoral_ok(&self, team: &TeamId, phase: Phase) -> bool {
        phase != Phase::FinalRedefense || verdict_for(&self.reoral_verdicts, team)
    }

    /// Evaluates the gate for one team and candidate phase.
    ///
    /// # Errors
    ///
    /// Returns [`crate::task::ports::TaskStoreError`] when the prior-phase
    /// query fails.
    pub async fn evaluate(&self, team: &TeamId, phase: Phase) -> TaskStoreResult<GateDecision> {
        let Some(prior) = phase.prior() else {
            return Ok(GateDecision::always_open(phase));
        };
        let filter = TaskFilter::for_phase(prior).with_team(team.clone());
        let tasks = self.store.query(&filter).await?;
        let now = self.clock.utc();
        Ok(decide(phase, prior, &tasks, now, self.reoral_ok(team, phase)))
    }

    /// Evaluates the gate for many teams at once, chunking the prior-phase
    /// query to the store's set-filter limit.
    ///
    /// Teams without prior-phase tasks receive a closed decision with empty
    /// statistics.
    ///
    /// # Errors
    ///
    /// Returns [`crate::task::ports::TaskStoreError`] when a batched query
    /// fails.
    pub async fn evaluate_many(
        &self,
        teams: &[TeamId],
        phase: Phase,
    ) -> TaskStoreResult<HashMap<TeamId, GateDecision>> {
        let Some(prior) = phase.prior() else {
            return Ok(teams
                .iter()
                .map(|team| (team.clone(), GateDecision::always_open(phase)))
                .collect());
        };

        let template = TaskFilter::for_phase(prior);
        let tasks = chunked_query(&*self.store, &template, teams).await?;
        let mut by_team: HashMap<&TeamId, Vec<Task>> = HashMap::new();
        for task in tasks {
            // chunked_query only returns tasks for requested teams
            if let Some(team) = teams.iter().find(|team| *team == task.team().id()) {
                by_team.entry(team).or_default().push(task);
            }
        }

        let now = self.clock.utc();
        Ok(teams
            .iter()
            .map(|team| {
                let team_tasks = by_team.get(team).map_or(&[][..], Vec::as_slice);
                let decision =
                    decide(phase, prior, team_tasks, now, self.reoral_ok(team, phase));
                (team.clone(), decision)
            })
            .collect())
    }

    /// Opens a reactive gate watch for one team and candidate phase.
    ///
    /// The decision is recomputed whenever any prior-phase task of the team
    /// changes (status, deadline, or count), with `now` taken at
    /// event-handling time.
    ///
    /// # Errors
    ///
    /// Returns [`crate::task::ports::TaskStoreError`] when the subscription
    /// or initial evaluation fails.
    pub async fn watch(&self, team: TeamId, phase: Phase) -> TaskStoreResult<GateWatch> {
        let Some(prior) = phase.prior() else {
            let (tx, rx) = watch::channel(GateDecision::always_open(phase));
            // nothing to observe; hold the sender so the watch stays live
            let handle = tokio::spawn(async move {
                let _hold = tx;
                std::future::pending::<()>().await;
            });
            return Ok(GateWatch { rx, handle });
        };

        let filter = TaskFilter::for_phase(prior).with_team(team.clone());
        let mut subscription = self.store.subscribe(filter).await?;
        let initial = self.evaluate(&team, phase).await?;
        let (tx, rx) = watch::channel(initial);

        let clock = Arc::clone(&self.clock);
        let verdicts = Arc::clone(&self.reoral_verdicts);
        let handle = tokio::spawn(async move {
            while let Some(snapshot) = subscription.next().await {
                if tx.is_closed() {
                    break;
                }
                let now = clock.utc();
                let reoral_ok =
                    phase != Phase::FinalRedefense || verdict_for(&verdicts, &team);
                let decision = decide(phase, prior, &snapshot, now, reoral_ok);
                tx.send_if_modified(|current| {
                    if *current == decision {
                        false
                    } else {
                        *current = decision;
                        true
                    }
                });
            }
        });

        Ok(GateWatch { rx, handle })
    }
}
