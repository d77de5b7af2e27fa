//! Lifecycle controller: one outstanding request per instance.
//!
//! The controller owns a [`RequestLifecycleState`] and a generation counter.
//! [`submit`](LifecycleController::submit) tags the call with a fresh
//! generation and spawns it on the runtime; settlements come back through a
//! channel in arrival order and are applied one at a time by
//! [`next_settlement`](LifecycleController::next_settlement). A settlement whose
//! generation no longer matches the `InFlight` state is stale and is dropped.
//!
//! A new submission only cancels interest in an older call, never the call
//! itself: the spawned task runs to completion and its settlement is ignored.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::domain::lifecycle::{
    Disposition, FailureReason, Generation, Ignored, LifecycleEvent, RequestLifecycleState,
};
use crate::transport::Transport;

/// Completion of one spawned call, tagged with the generation it was issued under.
#[derive(Debug)]
pub struct Settlement<P> {
    pub generation: Generation,
    pub outcome: Result<P, FailureReason>,
}

/// Result of asking a controller to start a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A request was dispatched under this generation.
    Started(Generation),
    /// Nothing happened; state and outstanding count are unchanged.
    Rejected(SubmitRejection),
}

impl SubmitOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, SubmitOutcome::Started(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    /// The input model has a missing or invalid field.
    NotSubmittable,
    /// A request is already in flight.
    AlreadyInFlight,
    /// The view has already fetched once; use an explicit refresh.
    AlreadyMounted,
}

impl SubmitRejection {
    fn as_label(self) -> &'static str {
        match self {
            SubmitRejection::NotSubmittable => "not_submittable",
            SubmitRejection::AlreadyInFlight => "in_flight",
            SubmitRejection::AlreadyMounted => "mounted",
        }
    }
}

/// Owns the request state machine for one user-triggered operation.
pub struct LifecycleController<T: Transport> {
    transport: Arc<T>,
    state: RequestLifecycleState<T::Payload>,
    generation: Generation,
    timeout: Option<Duration>,
    /// Deadline for the current `InFlight` generation, if a timeout is configured
    deadline: Option<(Generation, Instant)>,
    /// Spawned calls whose settlement has not been received yet
    outstanding: usize,
    settlement_tx: mpsc::UnboundedSender<Settlement<T::Payload>>,
    settlement_rx: mpsc::UnboundedReceiver<Settlement<T::Payload>>,
}

impl<T: Transport> LifecycleController<T> {
    /// Create a controller in the `Idle` state.
    ///
    /// With `timeout_ms` set, a request still in flight after that long is
    /// failed with [`FailureReason::Timeout`].
    pub fn new(transport: T, timeout_ms: Option<u64>) -> Self {
        let (settlement_tx, settlement_rx) = mpsc::unbounded_channel();
        Self {
            transport: Arc::new(transport),
            state: RequestLifecycleState::Idle,
            generation: Generation::INITIAL,
            timeout: timeout_ms.map(Duration::from_millis),
            deadline: None,
            outstanding: 0,
            settlement_tx,
            settlement_rx,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn state(&self) -> &RequestLifecycleState<T::Payload> {
        &self.state
    }

    /// The most recently issued generation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Number of spawned calls that have not reported back yet, stale ones included.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Record a submission that was turned away before reaching the state machine.
    pub(crate) fn reject(&self, rejection: SubmitRejection) -> SubmitOutcome {
        counter!(
            "homeval_submissions_rejected_total",
            "controller" => self.transport.name(),
            "reason" => rejection.as_label()
        )
        .increment(1);
        tracing::debug!(
            controller = self.transport.name(),
            reason = rejection.as_label(),
            state = self.state.variant(),
            "Submission rejected"
        );
        SubmitOutcome::Rejected(rejection)
    }

    /// Start a request unless one is already in flight.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, request: T::Request) -> SubmitOutcome {
        let generation = self.generation.next();
        let (state, disposition) =
            std::mem::take(&mut self.state).apply(LifecycleEvent::Submit { generation });
        self.state = state;

        if let Disposition::Ignored(Ignored::AlreadyInFlight) = disposition {
            return self.reject(SubmitRejection::AlreadyInFlight);
        }

        self.generation = generation;
        self.deadline = self
            .timeout
            .map(|timeout| (generation, Instant::now() + timeout));
        self.outstanding += 1;

        counter!("homeval_submissions_total", "controller" => self.transport.name()).increment(1);
        tracing::debug!(
            controller = self.transport.name(),
            generation = %generation,
            outstanding = self.outstanding,
            "Dispatching request"
        );

        let transport = Arc::clone(&self.transport);
        let tx = self.settlement_tx.clone();
        tokio::spawn(async move {
            let outcome = transport.send(&request).await;
            // Receiver dropped means the controller is gone; nothing to update
            let _ = tx.send(Settlement {
                generation,
                outcome,
            });
        });

        SubmitOutcome::Started(generation)
    }

    /// Give up on the in-flight request and return to `Idle`.
    ///
    /// The underlying call keeps running; its settlement will be stale.
    pub fn abandon(&mut self) -> Disposition {
        let (state, disposition) = std::mem::take(&mut self.state).apply(LifecycleEvent::Abandon);
        self.state = state;
        if disposition.is_applied() {
            self.deadline = None;
            tracing::debug!(
                controller = self.transport.name(),
                generation = %self.generation,
                "In-flight request abandoned"
            );
        }
        disposition
    }

    /// Apply a settlement. Only the current generation may change state.
    pub fn apply_settlement(&mut self, settlement: Settlement<T::Payload>) -> Disposition {
        let name = self.transport.name();
        let generation = settlement.generation;
        let outcome_label = match &settlement.outcome {
            Ok(_) => "success",
            Err(reason) => reason.kind(),
        };

        let (state, disposition) = std::mem::take(&mut self.state).apply(LifecycleEvent::Settle {
            generation,
            outcome: settlement.outcome,
        });
        self.state = state;

        match disposition {
            Disposition::Applied => {
                self.deadline = None;
                counter!(
                    "homeval_settlements_total",
                    "controller" => name,
                    "outcome" => outcome_label
                )
                .increment(1);
                tracing::info!(
                    controller = name,
                    generation = %generation,
                    outcome = outcome_label,
                    state = self.state.variant(),
                    "Request settled"
                );
            }
            Disposition::Ignored(_) => {
                counter!("homeval_stale_settlements_total", "controller" => name).increment(1);
                tracing::debug!(
                    controller = name,
                    generation = %generation,
                    current = %self.generation,
                    outcome = outcome_label,
                    "Ignoring stale settlement"
                );
            }
        }

        disposition
    }

    fn apply_deadline(&mut self, generation: Generation) -> Disposition {
        let after_ms = self
            .timeout
            .map(|timeout| u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default();
        let (state, disposition) = std::mem::take(&mut self.state)
            .apply(LifecycleEvent::DeadlineElapsed { generation, after_ms });
        self.state = state;
        self.deadline = None;

        if disposition.is_applied() {
            counter!(
                "homeval_settlements_total",
                "controller" => self.transport.name(),
                "outcome" => "timeout"
            )
            .increment(1);
            tracing::warn!(
                controller = self.transport.name(),
                generation = %generation,
                after_ms,
                "Request deadline elapsed"
            );
        }

        disposition
    }

    /// Wait for the next settlement (or the current deadline) and apply it.
    ///
    /// Returns `None` when no spawned call is outstanding.
    pub async fn next_settlement(&mut self) -> Option<Disposition> {
        if self.outstanding == 0 {
            return None;
        }

        enum Received<P> {
            Settlement(Option<Settlement<P>>),
            Deadline(Generation),
        }

        let received = match self.deadline {
            Some((generation, at)) if self.state.in_flight_generation() == Some(generation) => {
                // A settlement already queued wins over a deadline that has
                // passed since it arrived
                tokio::select! {
                    biased;
                    settlement = self.settlement_rx.recv() => Received::Settlement(settlement),
                    _ = tokio::time::sleep_until(at) => Received::Deadline(generation),
                }
            }
            _ => Received::Settlement(self.settlement_rx.recv().await),
        };

        match received {
            Received::Settlement(Some(settlement)) => {
                self.outstanding = self.outstanding.saturating_sub(1);
                Some(self.apply_settlement(settlement))
            }
            // We hold a sender, so the channel cannot close while we are alive
            Received::Settlement(None) => None,
            Received::Deadline(generation) => Some(self.apply_deadline(generation)),
        }
    }

    /// Process settlements until the current request is no longer in flight.
    pub async fn settle(&mut self) -> &RequestLifecycleState<T::Payload> {
        while self.state.is_in_flight() {
            if self.next_settlement().await.is_none() {
                break;
            }
        }
        &self.state
    }
}
