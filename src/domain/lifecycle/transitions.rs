//! Total transition function for the request lifecycle.
//!
//! ```text
//!            submit(g)                 settle(g, Ok)
//! Idle ──────────────> InFlight{g} ───────────────────> Succeeded(payload)
//!   ^                    │   │        settle(g, Err)
//!   │      abandon       │   └──────────────────────────> Failed(reason)
//!   └────────────────────┘        deadline(g)
//!                                 ───────────────────────> Failed(Timeout)
//!
//! Succeeded / Failed ──submit(g')──> InFlight{g'}
//! ```
//!
//! Every `(state, event)` pair has a defined result. Events that do not
//! apply leave the state untouched and report why via [`Ignored`].

use super::state::{FailureReason, Generation, RequestLifecycleState};

/// Something that happened to a controller.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent<P> {
    /// A validated submission tagged with a fresh generation.
    Submit { generation: Generation },
    /// The request tagged `generation` completed.
    Settle {
        generation: Generation,
        outcome: Result<P, FailureReason>,
    },
    /// The deadline for the request tagged `generation` elapsed.
    DeadlineElapsed { generation: Generation, after_ms: u64 },
    /// The caller lost interest in the outstanding request.
    Abandon,
}

/// Whether an event changed the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Applied,
    Ignored(Ignored),
}

impl Disposition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Disposition::Applied)
    }
}

/// Why an event left the state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    /// A submission arrived while another request was outstanding.
    AlreadyInFlight,
    /// A settlement or deadline for a superseded generation.
    Stale { generation: Generation },
    /// Abandon with nothing outstanding.
    NotInFlight,
}

impl<P> RequestLifecycleState<P> {
    /// Apply an event, returning the successor state and whether it changed.
    pub fn apply(self, event: LifecycleEvent<P>) -> (Self, Disposition) {
        use RequestLifecycleState::*;

        match (self, event) {
            (InFlight { generation }, LifecycleEvent::Submit { .. }) => (
                InFlight { generation },
                Disposition::Ignored(Ignored::AlreadyInFlight),
            ),
            (_, LifecycleEvent::Submit { generation }) => {
                (InFlight { generation }, Disposition::Applied)
            }

            (InFlight { generation: current }, LifecycleEvent::Settle { generation, outcome })
                if current == generation =>
            {
                let next = match outcome {
                    Ok(payload) => Succeeded(payload),
                    Err(reason) => Failed(reason),
                };
                (next, Disposition::Applied)
            }
            (state, LifecycleEvent::Settle { generation, .. }) => {
                (state, Disposition::Ignored(Ignored::Stale { generation }))
            }

            (
                InFlight { generation: current },
                LifecycleEvent::DeadlineElapsed {
                    generation,
                    after_ms,
                },
            ) if current == generation => {
                (Failed(FailureReason::Timeout { after_ms }), Disposition::Applied)
            }
            (state, LifecycleEvent::DeadlineElapsed { generation, .. }) => {
                (state, Disposition::Ignored(Ignored::Stale { generation }))
            }

            (InFlight { .. }, LifecycleEvent::Abandon) => (Idle, Disposition::Applied),
            (state, LifecycleEvent::Abandon) => {
                (state, Disposition::Ignored(Ignored::NotInFlight))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type State = RequestLifecycleState<f64>;

    fn submit(generation: u64) -> LifecycleEvent<f64> {
        LifecycleEvent::Submit {
            generation: Generation(generation),
        }
    }

    fn settle(generation: u64, outcome: Result<f64, FailureReason>) -> LifecycleEvent<f64> {
        LifecycleEvent::Settle {
            generation: Generation(generation),
            outcome,
        }
    }

    #[test]
    fn test_idle_to_in_flight_to_succeeded() {
        let (state, d) = State::Idle.apply(submit(1));
        assert!(d.is_applied());
        assert_eq!(state.in_flight_generation(), Some(Generation(1)));

        let (state, d) = state.apply(settle(1, Ok(350_000.0)));
        assert!(d.is_applied());
        assert_eq!(state, State::Succeeded(350_000.0));
    }

    #[test]
    fn test_submit_while_in_flight_is_ignored() {
        let (state, _) = State::Idle.apply(submit(1));
        let (state, d) = state.apply(submit(2));
        assert_eq!(d, Disposition::Ignored(Ignored::AlreadyInFlight));
        assert_eq!(state.in_flight_generation(), Some(Generation(1)));
    }

    #[test]
    fn test_resubmit_from_settled_states() {
        let failed = State::Failed(FailureReason::Timeout { after_ms: 10 });
        let (state, d) = failed.apply(submit(5));
        assert!(d.is_applied());
        assert!(state.is_in_flight());

        let (state, d) = State::Succeeded(1.0).apply(submit(6));
        assert!(d.is_applied());
        assert_eq!(state.payload(), None);
    }

    #[test]
    fn test_settlement_for_other_generation_is_stale() {
        let (state, _) = State::Idle.apply(submit(2));
        let (state, d) = state.apply(settle(1, Ok(1.0)));
        assert_eq!(
            d,
            Disposition::Ignored(Ignored::Stale {
                generation: Generation(1)
            })
        );
        assert!(state.is_in_flight());
    }

    #[test]
    fn test_settlement_after_settled_is_stale() {
        let (state, d) = State::Succeeded(2.0).apply(settle(1, Ok(1.0)));
        assert!(!d.is_applied());
        assert_eq!(state, State::Succeeded(2.0));
    }

    #[test]
    fn test_deadline_fails_only_current_generation() {
        let (state, _) = State::Idle.apply(submit(3));
        let deadline = |generation| LifecycleEvent::DeadlineElapsed {
            generation: Generation(generation),
            after_ms: 250,
        };

        let (state, d) = state.apply(deadline(2));
        assert!(!d.is_applied());
        assert!(state.is_in_flight());

        let (state, d) = state.apply(deadline(3));
        assert!(d.is_applied());
        assert_eq!(
            state.failure(),
            Some(&FailureReason::Timeout { after_ms: 250 })
        );
    }

    #[test]
    fn test_abandon() {
        let (state, _) = State::Idle.apply(submit(1));
        let (state, d) = state.apply(LifecycleEvent::Abandon);
        assert!(d.is_applied());
        assert_eq!(state, State::Idle);

        let (_, d) = State::Idle.apply(LifecycleEvent::Abandon);
        assert_eq!(d, Disposition::Ignored(Ignored::NotInFlight));
    }
}
