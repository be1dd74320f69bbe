//! Decay, observe, decide: one owner for the whole cycle.

use tracing::info;

use crate::error::ValidationError;
use crate::policy::{Decision, PolicyEngine};
use crate::record::{RunId, StepRecord};
use crate::state::EnvironmentState;

/// A batch of tokens observed together at one intensity.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Tokens the event supports.
    pub tokens: Vec<String>,

    /// Amount each token is reinforced by.
    pub intensity: f64,
}

impl Observation {
    /// Creates an observation.
    #[must_use]
    pub fn new<I, S>(tokens: I, intensity: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            intensity,
        }
    }
}

/// Owns one [`EnvironmentState`] and one [`PolicyEngine`] for a run.
///
/// # Examples
///
/// ```
/// use envaware::{Action, EnvironmentController, Observation, PolicyEngine};
///
/// let mut ctrl = EnvironmentController::new(PolicyEngine::default());
/// let record = ctrl
///     .step(0.1, &[Observation::new(["PowerShell"], 0.9)], "brief.md")
///     .unwrap();
/// assert_eq!(record.step, 0);
/// assert_eq!(record.decision.action, Action::SuggestInstall);
/// ```
#[derive(Debug, Clone)]
pub struct EnvironmentController {
    state: EnvironmentState,
    engine: PolicyEngine,
    run_id: RunId,
    next_step: u64,
}

impl EnvironmentController {
    /// Starts a run with an empty state.
    #[must_use]
    pub fn new(engine: PolicyEngine) -> Self {
        Self::with_state(EnvironmentState::new(), engine)
    }

    /// Starts a run from an existing state.
    #[must_use]
    pub fn with_state(state: EnvironmentState, engine: PolicyEngine) -> Self {
        let run_id = RunId::new();
        info!(%run_id, tokens = state.len(), "starting environment run");
        Self {
            state,
            engine,
            run_id,
            next_step: 0,
        }
    }

    /// The live state.
    #[must_use]
    pub fn state(&self) -> &EnvironmentState {
        &self.state
    }

    /// Mutable access to the live state.
    pub fn state_mut(&mut self) -> &mut EnvironmentState {
        &mut self.state
    }

    /// The policy engine.
    #[must_use]
    pub fn engine(&self) -> &PolicyEngine {
        &self.engine
    }

    /// This run's identifier.
    #[must_use]
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Number of steps recorded so far.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.next_step
    }

    /// Applies one observation.
    ///
    /// # Errors
    ///
    /// See [`EnvironmentState::observe`].
    pub fn observe(&mut self, observation: &Observation) -> Result<(), ValidationError> {
        self.state.observe(&observation.tokens, observation.intensity)
    }

    /// Decays every belief once.
    ///
    /// # Errors
    ///
    /// See [`EnvironmentState::decay`].
    pub fn tick(&mut self, rate: f64) -> Result<(), ValidationError> {
        self.state.decay(rate)
    }

    /// Decides on the current state without recording a step.
    #[must_use]
    pub fn decide(&self, target: &str) -> Decision {
        self.engine.decide(&self.state.snapshot(), target)
    }

    /// Runs one time step: decay, then each observation in order, then a
    /// decision over the resulting snapshot.
    ///
    /// The step is all-or-nothing: if `rate` or any observation is invalid,
    /// the state and the step counter are left as they were.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` encountered.
    pub fn step(
        &mut self,
        rate: f64,
        observations: &[Observation],
        target: &str,
    ) -> Result<StepRecord, ValidationError> {
        let mut next = self.state.clone();
        next.decay(rate)?;
        for observation in observations {
            next.observe(&observation.tokens, observation.intensity)?;
        }
        self.state = next;

        let snapshot = self.state.snapshot();
        let decision = self.engine.decide(&snapshot, target);
        let record = StepRecord::new(self.run_id, self.next_step, snapshot, decision);
        self.next_step += 1;
        Ok(record)
    }
}
