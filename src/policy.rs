//! Threshold policy over environment snapshots.
//!
//! Rules are evaluated in a fixed order and the first match wins:
//!
//! 1. Windows, PowerShell and Pandoc all present: hand over the conversion
//!    command.
//! 2. PowerShell present, Pandoc not: suggest installing Pandoc.
//! 3. Otherwise: ask about the least-supported tracked token.
//!
//! "Present" is `weight >= confident`; "uncertain" is `weight < confident`.
//! The policy is pure: it reads the snapshot and configuration only and never
//! fails.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{PolicyConfig, Thresholds};
use crate::error::ValidationError;
use crate::state::Snapshot;
use crate::token::KnownToken;

/// The action a [`Decision`] selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Provide a ready-to-run conversion command.
    ProvideCommand,
    /// Suggest installing the missing tool.
    SuggestInstall,
    /// Ask the user a clarifying question.
    AskQuestion,
}

impl Action {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ProvideCommand => "Provide direct conversion command",
            Self::SuggestInstall => "Suggest install command",
            Self::AskQuestion => "Ask clarifying question",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one policy evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// What the policy believes about the environment.
    pub assumption: String,

    /// Selected action.
    pub action: Action,

    /// Command payload for `ProvideCommand` and `SuggestInstall`.
    pub command: Option<String>,

    /// Question for `AskQuestion`.
    pub question: Option<String>,
}

impl Decision {
    fn provide(command: String) -> Self {
        Self {
            assumption: "Windows + PowerShell + Pandoc present".to_string(),
            action: Action::ProvideCommand,
            command: Some(command),
            question: None,
        }
    }

    fn suggest_install(command: String) -> Self {
        Self {
            assumption: "PowerShell present, Pandoc uncertain".to_string(),
            action: Action::SuggestInstall,
            command: Some(command),
            question: None,
        }
    }

    fn ask_for_target() -> Self {
        Self {
            assumption: "Windows + PowerShell + Pandoc present".to_string(),
            action: Action::AskQuestion,
            command: None,
            question: Some("Which Markdown file should be converted to PDF?".to_string()),
        }
    }

    fn ask(question: String) -> Self {
        Self {
            assumption: "Environment insufficiently known".to_string(),
            action: Action::AskQuestion,
            command: None,
            question: Some(question),
        }
    }
}

/// Deterministic mapping from a [`Snapshot`] to a [`Decision`].
///
/// # Examples
///
/// ```
/// use envaware::{Action, EnvironmentState, PolicyEngine};
///
/// let mut state = EnvironmentState::new();
/// state.reinforce("PowerShell", 0.9).unwrap();
///
/// let decision = PolicyEngine::default().decide(&state.snapshot(), "brief.md");
/// assert_eq!(decision.action, Action::SuggestInstall);
/// assert_eq!(decision.command.as_deref(), Some("winget install Pandoc.Pandoc"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyEngine {
    config: PolicyConfig,
}

impl PolicyEngine {
    /// Creates an engine after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns the error from [`PolicyConfig::validate`].
    pub fn new(config: PolicyConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Selects an action for converting the Markdown file at `target`, using
    /// the configured thresholds.
    #[must_use]
    pub fn decide(&self, snapshot: &Snapshot, target: &str) -> Decision {
        self.decide_with(snapshot, &self.config.thresholds, target)
    }

    /// Like [`PolicyEngine::decide`], with per-call thresholds instead of the
    /// configured ones.
    ///
    /// `thresholds` is not validated here: a NaN `confident` treats every
    /// token as absent. A blank `target` with the full toolchain present asks
    /// which file to convert.
    #[must_use]
    pub fn decide_with(
        &self,
        snapshot: &Snapshot,
        thresholds: &Thresholds,
        target: &str,
    ) -> Decision {
        let confident = thresholds.confident;
        let present = |token: KnownToken| snapshot.get(token.as_str()) >= confident;

        let windows = present(KnownToken::Windows);
        let powershell = present(KnownToken::PowerShell);
        let pandoc = present(KnownToken::PandocInstalled);

        let decision = if windows && powershell && pandoc {
            match self.config.templates.render_conversion(target) {
                Ok(command) => Decision::provide(command),
                Err(err) => {
                    debug!(%err, "conversion command unavailable");
                    Decision::ask_for_target()
                }
            }
        } else if powershell && !pandoc {
            Decision::suggest_install(self.config.templates.install.clone())
        } else {
            Decision::ask(self.next_question(snapshot))
        };

        debug!(
            action = %decision.action,
            windows,
            powershell,
            pandoc,
            confident,
            "policy decision"
        );
        decision
    }

    /// Question for the lowest-weighted tracked token; ties go to the
    /// earliest in [`KnownToken::TRACKED`].
    fn next_question(&self, snapshot: &Snapshot) -> String {
        let weights = KnownToken::TRACKED.map(|token| (token, snapshot.get(token.as_str())));
        if weights.iter().all(|(_, weight)| *weight <= 0.0) {
            return self.config.default_question.clone();
        }

        let mut weakest = weights[0];
        for candidate in &weights[1..] {
            if candidate.1 < weakest.1 {
                weakest = *candidate;
            }
        }
        weakest.0.question().to_string()
    }
}
