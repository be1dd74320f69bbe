//! # envaware - environment beliefs for assistant policies
//!
//! envaware keeps a small set of decaying beliefs about the user's machine
//! (operating system, shell, installed tools) and turns them into the next
//! assistant action with a deterministic threshold policy.
//!
//! ## Core Concepts
//!
//! - **Token**: A named belief such as `"PowerShell"`; any string is allowed
//! - **EnvironmentState**: Token weights with multiplicative decay and additive reinforcement
//! - **PolicyEngine**: Ordered, first-match-wins rules over a weight snapshot
//! - **Decision**: Assumption, action and optional command or question
//!
//! ## Usage
//!
//! ```rust
//! use envaware::{Action, EnvironmentState, PolicyEngine};
//!
//! let mut state = EnvironmentState::new();
//! state.observe(["Windows", "PowerShell"], 0.7)?;
//! state.observe(["PandocInstalled", "PDFExportSuccess"], 0.8)?;
//! state.decay(0.1)?;
//!
//! let decision = PolicyEngine::default().decide(&state.snapshot(), "brief.md");
//! assert_eq!(decision.action, Action::ProvideCommand);
//! # Ok::<(), envaware::ValidationError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod controller;
pub mod error;
pub mod policy;
pub mod record;
pub mod state;
pub mod token;

// Re-export primary types at crate root for convenience
pub use config::{CommandTemplates, PolicyConfig, Thresholds};
pub use controller::{EnvironmentController, Observation};
pub use error::{EnvError, EnvResult, ValidationError};
pub use policy::{Action, Decision, PolicyEngine};
pub use record::{RunId, StepRecord};
pub use state::{EnvironmentState, Snapshot, DEFAULT_PRUNE_FLOOR};
pub use token::{KnownToken, Token};
