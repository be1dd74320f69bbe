//! Decaying token weights.
//!
//! [`EnvironmentState`] is the live belief store: every token maps to a
//! non-negative weight. Decay is multiplicative (beliefs fade toward zero but
//! never cross it), reinforcement is additive (evidence accumulates without a
//! ceiling). Absence and zero mean the same thing.

use std::collections::btree_map::{self, BTreeMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EnvResult, ValidationError};
use crate::token::Token;

/// Weight below which [`EnvironmentState::prune`] callers usually drop a token.
pub const DEFAULT_PRUNE_FLOOR: f64 = 1e-6;

fn validate_rate(rate: f64) -> Result<(), ValidationError> {
    if (0.0..1.0).contains(&rate) {
        Ok(())
    } else {
        Err(ValidationError::DecayRateOutOfRange { rate })
    }
}

fn validate_amount(token: &str, amount: f64) -> Result<(), ValidationError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidReinforcement {
            token: token.to_string(),
            amount,
        })
    }
}

fn validate_weight(token: &str, weight: f64) -> Result<(), ValidationError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidReinforcement {
            token: token.to_string(),
            amount: weight,
        })
    }
}

/// Live token -> weight store.
///
/// Mutators take `&mut self`; sharing one state across threads needs an
/// external lock around each call.
///
/// # Examples
///
/// ```
/// use envaware::EnvironmentState;
///
/// let mut state = EnvironmentState::new();
/// state.reinforce("PowerShell", 0.8).unwrap();
/// state.decay(0.5).unwrap();
/// assert!((state.get("PowerShell") - 0.4).abs() < 1e-12);
/// assert_eq!(state.get("Windows"), 0.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvironmentState {
    weights: BTreeMap<Token, f64>,
}

impl EnvironmentState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state from initial weights.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for blank token names or weights that are
    /// negative or not finite. Repeated names keep the last weight.
    pub fn with_seed<I, K>(seed: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut weights = BTreeMap::new();
        for (name, weight) in seed {
            let token = Token::new(name)?;
            validate_weight(token.as_str(), weight)?;
            weights.insert(token, weight);
        }
        Ok(Self { weights })
    }

    /// Multiplies every weight by `1 - rate`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::DecayRateOutOfRange` unless `rate` is in
    /// `[0.0, 1.0)`.
    pub fn decay(&mut self, rate: f64) -> Result<(), ValidationError> {
        validate_rate(rate)?;
        let factor = 1.0 - rate;
        for weight in self.weights.values_mut() {
            *weight *= factor;
        }
        debug!(rate, tokens = self.weights.len(), "decayed environment weights");
        Ok(())
    }

    /// Adds `amount` to `token`, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyToken` for a blank name and
    /// `ValidationError::InvalidReinforcement` unless `amount` is finite and
    /// positive and the new weight stays finite.
    pub fn reinforce(&mut self, token: &str, amount: f64) -> Result<(), ValidationError> {
        self.observe([token], amount)
    }

    /// Reinforces every token in `tokens` by `intensity`.
    ///
    /// The whole batch is validated before any weight changes.
    ///
    /// # Errors
    ///
    /// Same as [`EnvironmentState::reinforce`].
    pub fn observe<I, S>(&mut self, tokens: I, intensity: f64) -> Result<(), ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|name| Token::new(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let staged = self.stage(tokens, intensity)?;
        self.commit(staged, intensity);
        Ok(())
    }

    /// Computes the post-reinforcement weight of every token in the batch.
    fn stage(
        &self,
        tokens: Vec<Token>,
        amount: f64,
    ) -> Result<BTreeMap<Token, f64>, ValidationError> {
        let mut staged: BTreeMap<Token, f64> = BTreeMap::new();
        for token in tokens {
            validate_amount(token.as_str(), amount)?;
            let current = staged
                .get(&token)
                .copied()
                .unwrap_or_else(|| self.get(token.as_str()));
            let next = current + amount;
            if !next.is_finite() {
                return Err(ValidationError::InvalidReinforcement {
                    token: token.to_string(),
                    amount,
                });
            }
            staged.insert(token, next);
        }
        Ok(staged)
    }

    fn commit(&mut self, staged: BTreeMap<Token, f64>, amount: f64) {
        for (token, weight) in staged {
            match self.weights.entry(token) {
                btree_map::Entry::Occupied(mut entry) => {
                    *entry.get_mut() = weight;
                    debug!(token = %entry.key(), amount, weight, "reinforced token");
                }
                btree_map::Entry::Vacant(entry) => {
                    if entry.key().known().is_none() {
                        warn!(token = %entry.key(), "tracking unrecognized environment token");
                    }
                    debug!(token = %entry.key(), amount, weight, "observed new token");
                    entry.insert(weight);
                }
            }
        }
    }

    /// Returns the weight of `token`, 0 if it was never observed.
    #[must_use]
    pub fn get(&self, token: &str) -> f64 {
        self.weights.get(token).copied().unwrap_or(0.0)
    }

    /// True if the weight of `token` is at least `threshold`.
    #[must_use]
    pub fn hypothesis(&self, token: &str, threshold: f64) -> bool {
        self.get(token) >= threshold
    }

    /// Drops every token whose weight is below `min_weight` and returns how
    /// many were removed.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidFloor` if `min_weight` is not finite.
    pub fn prune(&mut self, min_weight: f64) -> Result<usize, ValidationError> {
        if !min_weight.is_finite() {
            return Err(ValidationError::InvalidFloor { floor: min_weight });
        }
        let before = self.weights.len();
        self.weights.retain(|_, weight| *weight >= min_weight);
        let removed = before - self.weights.len();
        if removed > 0 {
            warn!(removed, min_weight, "pruned faded environment tokens");
        }
        Ok(removed)
    }

    /// Returns a copy of the weights, unaffected by later mutation.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            weights: self.weights.clone(),
        }
    }

    /// Number of tracked tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// True if no token is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Iterates tokens and weights in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&Token, f64)> {
        self.weights.iter().map(|(token, weight)| (token, *weight))
    }

    /// Pretty-printed JSON object of the current weights.
    ///
    /// # Errors
    ///
    /// Returns `EnvError::Serialization` if encoding fails.
    pub fn to_json(&self) -> EnvResult<String> {
        Ok(serde_json::to_string_pretty(&self.weights)?)
    }
}

/// Read-only copy of an [`EnvironmentState`].
///
/// Deserialization applies the same checks as [`Snapshot::from_weights`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<Token, f64>")]
pub struct Snapshot {
    weights: BTreeMap<Token, f64>,
}

impl TryFrom<BTreeMap<String, f64>> for Snapshot {
    type Error = ValidationError;

    fn try_from(weights: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        Self::from_weights(weights)
    }
}

impl From<Snapshot> for BTreeMap<Token, f64> {
    fn from(snapshot: Snapshot) -> Self {
        snapshot.weights
    }
}

impl Snapshot {
    /// Builds a snapshot directly from weights, e.g. for policy tests.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for blank names or negative/non-finite
    /// weights.
    pub fn from_weights<I, K>(weights: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        EnvironmentState::with_seed(weights).map(|state| state.snapshot())
    }

    /// Returns the weight of `token`, 0 if absent.
    #[must_use]
    pub fn get(&self, token: &str) -> f64 {
        self.weights.get(token).copied().unwrap_or(0.0)
    }

    /// Number of tokens in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// True if the snapshot holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Iterates tokens and weights in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&Token, f64)> {
        self.weights.iter().map(|(token, weight)| (token, *weight))
    }
}
