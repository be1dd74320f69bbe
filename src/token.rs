//! Environment tokens.
//!
//! Any non-empty string is a valid token. [`KnownToken`] lists the tokens this
//! crate has a meaning for; anything else is still stored, but logged so typos
//! in observation feeds are visible.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A named belief about the environment, e.g. `"PowerShell"`.
///
/// Serialized as a plain string; deserialization rejects blank names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Token(String);

impl Token {
    /// Creates a token, rejecting empty or whitespace-only names.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyToken` if `name` is blank.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyToken);
        }
        Ok(Self(name))
    }

    /// Returns the token name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the allowlisted token this name refers to, if any.
    #[must_use]
    pub fn known(&self) -> Option<KnownToken> {
        self.0.parse().ok()
    }
}

impl TryFrom<String> for Token {
    type Error = ValidationError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<KnownToken> for Token {
    fn from(known: KnownToken) -> Self {
        Self(known.as_str().to_string())
    }
}

/// Tokens with a defined meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownToken {
    /// The user is on Windows.
    Windows,
    /// A PowerShell session is available.
    PowerShell,
    /// Pandoc is installed and on the path.
    PandocInstalled,
    /// A previous PDF export succeeded.
    PdfExportSuccess,
}

impl KnownToken {
    /// Tokens the policy reads, in tie-break order.
    pub const TRACKED: [Self; 3] = [Self::Windows, Self::PowerShell, Self::PandocInstalled];

    /// Returns the canonical token name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::PowerShell => "PowerShell",
            Self::PandocInstalled => "PandocInstalled",
            Self::PdfExportSuccess => "PDFExportSuccess",
        }
    }

    /// Question that would settle this belief.
    #[must_use]
    pub const fn question(self) -> &'static str {
        match self {
            Self::Windows => "Are you working on Windows?",
            Self::PowerShell => "Can you run commands in PowerShell?",
            Self::PandocInstalled => "Do you have Pandoc installed?",
            Self::PdfExportSuccess => "Have you exported a PDF on this machine before?",
        }
    }
}

impl fmt::Display for KnownToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KnownToken {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Windows" => Ok(Self::Windows),
            "PowerShell" => Ok(Self::PowerShell),
            "PandocInstalled" => Ok(Self::PandocInstalled),
            "PDFExportSuccess" => Ok(Self::PdfExportSuccess),
            _ => Err(()),
        }
    }
}
