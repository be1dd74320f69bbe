//! Policy configuration.
//!
//! Thresholds and command templates are data, not literals in the decision
//! code, so callers (and tests) can inject boundary values. Every section
//! deserializes with defaults, so a partial JSON document is enough:
//!
//! ```
//! use envaware::PolicyConfig;
//!
//! let config = PolicyConfig::from_json_str(r#"{ "thresholds": { "confident": 0.6 } }"#).unwrap();
//! assert_eq!(config.thresholds.confident, 0.6);
//! assert_eq!(config.templates.pdf_engine, "xelatex");
//! ```

use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::{EnvResult, ValidationError};

/// Placeholders accepted in the conversion template.
pub const CONVERSION_PLACEHOLDERS: [&str; 3] = ["input", "output", "engine"];

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> Result<&'static Regex, ValidationError> {
    if let Some(re) = PLACEHOLDER.get() {
        return Ok(re);
    }
    let compiled = Regex::new(r"\{([^{}]*)\}").map_err(|e| ValidationError::InvalidTemplate {
        template: String::new(),
        reason: format!("placeholder pattern failed to compile: {e}"),
    })?;
    Ok(PLACEHOLDER.get_or_init(|| compiled))
}

fn check_placeholders(template: &str, allowed: &[&str]) -> Result<(), ValidationError> {
    for caps in placeholder_regex()?.captures_iter(template) {
        let name = &caps[1];
        if !allowed.contains(&name) {
            return Err(ValidationError::InvalidTemplate {
                template: template.to_string(),
                reason: format!("unknown placeholder '{{{name}}}'"),
            });
        }
    }
    Ok(())
}

/// Threshold comparisons used by the policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum weight at which a token counts as present (inclusive).
    pub confident: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { confident: 0.5 }
    }
}

/// Command payloads attached to decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandTemplates {
    /// Conversion command; `{input}`, `{output}` and `{engine}` are substituted.
    pub conversion: String,

    /// Installation command, used verbatim.
    pub install: String,

    /// Value substituted for `{engine}`.
    pub pdf_engine: String,
}

impl Default for CommandTemplates {
    fn default() -> Self {
        Self {
            conversion: r#"pandoc "{input}" -o "{output}" --pdf-engine={engine}"#.to_string(),
            install: "winget install Pandoc.Pandoc".to_string(),
            pdf_engine: "xelatex".to_string(),
        }
    }
}

impl CommandTemplates {
    /// Renders the conversion command for a Markdown file at `target`.
    ///
    /// The output path is `target` with its extension replaced by `pdf`.
    /// Placeholders are substituted in a single pass, so braces inside
    /// `target` are copied through untouched.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyTarget` if `target` is blank.
    pub fn render_conversion(&self, target: &str) -> Result<String, ValidationError> {
        if target.trim().is_empty() {
            return Err(ValidationError::EmptyTarget);
        }
        let output = Path::new(target).with_extension("pdf");
        let output = output.to_string_lossy();
        let rendered = placeholder_regex()?.replace_all(&self.conversion, |caps: &Captures<'_>| {
            match &caps[1] {
                "input" => target.to_string(),
                "output" => output.to_string(),
                "engine" => self.pdf_engine.clone(),
                _ => caps[0].to_string(),
            }
        });
        Ok(rendered.into_owned())
    }
}

/// Full policy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Threshold values.
    pub thresholds: Thresholds,

    /// Command templates.
    pub templates: CommandTemplates,

    /// Question asked when nothing about the environment is known.
    pub default_question: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            templates: CommandTemplates::default(),
            default_question: "Do you have Pandoc installed and can you run PowerShell on Windows?"
                .to_string(),
        }
    }
}

impl PolicyConfig {
    /// Default configuration with a different confidence threshold.
    #[must_use]
    pub fn with_confident(confident: f64) -> Self {
        Self {
            thresholds: Thresholds { confident },
            ..Self::default()
        }
    }

    /// Checks thresholds and templates.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidThreshold` for a negative or
    /// non-finite threshold, `ValidationError::InvalidTemplate` for a
    /// conversion template without `{input}`, with unknown placeholders, or
    /// an install command containing placeholders.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let confident = self.thresholds.confident;
        if !confident.is_finite() || confident < 0.0 {
            return Err(ValidationError::InvalidThreshold {
                name: "confident".to_string(),
                value: confident,
            });
        }

        let conversion = &self.templates.conversion;
        if !conversion.contains("{input}") {
            return Err(ValidationError::InvalidTemplate {
                template: conversion.clone(),
                reason: "missing '{input}' placeholder".to_string(),
            });
        }
        check_placeholders(conversion, &CONVERSION_PLACEHOLDERS)?;
        check_placeholders(&self.templates.install, &[])?;
        Ok(())
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns `EnvError::Serialization` for malformed JSON and
    /// `EnvError::Validation` if [`PolicyConfig::validate`] fails.
    pub fn from_json_str(json: &str) -> EnvResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        PolicyConfig::default().validate().unwrap();
    }

    #[test]
    fn test_render_conversion_swaps_extension() {
        let cmd = CommandTemplates::default().render_conversion("docs/brief.md").unwrap();
        assert_eq!(cmd, r#"pandoc "docs/brief.md" -o "docs/brief.pdf" --pdf-engine=xelatex"#);
    }

    #[test]
    fn test_render_conversion_uses_configured_engine() {
        let templates = CommandTemplates {
            pdf_engine: "lualatex".to_string(),
            ..CommandTemplates::default()
        };
        assert!(templates.render_conversion("a.md").unwrap().ends_with("--pdf-engine=lualatex"));
    }

    #[test]
    fn test_render_conversion_keeps_braces_in_target() {
        let cmd = CommandTemplates::default().render_conversion("notes{engine}.md").unwrap();
        assert_eq!(
            cmd,
            r#"pandoc "notes{engine}.md" -o "notes{engine}.pdf" --pdf-engine=xelatex"#
        );

        let cmd = CommandTemplates::default().render_conversion("{output}/a.md").unwrap();
        assert!(cmd.starts_with(r#"pandoc "{output}/a.md" -o "{output}/a.pdf""#));
    }

    #[test]
    fn test_render_conversion_rejects_blank_target() {
        let templates = CommandTemplates::default();
        assert_eq!(templates.render_conversion(""), Err(ValidationError::EmptyTarget));
        assert_eq!(templates.render_conversion("  "), Err(ValidationError::EmptyTarget));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let err = PolicyConfig::with_confident(-0.1).validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidThreshold { .. }));
        assert!(PolicyConfig::with_confident(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_unknown_placeholder_rejected() {
        let mut config = PolicyConfig::default();
        config.templates.conversion = "pandoc {input} -o {target}".to_string();
        let err = config.validate().unwrap_err();
        assert!(format!("{err}").contains("{target}"));
    }

    #[test]
    fn test_conversion_requires_input() {
        let mut config = PolicyConfig::default();
        config.templates.conversion = "pandoc --version".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_install_command_takes_no_placeholders() {
        let mut config = PolicyConfig::default();
        config.templates.install = "choco install {package}".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config =
            PolicyConfig::from_json_str(r#"{"templates": {"install": "scoop install pandoc"}}"#)
                .unwrap();
        assert_eq!(config.templates.install, "scoop install pandoc");
        assert_eq!(config.thresholds.confident, 0.5);
        assert_eq!(config.default_question, PolicyConfig::default().default_question);
    }

    #[test]
    fn test_from_json_str_reports_kind() {
        assert!(PolicyConfig::from_json_str("{").unwrap_err().is_serialization());
        assert!(PolicyConfig::from_json_str(r#"{"thresholds": {"confident": -1.0}}"#)
            .unwrap_err()
            .is_validation());
    }
}
