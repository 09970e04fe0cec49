//! Parsing of image-analysis replies.
//!
//! The relay hands back raw text. Callers that asked for a flood assessment
//! use [`FloodAssessment::parse`] to read the labeled fields requested by
//! [`crate::prompts::FLOOD_IMAGE_ANALYSIS`]. Parsing is lenient: the model
//! does not always follow the format exactly.

use crate::prompts::ERROR_PREFIX;
use std::fmt;

pub const DEFAULT_DESCRIPTION: &str = "Flood detected by AI";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "NONE",
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloodAssessment {
    pub flood_detected: bool,
    pub severity: Severity,
    /// Percentage in `0..=100`, when the reply carried one.
    pub confidence: Option<u8>,
    pub description: Option<String>,
    pub safety_tip: Option<String>,
    /// The reply was a relay failure rather than a model answer.
    pub is_error: bool,
}

impl FloodAssessment {
    pub fn parse(text: &str) -> Self {
        let is_error = text.starts_with(ERROR_PREFIX);
        let upper = text.to_uppercase();

        let flood_detected = !is_error
            && (upper.contains("FLOOD_DETECTED: YES") || upper.contains("FLOOD_DETECTED:YES"));

        let severity = if !flood_detected {
            Severity::None
        } else if upper.contains("SEVERITY: HIGH") || upper.contains("SEVERITY:HIGH") {
            Severity::High
        } else if upper.contains("SEVERITY: MEDIUM") || upper.contains("SEVERITY:MEDIUM") {
            Severity::Medium
        } else {
            Severity::Low
        };

        let description = field_value(text, "DESCRIPTION:").or_else(|| {
            flood_detected.then(|| DEFAULT_DESCRIPTION.to_string())
        });

        let confidence = field_value(text, "CONFIDENCE:").and_then(|raw| parse_percent(&raw));

        Self {
            flood_detected,
            severity,
            confidence,
            description,
            safety_tip: field_value(text, "SAFETY_TIP:"),
            is_error,
        }
    }
}

/// Rest of the line after the first case-insensitive occurrence of `label`,
/// trimmed, in the original casing.
fn field_value(text: &str, label: &str) -> Option<String> {
    // ASCII uppercasing keeps byte offsets aligned with `text`.
    let idx = text.to_ascii_uppercase().find(label)?;
    let rest = &text[idx + label.len()..];
    let line = rest.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

fn parse_percent(raw: &str) -> Option<u8> {
    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u8>().ok().filter(|p| *p <= 100)
}
