//! Fixed prompt text and canned degraded-mode responses.

/// Instruction sent with every image-analysis request. Defines the response
/// grammar parsed by [`crate::assessment::FloodAssessment`].
pub const FLOOD_IMAGE_ANALYSIS: &str = include_str!("../data/prompts/flood_image_analysis.txt");

/// Degraded-mode reply to `generate_from_text`.
pub const CANNED_FORECAST_REPORT: &str = include_str!("../data/canned/forecast_report.txt");

/// Degraded-mode reply to `analyze_image`.
pub const CANNED_IMAGE_REPORT: &str = include_str!("../data/canned/image_report.txt");

/// Delivered when the service answers without any text.
pub const NO_RESPONSE_TEXT: &str = "No response text";

/// Prefix of every failure delivered through a completion handler.
pub const ERROR_PREFIX: &str = "Error: ";
