use crate::error::{Result, RetrievalError};
use serde::{Deserialize, Serialize};

pub const KEY_FINDINGS_MARKER: &str = "1. Key Findings:";
pub const DETAILED_ANALYSIS_MARKER: &str = "2. Detailed Analysis:";
pub const SUMMARY_MARKER: &str = "3. Summary:";

/// Generated answer split into its three sections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAnswer {
    pub key_findings: String,
    pub detailed_analysis: String,
    pub summary: String,
}

impl StructuredAnswer {
    /// Split generated text on the section markers.
    ///
    /// Each marker is searched for after the end of the previous one, so
    /// missing or out-of-order markers fail with `MalformedResponse`. The
    /// summary runs to the end of the text.
    pub fn parse(raw: &str) -> Result<Self> {
        let findings_start = find_after(raw, KEY_FINDINGS_MARKER, 0)?;
        let analysis_at = find_marker(raw, DETAILED_ANALYSIS_MARKER, findings_start)?;
        let analysis_start = analysis_at + DETAILED_ANALYSIS_MARKER.len();
        let summary_at = find_marker(raw, SUMMARY_MARKER, analysis_start)?;
        let summary_start = summary_at + SUMMARY_MARKER.len();

        Ok(Self {
            key_findings: raw[findings_start..analysis_at].trim().to_string(),
            detailed_analysis: raw[analysis_start..summary_at].trim().to_string(),
            summary: raw[summary_start..].trim().to_string(),
        })
    }
}

/// Byte offset just past `marker`
fn find_after(raw: &str, marker: &str, from: usize) -> Result<usize> {
    find_marker(raw, marker, from).map(|at| at + marker.len())
}

/// Byte offset of the first `marker` at or after `from`
fn find_marker(raw: &str, marker: &str, from: usize) -> Result<usize> {
    raw[from..]
        .find(marker)
        .map(|offset| from + offset)
        .ok_or_else(|| RetrievalError::MalformedResponse {
            reason: format!("missing section marker {marker:?}"),
            raw: raw.to_string(),
        })
}
