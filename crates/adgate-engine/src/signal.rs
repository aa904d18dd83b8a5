//! # Privacy-Preserving Signals
//!
//! Builds the anonymized "question list" reported for each impression. A
//! question names only the coarse parent category of the ad's segment plus a
//! fixed total counter, so the aggregate collector learns how many
//! impressions each category received and nothing about which ad, user or
//! moment produced them.

use adgate_core::{AdKind, Segment};
use serde::{Deserialize, Serialize};

/// Question prefix for per-category impression counts.
pub const SEGMENT_QUESTION_PREFIX: &str = "Brave.P2A.AdImpressionsPerSegment.";

/// Question counting every impression.
pub const TOTAL_IMPRESSIONS_QUESTION: &str = "Brave.P2A.TotalAdImpressions";

/// An anonymized impression report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// Event name, `{ad_kind}_impression`.
    pub name: String,
    /// Questions answered by this impression.
    pub questions: Vec<String>,
}

/// Build the question list for an impression in `segment`.
///
/// The parent category is reduced to lowercase ASCII alphanumerics. If
/// nothing survives, only the total question is returned.
pub fn build_signal(segment: &Segment) -> Vec<String> {
    let category: String = segment
        .parent()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let mut questions = Vec::with_capacity(2);
    if !category.is_empty() {
        questions.push(format!("{SEGMENT_QUESTION_PREFIX}{category}"));
    }
    questions.push(TOTAL_IMPRESSIONS_QUESTION.to_string());
    questions
}

/// The impression signal for an ad of `ad_kind` in `segment`.
pub fn impression_signal(ad_kind: AdKind, segment: &Segment) -> Signal {
    Signal {
        name: format!("{}_impression", ad_kind.as_str()),
        questions: build_signal(segment),
    }
}
