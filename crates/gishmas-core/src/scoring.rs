//! Sus test scoring.
//!
//! Three answer scores go in, a verdict comes out:
//!
//! ```text
//! total  = q1 + q2 + q3
//! sus    = total > 50
//! level  = high if total > 150, medium if sus, low otherwise
//! reason = reason of the first of q1, q2, q3 scoring >= 50, else the fallback
//! ```
//!
//! Answer scores are not validated; they always come from the question bank.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::guest::{GuestDraft, GuestStatus, SusLevel};

/// Total above which a guest is sus.
pub const SUS_THRESHOLD: u32 = 50;
/// Total above which a sus guest is high severity.
pub const HIGH_THRESHOLD: u32 = 150;
/// Single-answer score that pins the reason to that question.
pub const EXTREME_ANSWER: u32 = 50;

/// Canned reason strings for one quiz variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasonSet {
    pub passed: &'static str,
    pub q1: &'static str,
    pub q2: &'static str,
    pub q3: &'static str,
    /// Sus by sum alone, with no single extreme answer.
    pub fallback: &'static str,
}

/// Outcome of scoring one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub total_score: u32,
    pub status: GuestStatus,
    pub sus_level: SusLevel,
    pub reason: String,
}

impl Verdict {
    pub fn is_sus(&self) -> bool {
        self.status == GuestStatus::Sus
    }

    /// Turn the verdict into a draft for `name`.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyName`] for a blank name.
    pub fn into_draft(self, name: &str) -> Result<GuestDraft, ValidationError> {
        GuestDraft::new(name, self.reason, self.sus_level, self.status)
    }
}

/// Score three answers.
pub fn score(q1: u32, q2: u32, q3: u32, reasons: &ReasonSet) -> Verdict {
    let total_score = q1 + q2 + q3;
    let is_sus = total_score > SUS_THRESHOLD;

    let sus_level = if total_score > HIGH_THRESHOLD {
        SusLevel::High
    } else if is_sus {
        SusLevel::Medium
    } else {
        SusLevel::Low
    };

    let reason = if !is_sus {
        reasons.passed
    } else if q1 >= EXTREME_ANSWER {
        reasons.q1
    } else if q2 >= EXTREME_ANSWER {
        reasons.q2
    } else if q3 >= EXTREME_ANSWER {
        reasons.q3
    } else {
        reasons.fallback
    };

    Verdict {
        total_score,
        status: if is_sus { GuestStatus::Sus } else { GuestStatus::Invited },
        sus_level,
        reason: reason.to_string(),
    }
}
