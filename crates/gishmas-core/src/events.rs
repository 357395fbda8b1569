use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::flow::Page;
use crate::guest::{Guest, GuestDraft};
use crate::quiz::QuizStep;
use crate::scoring::Verdict;

/// Every state change in the quiz flow produces an Event.
/// Front ends render from these; the CLI prints them as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuizEvent {
    /// Name accepted, first question shown.
    QuizStarted {
        name: String,
        at: DateTime<Utc>,
    },
    /// Answer recorded for question 1 or 2.
    QuestionAnswered {
        question: u8,
        score: u32,
        at: DateTime<Utc>,
    },
    /// Third answer given: verdict computed, result overlay shown.
    QuizSubmitted {
        draft: GuestDraft,
        verdict: Verdict,
        at: DateTime<Utc>,
    },
    /// A guest was handed to storage.
    GuestSaved {
        guest: Guest,
        remote: bool,
        at: DateTime<Utc>,
    },
    /// Result overlay cleared, back to name entry.
    ResultCleared {
        at: DateTime<Utc>,
    },
    QuizReset {
        at: DateTime<Utc>,
    },
    /// The visible guest list was replaced.
    GuestsUpdated {
        total: usize,
        sus: usize,
        invited: usize,
        at: DateTime<Utc>,
    },
    PageChanged {
        from: Page,
        to: Page,
        at: DateTime<Utc>,
    },
    /// Day 1 wheel stopped. Only once per session.
    SpinLanded {
        rotation_deg: u32,
        prize: String,
        at: DateTime<Utc>,
    },
    /// An unlocked day with nothing behind it yet.
    DayTeased {
        day: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        step: QuizStep,
        guest_name: String,
        question: Option<String>,
        at: DateTime<Utc>,
    },
}
