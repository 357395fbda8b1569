//! Quiz state machine.
//!
//! Pure and synchronous: no timers, no storage. The caller owns the result
//! display timer and calls [`QuizMachine::finish`] when it fires.
//!
//! ## State Transitions
//!
//! ```text
//! NameEntry -> Question(1) -> Question(2) -> Question(3) -> Submitting -> NameEntry
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::variant::{Question, QuizVariant};
use crate::error::ValidationError;
use crate::events::QuizEvent;
use crate::guest::GuestStatus;
use crate::scoring;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QuizStep {
    NameEntry,
    /// 1-based question number.
    Question { number: u8 },
    /// Verdict shown, waiting for the display timer.
    Submitting { status: GuestStatus },
}

impl QuizStep {
    /// Numeric step: 0 for name entry, 1-3 for questions, 3 while submitting.
    pub fn index(&self) -> u8 {
        match self {
            QuizStep::NameEntry => 0,
            QuizStep::Question { number } => *number,
            QuizStep::Submitting { .. } => 3,
        }
    }

    fn describe(&self) -> String {
        match self {
            QuizStep::NameEntry => "entering a name".to_string(),
            QuizStep::Question { number } => format!("on question {number}"),
            QuizStep::Submitting { .. } => "showing a result".to_string(),
        }
    }
}

/// Transient quiz session. Never persisted.
#[derive(Debug, Clone)]
pub struct QuizMachine {
    variant: QuizVariant,
    step: QuizStep,
    guest_name: String,
    q1: u32,
    q2: u32,
}

impl QuizMachine {
    pub fn new(variant: QuizVariant) -> Self {
        Self {
            variant,
            step: QuizStep::NameEntry,
            guest_name: String::new(),
            q1: 0,
            q2: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn variant(&self) -> QuizVariant {
        self.variant
    }

    pub fn step(&self) -> QuizStep {
        self.step
    }

    pub fn guest_name(&self) -> &str {
        &self.guest_name
    }

    /// Whether the start action is available.
    pub fn can_start(&self) -> bool {
        self.step == QuizStep::NameEntry && !self.guest_name.trim().is_empty()
    }

    pub fn current_question(&self) -> Option<&'static Question> {
        match self.step {
            QuizStep::Question { number } => self.variant.questions().get(number as usize - 1),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> QuizEvent {
        QuizEvent::StateSnapshot {
            step: self.step,
            guest_name: self.guest_name.clone(),
            question: self.current_question().map(|q| q.prompt.to_string()),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Edit the name draft. Ignored outside name entry.
    pub fn set_name(&mut self, name: impl Into<String>) {
        if self.step == QuizStep::NameEntry {
            self.guest_name = name.into();
        }
    }

    /// Move to the first question. `None` when the action is unavailable.
    pub fn start(&mut self) -> Option<QuizEvent> {
        if !self.can_start() {
            return None;
        }
        self.step = QuizStep::Question { number: 1 };
        tracing::debug!(variant = %self.variant, "quiz started");
        Some(QuizEvent::QuizStarted {
            name: self.guest_name.trim().to_string(),
            at: Utc::now(),
        })
    }

    /// Pick answer `index` on the current question.
    ///
    /// On the third question this scores the run and enters `Submitting`.
    ///
    /// # Errors
    /// Fails when no question is showing or the index does not exist.
    pub fn answer(&mut self, index: usize) -> Result<QuizEvent, ValidationError> {
        let QuizStep::Question { number } = self.step else {
            return Err(ValidationError::Unavailable {
                action: "answer".to_string(),
                state: self.step.describe(),
            });
        };
        let question = &self.variant.questions()[number as usize - 1];
        let option = question
            .options
            .get(index)
            .ok_or(ValidationError::AnswerOutOfRange {
                question: number,
                index,
                len: question.options.len(),
            })?;

        match number {
            1 | 2 => {
                if number == 1 {
                    self.q1 = option.score;
                } else {
                    self.q2 = option.score;
                }
                self.step = QuizStep::Question { number: number + 1 };
                Ok(QuizEvent::QuestionAnswered {
                    question: number,
                    score: option.score,
                    at: Utc::now(),
                })
            }
            _ => {
                let verdict = scoring::score(self.q1, self.q2, option.score, self.variant.reasons());
                let draft = verdict.clone().into_draft(&self.guest_name)?;
                self.step = QuizStep::Submitting {
                    status: verdict.status,
                };
                tracing::debug!(
                    variant = %self.variant,
                    total = verdict.total_score,
                    status = verdict.status.as_str(),
                    "quiz submitted"
                );
                Ok(QuizEvent::QuizSubmitted {
                    draft,
                    verdict,
                    at: Utc::now(),
                })
            }
        }
    }

    /// Clear the result overlay. `None` unless a result is showing.
    pub fn finish(&mut self) -> Option<QuizEvent> {
        if !matches!(self.step, QuizStep::Submitting { .. }) {
            return None;
        }
        self.step = QuizStep::NameEntry;
        self.guest_name.clear();
        Some(QuizEvent::ResultCleared { at: Utc::now() })
    }

    /// Drop all progress, as on leaving the page.
    pub fn reset(&mut self) -> QuizEvent {
        self.step = QuizStep::NameEntry;
        self.guest_name.clear();
        self.q1 = 0;
        self.q2 = 0;
        QuizEvent::QuizReset { at: Utc::now() }
    }
}
