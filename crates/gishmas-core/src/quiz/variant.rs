//! Quiz variants and their question banks.
//!
//! v1 and v2 share the scoring rules but differ in wording, in where their
//! guests live, and in how they use local storage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::scoring::ReasonSet;

/// One selectable answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnswerOption {
    pub text: &'static str,
    pub score: u32,
}

/// One quiz question with its four answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub prompt: &'static str,
    pub options: [AnswerOption; 4],
}

const fn opt(text: &'static str, score: u32) -> AnswerOption {
    AnswerOption { text, score }
}

const PASSED: &str = "On the Nice List! 🎄";
const COPS: &str = "Called the cops on a nap.";
const KARAOKE: &str = "Hates holiday karaoke.";

const V1_REASONS: ReasonSet = ReasonSet {
    passed: PASSED,
    q1: COPS,
    q2: KARAOKE,
    q3: "Frowned at the double-ended gift.",
    fallback: "Frowned at the double-ended gift.",
};

const V2_REASONS: ReasonSet = ReasonSet {
    passed: PASSED,
    q1: COPS,
    q2: KARAOKE,
    q3: "Failed the holiday gift vibe check.",
    fallback: "Failed the holiday gift vibe check.",
};

const Q1_PROMPT: &str = "A GUEST PASSED OUT ON THE FLOOR AFTER 3 SHOTS. YOU:";
const Q2_PROMPT: &str = "A GUEST IS FORGETTING EVERY LYRIC AT KARAOKE. YOU:";
const Q3_PROMPT: &str = "I OPENED A DOUBLE-ENDED GAG GIFT. MY FACE IS:";

const V1_QUESTIONS: [Question; 3] = [
    Question {
        prompt: Q1_PROMPT,
        options: [
            opt("CALL THE COPS 👮", 100),
            opt("LAUGH AT THEM AND CALL THEM NAMES 😂", 0),
            opt("GIVE THEM WATER AND PAT THEIR HEAD 💧", 0),
            opt("GIVE THEM EGGNOG TO BOOST HOLIDAY SPIRIT 🥚", 0),
        ],
    },
    Question {
        prompt: Q2_PROMPT,
        options: [
            opt("TELL THEM TO STOP 🛑", 100),
            opt("SING WITH THEM 🎤", 0),
            opt("TAKE A SHOT 🥃", 0),
            opt("LEAVE THE ROOM 🏃", 0),
        ],
    },
    Question {
        prompt: Q3_PROMPT,
        options: [
            opt("FROWNING 😠", 100),
            opt("SMILING EAR TO EAR 😃", 0),
            opt("BLACK OUT HAPPY 🥴", 0),
            opt("HIDE IT FOR LATER 🤐", 0),
        ],
    },
];

const V2_QUESTIONS: [Question; 3] = [
    Question {
        prompt: Q1_PROMPT,
        options: [
            opt("🚓 CALL THE COPS", 100),
            opt("🤣 LAUGH AT THEM AND CALL THEM MEAN NAMES", 0),
            opt("💧 GIVE WATER AND PAT THEIR HEAD", 0),
            opt("🥚 GIVE EGGNOG TO BOOST THEIR HOLIDAY SPIRIT", 0),
        ],
    },
    Question {
        prompt: Q2_PROMPT,
        options: [
            opt("😐 TELL THEM TO STOP", 100),
            opt("🎤 SING WITH THEM", 0),
            opt("🥃 TAKE A SHOT SO THEY START TO SOUND BETTER", 0),
            opt("🥃 GIVE THEM A SHOT SO THEY THINK THEY START TO SOUND BETTER", 0),
        ],
    },
    Question {
        prompt: Q3_PROMPT,
        options: [
            opt("☹️ FROWNING", 100),
            opt("😁 SMILING EAR TO EAR", 0),
            opt("📢 IM SO HAPPY I BLACK OUT AND FORGET WHATEVER FACIAL EXPRESSION I MAKE", 0),
            opt("🙈 I MAKE A NEUTRAL FACE TO PRETEND IM NOT EXCITED", 0),
        ],
    },
];

/// How a variant mints ids for guests stored on this device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalIdStyle {
    /// Nine random base-36 characters.
    RandomToken,
    /// Creation time in epoch milliseconds.
    Timestamp,
}

/// Which sus test a page runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizVariant {
    #[default]
    V1,
    V2,
}

impl QuizVariant {
    pub const ALL: [QuizVariant; 2] = [QuizVariant::V1, QuizVariant::V2];

    /// Remote collection name. Disjoint between variants.
    pub fn collection(&self) -> &'static str {
        match self {
            QuizVariant::V1 => "guests",
            QuizVariant::V2 => "guests_v2",
        }
    }

    /// Local storage key holding the cached guest list.
    pub fn local_key(&self) -> &'static str {
        match self {
            QuizVariant::V1 => "gishmas-guests",
            QuizVariant::V2 => "gishmas_sus_v2_guests",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            QuizVariant::V1 => "GISHMAS SUS TEST",
            QuizVariant::V2 => "GISHMAS SUS TEST V2",
        }
    }

    pub fn reasons(&self) -> &'static ReasonSet {
        match self {
            QuizVariant::V1 => &V1_REASONS,
            QuizVariant::V2 => &V2_REASONS,
        }
    }

    pub fn questions(&self) -> &'static [Question; 3] {
        match self {
            QuizVariant::V1 => &V1_QUESTIONS,
            QuizVariant::V2 => &V2_QUESTIONS,
        }
    }

    /// v2 copies every remote snapshot into local storage and renders
    /// from it before the subscription delivers.
    pub fn mirrors_remote(&self) -> bool {
        matches!(self, QuizVariant::V2)
    }

    /// v2 writes every new guest locally first, even when signed in.
    pub fn writes_local_first(&self) -> bool {
        matches!(self, QuizVariant::V2)
    }

    pub fn local_id_style(&self) -> LocalIdStyle {
        match self {
            QuizVariant::V1 => LocalIdStyle::RandomToken,
            QuizVariant::V2 => LocalIdStyle::Timestamp,
        }
    }
}

impl fmt::Display for QuizVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizVariant::V1 => write!(f, "v1"),
            QuizVariant::V2 => write!(f, "v2"),
        }
    }
}

impl FromStr for QuizVariant {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v1" | "1" => Ok(QuizVariant::V1),
            "v2" | "2" => Ok(QuizVariant::V2),
            other => Err(ValidationError::UnknownVariant(other.to_string())),
        }
    }
}
