//! Page flow: router, day grid, and the quiz page.

mod app;
mod days;
mod quiz_page;
mod router;

pub use app::App;
pub use days::{DailySpin, DayContent, DayGrid, DaySlot, SpinResult, UnlockPolicy, DAY_COUNT};
pub use quiz_page::QuizPage;
pub use router::{Router, GAME_BACK_SIGNAL};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::quiz::QuizVariant;

/// Top-level pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Landing,
    Home,
    Quiz(QuizVariant),
    /// Embedded external game.
    Game,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Landing => write!(f, "landing"),
            Page::Home => write!(f, "home"),
            Page::Quiz(variant) => write!(f, "quiz {variant}"),
            Page::Game => write!(f, "game"),
        }
    }
}

/// Named navigation actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    /// Landing to home.
    Enter,
    Back,
    OpenQuiz(QuizVariant),
    OpenGame,
    /// Tap a day slot on the home grid.
    OpenDay(u32),
    /// One-way message posted by the embedded game.
    FrameMessage(String),
}
