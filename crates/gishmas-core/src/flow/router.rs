use chrono::{NaiveDate, Utc};

use super::days::GAME_DAY;
use super::{DayContent, DayGrid, NavAction, Page};
use crate::events::QuizEvent;

/// Exact message the embedded game posts to leave.
pub const GAME_BACK_SIGNAL: &str = "gishmas:navigate-back";

/// Current page and the transitions out of it.
#[derive(Debug, Clone)]
pub struct Router {
    page: Page,
    grid: DayGrid,
    today: NaiveDate,
}

impl Router {
    pub fn new(grid: DayGrid, today: NaiveDate) -> Self {
        Self {
            page: Page::Landing,
            grid,
            today,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn grid(&self) -> &DayGrid {
        &self.grid
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Where `action` leads from the current page. `None` means no move.
    pub fn target(&self, action: &NavAction) -> Option<Page> {
        match (self.page, action) {
            (Page::Landing, NavAction::Enter) => Some(Page::Home),
            (Page::Landing, NavAction::Back) => None,
            (Page::Home, NavAction::Back) => Some(Page::Landing),
            (_, NavAction::Back) => Some(Page::Home),
            (Page::Landing | Page::Home, NavAction::OpenQuiz(variant)) => Some(Page::Quiz(*variant)),
            (Page::Home, NavAction::OpenGame) => self.page_for_day(GAME_DAY),
            (Page::Home, NavAction::OpenDay(day)) => self.page_for_day(*day),
            (Page::Game, NavAction::FrameMessage(msg)) if msg == GAME_BACK_SIGNAL => Some(Page::Home),
            _ => None,
        }
    }

    fn page_for_day(&self, day: u32) -> Option<Page> {
        let slot = self.grid.slot(day, self.today)?;
        match (slot.unlocked, slot.content) {
            (true, DayContent::Page(page)) => Some(page),
            _ => None,
        }
    }

    /// Apply `action`, returning the page change if there was one.
    pub fn dispatch(&mut self, action: &NavAction) -> Option<QuizEvent> {
        let Some(to) = self.target(action) else {
            tracing::debug!(page = %self.page, ?action, "navigation ignored");
            return None;
        };
        let from = std::mem::replace(&mut self.page, to);
        tracing::info!(%from, %to, "page changed");
        Some(QuizEvent::PageChanged {
            from,
            to,
            at: Utc::now(),
        })
    }
}
