use chrono::{NaiveDate, Utc};

use super::{DailySpin, DayContent, DayGrid, NavAction, Page, QuizPage, Router};
use crate::context::AppContext;
use crate::events::QuizEvent;

/// Page flow for one session.
///
/// Mounts a [`QuizPage`] when a quiz page is entered and drops it on the way
/// out, so its subscription and overlay timer never outlive the page.
pub struct App<'a> {
    ctx: &'a AppContext,
    router: Router,
    spin: DailySpin,
    quiz: Option<QuizPage>,
}

impl<'a> App<'a> {
    pub fn new(ctx: &'a AppContext, today: NaiveDate) -> Self {
        let grid = DayGrid::new(ctx.config().unlock_policy());
        Self {
            ctx,
            router: Router::new(grid, today),
            spin: DailySpin::new(),
            quiz: None,
        }
    }

    pub fn page(&self) -> Page {
        self.router.page()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn spin(&self) -> &DailySpin {
        &self.spin
    }

    pub fn quiz(&self) -> Option<&QuizPage> {
        self.quiz.as_ref()
    }

    pub fn quiz_mut(&mut self) -> Option<&mut QuizPage> {
        self.quiz.as_mut()
    }

    /// Apply a navigation action. Day slots that do not open a page act in
    /// place: day 1 spins the wheel, other unlocked days show a teaser.
    pub fn dispatch(&mut self, action: NavAction) -> Vec<QuizEvent> {
        if let (Page::Home, NavAction::OpenDay(day)) = (self.page(), &action) {
            let slot = self.router.grid().slot(*day, self.router.today());
            match slot {
                Some(slot) if slot.unlocked && slot.content == DayContent::DailySpin => {
                    return self.spin.spin(&mut rand::thread_rng()).into_iter().collect();
                }
                Some(slot) if slot.unlocked && slot.content == DayContent::Teaser => {
                    return vec![QuizEvent::DayTeased {
                        day: slot.day,
                        at: Utc::now(),
                    }];
                }
                _ => {}
            }
        }

        let Some(event) = self.router.dispatch(&action) else {
            return Vec::new();
        };
        if let Some(page) = self.quiz.take() {
            page.unmount();
        }
        if let Page::Quiz(variant) = self.page() {
            self.quiz = Some(QuizPage::mount(self.ctx, variant));
        }
        vec![event]
    }
}
