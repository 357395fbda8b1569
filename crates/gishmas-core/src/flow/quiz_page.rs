//! The sus test page.
//!
//! Owns one quiz run, the visible guest list, the live subscription feeding
//! it, the result overlay deadline, and any remote writes still in flight.
//! Remote writes run in the background so the result shows at once. When
//! the page is dropped the subscription task is aborted and the overlay
//! deadline stops existing, so nothing fires after unmount; in-flight
//! writes are detached and finish on their own.

use std::time::Duration;

use chrono::Utc;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{sleep_until, Instant};

use crate::context::AppContext;
use crate::error::ValidationError;
use crate::events::QuizEvent;
use crate::guest::{filter_by_name, Guest};
use crate::quiz::{QuizMachine, QuizStep, QuizVariant};
use crate::repository::{GuestBook, Subscription};
use crate::scoring::Verdict;

enum Wake {
    Snapshot(Option<Vec<Guest>>),
    Saved(Option<Result<Option<Guest>, JoinError>>),
    OverlayExpired,
    Idle,
}

pub struct QuizPage {
    machine: QuizMachine,
    book: GuestBook,
    guests: Vec<Guest>,
    subscription: Subscription,
    result_display: Duration,
    overlay_until: Option<Instant>,
    verdict: Option<Verdict>,
    saves: JoinSet<Option<Guest>>,
    filter: String,
}

impl QuizPage {
    /// Render from the local cache and start listening when signed in.
    pub fn mount(ctx: &AppContext, variant: QuizVariant) -> Self {
        let book = ctx.guest_book(variant);
        let guests = book.initial_guests();
        let subscription = book.live_subscription();
        tracing::debug!(%variant, cached = guests.len(), remote = book.is_remote(), "quiz page mounted");
        Self {
            machine: QuizMachine::new(variant),
            book,
            guests,
            subscription,
            result_display: ctx.config().result_display(),
            overlay_until: None,
            verdict: None,
            saves: JoinSet::new(),
            filter: String::new(),
        }
    }

    /// Swap in storage for the context's current user. The old
    /// subscription is torn down before the new one starts.
    pub fn resubscribe(&mut self, ctx: &AppContext) {
        self.subscription.unsubscribe();
        self.book = ctx.guest_book(self.machine.variant());
        self.subscription = self.book.live_subscription();
    }

    pub fn variant(&self) -> QuizVariant {
        self.machine.variant()
    }

    pub fn machine(&self) -> &QuizMachine {
        &self.machine
    }

    pub fn step(&self) -> QuizStep {
        self.machine.step()
    }

    pub fn is_listening(&self) -> bool {
        self.subscription.is_active()
    }

    /// Verdict shown by the result overlay, while it is up.
    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    pub fn overlay_active(&self) -> bool {
        self.overlay_until.is_some()
    }

    /// A remote write is still in flight.
    pub fn is_saving(&self) -> bool {
        !self.saves.is_empty()
    }

    /// Nothing will change on its own until the user acts.
    pub fn is_idle(&self) -> bool {
        !self.is_listening() && !self.overlay_active() && !self.is_saving()
    }

    pub fn snapshot(&self) -> QuizEvent {
        self.machine.snapshot()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.machine.set_name(name);
    }

    pub fn start(&mut self) -> Option<QuizEvent> {
        self.machine.start()
    }

    /// Answer the current question.
    ///
    /// The third answer raises the result overlay and stores the guest
    /// locally where the variant asks for it. The remote write starts in
    /// the background; its outcome arrives through [`Self::next_event`].
    /// Storage failures are logged; the run still completes.
    ///
    /// # Errors
    /// Fails when no question is showing or the index is out of range.
    pub async fn answer(&mut self, index: usize) -> Result<Vec<QuizEvent>, ValidationError> {
        let event = self.machine.answer(index)?;
        let (draft, verdict) = match &event {
            QuizEvent::QuizSubmitted { draft, verdict, .. } => (draft.clone(), verdict.clone()),
            _ => return Ok(vec![event]),
        };

        self.overlay_until = Some(Instant::now() + self.result_display);
        self.verdict = Some(verdict);
        let mut events = vec![event];

        if let Some(guest) = self.book.append_local(draft.clone()).await {
            if !self.guests.iter().any(|g| g.id == guest.id) {
                self.guests.insert(0, guest.clone());
            }
            events.push(QuizEvent::GuestSaved {
                guest,
                remote: false,
                at: Utc::now(),
            });
            events.push(self.counts());
        }
        if let Some(write) = self.book.remote_append(draft) {
            self.saves.spawn(write);
        }
        Ok(events)
    }

    /// Wait for every remote write still in flight and report the ones
    /// that landed.
    pub async fn flush_saves(&mut self) -> Vec<QuizEvent> {
        let mut events = Vec::new();
        while let Some(done) = self.saves.join_next().await {
            if let Some(event) = Self::saved_event(done) {
                events.push(event);
            }
        }
        events
    }

    fn saved_event(done: Result<Option<Guest>, JoinError>) -> Option<QuizEvent> {
        match done {
            Ok(Some(guest)) => Some(QuizEvent::GuestSaved {
                guest,
                remote: true,
                at: Utc::now(),
            }),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "remote guest write did not finish");
                None
            }
        }
    }

    /// Wait for the next thing that changes the page on its own: a guest
    /// snapshot, a remote write landing, or the overlay clearing. `None`
    /// when none of these can happen.
    pub async fn next_event(&mut self) -> Option<QuizEvent> {
        loop {
            let deadline = self.overlay_until;
            let listening = self.subscription.is_active();
            let saving = !self.saves.is_empty();
            let subscription = &mut self.subscription;
            let saves = &mut self.saves;
            let wake = tokio::select! {
                snapshot = subscription.next(), if listening => Wake::Snapshot(snapshot),
                done = saves.join_next(), if saving => Wake::Saved(done),
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    Wake::OverlayExpired
                }
                else => Wake::Idle,
            };
            match wake {
                Wake::Snapshot(Some(guests)) => return Some(self.apply_snapshot(guests)),
                // Stream ended; keep waiting on the overlay if it is up.
                Wake::Snapshot(None) => continue,
                Wake::Saved(Some(done)) => match Self::saved_event(done) {
                    Some(event) => return Some(event),
                    None => continue,
                },
                Wake::Saved(None) => continue,
                Wake::OverlayExpired => {
                    self.overlay_until = None;
                    self.verdict = None;
                    return self.machine.finish();
                }
                Wake::Idle => return None,
            }
        }
    }

    /// Replace the visible list with a delivered snapshot.
    pub fn apply_snapshot(&mut self, guests: Vec<Guest>) -> QuizEvent {
        self.guests = guests;
        self.counts()
    }

    fn counts(&self) -> QuizEvent {
        let sus = self.guests.iter().filter(|g| g.is_sus()).count();
        QuizEvent::GuestsUpdated {
            total: self.guests.len(),
            sus,
            invited: self.guests.len() - sus,
            at: Utc::now(),
        }
    }

    /// Full list, newest first.
    pub fn guests(&self) -> &[Guest] {
        &self.guests
    }

    pub fn set_filter(&mut self, needle: impl Into<String>) {
        self.filter = needle.into();
    }

    /// Guests matching the name filter.
    pub fn filtered(&self) -> Vec<&Guest> {
        filter_by_name(&self.guests, &self.filter)
    }

    pub fn sus_list(&self) -> Vec<&Guest> {
        self.filtered().into_iter().filter(|g| g.is_sus()).collect()
    }

    pub fn pass_list(&self) -> Vec<&Guest> {
        self.filtered().into_iter().filter(|g| !g.is_sus()).collect()
    }

    /// Tear down explicitly. Dropping the page does the same.
    pub fn unmount(mut self) {
        self.subscription.unsubscribe();
        tracing::debug!(variant = %self.variant(), "quiz page unmounted");
    }
}

impl Drop for QuizPage {
    fn drop(&mut self) {
        self.saves.detach_all();
    }
}
