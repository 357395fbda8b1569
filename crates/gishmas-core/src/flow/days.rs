//! Home-page day grid and the day 1 daily spin.

use chrono::{NaiveDate, Utc};
use rand::Rng;

use super::Page;
use crate::events::QuizEvent;

/// Number of day slots on the home grid.
pub const DAY_COUNT: u32 = 12;

const SPIN_DAY: u32 = 1;
pub(super) const GAME_DAY: u32 = 3;

/// At least six full turns before the wheel stops.
const SPIN_BASE_DEG: u32 = 2160;
const SPIN_PRIZE: &str = "ONE (1) LUMP OF COAL";

/// How many days are unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockPolicy {
    Fixed { unlocked_day: u32 },
    /// One more day per elapsed calendar day since `start_date`.
    Calendar { start_date: NaiveDate },
}

impl UnlockPolicy {
    /// Highest unlocked day. Never below 1.
    pub fn unlocked_day(&self, today: NaiveDate) -> u32 {
        match *self {
            UnlockPolicy::Fixed { unlocked_day } => unlocked_day.max(1),
            UnlockPolicy::Calendar { start_date } => {
                let elapsed = (today - start_date).num_days();
                u32::try_from(elapsed.saturating_add(1)).unwrap_or(0).max(1)
            }
        }
    }
}

/// What an unlocked day opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayContent {
    DailySpin,
    Page(Page),
    Teaser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySlot {
    pub day: u32,
    pub unlocked: bool,
    pub content: DayContent,
}

impl DaySlot {
    /// Short label shown on the grid.
    pub fn label(&self) -> &'static str {
        if !self.unlocked {
            return "LOCKED";
        }
        match self.content {
            DayContent::DailySpin => "DAILY SPIN",
            DayContent::Page(Page::Game) => "GTA 6",
            DayContent::Page(_) | DayContent::Teaser => "???",
        }
    }
}

/// Twelve day slots under one unlock policy.
#[derive(Debug, Clone, Copy)]
pub struct DayGrid {
    policy: UnlockPolicy,
}

impl DayGrid {
    pub fn new(policy: UnlockPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> UnlockPolicy {
        self.policy
    }

    /// Slot for `day`, or `None` outside `1..=DAY_COUNT`.
    pub fn slot(&self, day: u32, today: NaiveDate) -> Option<DaySlot> {
        if !(1..=DAY_COUNT).contains(&day) {
            return None;
        }
        let content = match day {
            SPIN_DAY => DayContent::DailySpin,
            GAME_DAY => DayContent::Page(Page::Game),
            _ => DayContent::Teaser,
        };
        Some(DaySlot {
            day,
            unlocked: day <= self.policy.unlocked_day(today),
            content,
        })
    }

    pub fn slots(&self, today: NaiveDate) -> Vec<DaySlot> {
        (1..=DAY_COUNT)
            .filter_map(|day| self.slot(day, today))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinResult {
    pub rotation_deg: u32,
    pub prize: &'static str,
}

/// The day 1 wheel. One spin per session.
#[derive(Debug, Default)]
pub struct DailySpin {
    result: Option<SpinResult>,
}

impl DailySpin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_spun(&self) -> bool {
        self.result.is_some()
    }

    pub fn result(&self) -> Option<&SpinResult> {
        self.result.as_ref()
    }

    /// Spin the wheel. `None` if it already spun this session.
    pub fn spin<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<QuizEvent> {
        if self.result.is_some() {
            return None;
        }
        let result = SpinResult {
            rotation_deg: SPIN_BASE_DEG + rng.gen_range(0..360),
            prize: SPIN_PRIZE,
        };
        tracing::info!(rotation = result.rotation_deg, "daily spin");
        let event = QuizEvent::SpinLanded {
            rotation_deg: result.rotation_deg,
            prize: result.prize.to_string(),
            at: Utc::now(),
        };
        self.result = Some(result);
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn calendar_unlocks_one_day_per_day() {
        let policy = UnlockPolicy::Calendar {
            start_date: date(2025, 12, 18),
        };
        assert_eq!(policy.unlocked_day(date(2025, 12, 1)), 1);
        assert_eq!(policy.unlocked_day(date(2025, 12, 18)), 1);
        assert_eq!(policy.unlocked_day(date(2025, 12, 19)), 2);
        assert_eq!(policy.unlocked_day(date(2025, 12, 29)), 12);
    }

    #[test]
    fn fixed_policy_floors_at_one() {
        assert_eq!(UnlockPolicy::Fixed { unlocked_day: 0 }.unlocked_day(date(2030, 1, 1)), 1);
        assert_eq!(UnlockPolicy::Fixed { unlocked_day: 5 }.unlocked_day(date(2030, 1, 1)), 5);
    }

    #[test]
    fn grid_marks_locked_days() {
        let grid = DayGrid::new(UnlockPolicy::Fixed { unlocked_day: 3 });
        let slots = grid.slots(date(2025, 12, 18));
        assert_eq!(slots.len(), 12);
        assert!(slots[..3].iter().all(|s| s.unlocked));
        assert!(slots[3..].iter().all(|s| !s.unlocked));
        assert_eq!(slots[0].content, DayContent::DailySpin);
        assert_eq!(slots[2].content, DayContent::Page(Page::Game));
        assert_eq!(slots[2].label(), "GTA 6");
        assert_eq!(slots[1].label(), "???");
        assert_eq!(slots[5].label(), "LOCKED");
        assert!(grid.slot(0, date(2025, 12, 18)).is_none());
        assert!(grid.slot(13, date(2025, 12, 18)).is_none());
    }

    #[test]
    fn spin_only_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut spin = DailySpin::new();
        assert!(spin.spin(&mut rng).is_some());
        let first = spin.result().unwrap().clone();
        assert!((2160..2520).contains(&first.rotation_deg));
        assert!(spin.spin(&mut rng).is_none());
        assert_eq!(spin.result(), Some(&first));
    }
}
