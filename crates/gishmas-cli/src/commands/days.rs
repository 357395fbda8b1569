use chrono::{Local, NaiveDate};
use clap::Args;
use gishmas_core::{Config, DayContent, DayGrid};
use serde::Serialize;

use super::CliResult;

#[derive(Args)]
pub struct DaysArgs {
    /// Evaluate the grid as of this date (YYYY-MM-DD, default: today)
    #[arg(long)]
    today: Option<NaiveDate>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct SlotView {
    day: u32,
    unlocked: bool,
    label: &'static str,
    opens: Option<String>,
}

pub fn run(args: DaysArgs) -> CliResult {
    let config = Config::load()?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let grid = DayGrid::new(config.unlock_policy());

    let slots: Vec<SlotView> = grid
        .slots(today)
        .into_iter()
        .map(|slot| SlotView {
            day: slot.day,
            unlocked: slot.unlocked,
            label: slot.label(),
            opens: match (slot.unlocked, slot.content) {
                (true, DayContent::DailySpin) => Some("daily spin".to_string()),
                (true, DayContent::Page(page)) => Some(page.to_string()),
                _ => None,
            },
        })
        .collect();

    if args.json {
        return super::print_json(&slots);
    }
    for slot in &slots {
        let icon = if slot.unlocked { "open" } else { "lock" };
        println!("DAY {:>2}  [{icon}]  {}", slot.day, slot.label);
    }
    Ok(())
}
