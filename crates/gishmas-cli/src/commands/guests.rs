use std::time::Duration;

use clap::Subcommand;
use gishmas_core::guest::filter_by_name;
use gishmas_core::{Guest, QuizVariant};

use super::CliResult;

#[derive(Subcommand)]
pub enum GuestsAction {
    /// Print the current guest list, newest first
    List {
        #[arg(long)]
        variant: Option<QuizVariant>,
        /// Only names containing this text (case-insensitive)
        #[arg(long)]
        filter: Option<String>,
        /// Only sus guests
        #[arg(long, conflicts_with = "invited")]
        sus: bool,
        /// Only invited guests
        #[arg(long)]
        invited: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Follow the remote guest list and print every snapshot as JSON
    Watch {
        #[arg(long)]
        variant: Option<QuizVariant>,
        /// Stop after this many snapshots
        #[arg(long)]
        limit: Option<usize>,
        /// Stop after this many seconds without a snapshot
        #[arg(long)]
        idle_secs: Option<u64>,
    },
}

fn print_table(guests: &[&Guest]) {
    if guests.is_empty() {
        println!("(no guests)");
        return;
    }
    for g in guests {
        let status = if g.is_sus() { "SUS" } else { "INVITED" };
        println!("{:<8} {:<24} {}", status, g.name, g.reason);
    }
}

pub async fn run(action: GuestsAction) -> CliResult {
    let ctx = super::context().await?;

    match action {
        GuestsAction::List {
            variant,
            filter,
            sus,
            invited,
            json,
        } => {
            let variant = variant.unwrap_or(ctx.config().quiz.default_variant);
            let guests = ctx.fetch_guests(variant).await;
            let shown: Vec<&Guest> = filter_by_name(&guests, filter.as_deref().unwrap_or(""))
                .into_iter()
                .filter(|g| (!sus || g.is_sus()) && (!invited || !g.is_sus()))
                .collect();
            if json {
                super::print_json(&shown)?;
            } else {
                print_table(&shown);
            }
        }
        GuestsAction::Watch {
            variant,
            limit,
            idle_secs,
        } => {
            let variant = variant.unwrap_or(ctx.config().quiz.default_variant);
            let book = ctx.guest_book(variant);
            if !book.is_remote() {
                return Err("no signed-in user or remote store; nothing to watch".into());
            }
            let mut subscription = book.live_subscription();
            let mut seen = 0usize;
            loop {
                let next = match idle_secs {
                    Some(secs) => {
                        match tokio::time::timeout(Duration::from_secs(secs), subscription.next()).await {
                            Ok(next) => next,
                            Err(_) => break,
                        }
                    }
                    None => subscription.next().await,
                };
                let Some(guests) = next else { break };
                println!("{}", serde_json::to_string(&guests)?);
                seen += 1;
                if limit.is_some_and(|limit| seen >= limit) {
                    break;
                }
            }
            subscription.unsubscribe();
        }
    }
    Ok(())
}
