use clap::Subcommand;
use gishmas_core::{QuizEvent, QuizPage, QuizVariant};
use serde::Serialize;

use super::CliResult;

#[derive(Subcommand)]
pub enum QuizAction {
    /// Answer all three questions in one go and store the result
    Take {
        /// Guest name
        #[arg(long)]
        name: String,
        /// Three comma-separated answers, each 1-4 (e.g. "2,1,4")
        #[arg(long, value_delimiter = ',', num_args = 3)]
        answers: Vec<usize>,
        /// Quiz variant: v1 or v2 (default: from config)
        #[arg(long)]
        variant: Option<QuizVariant>,
        /// Print every event as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a variant's questions and answer options
    Questions {
        #[arg(long)]
        variant: Option<QuizVariant>,
    },
}

#[derive(Serialize)]
struct QuestionView {
    number: usize,
    prompt: &'static str,
    options: Vec<&'static str>,
}

pub async fn run(action: QuizAction) -> CliResult {
    match action {
        QuizAction::Take {
            name,
            answers,
            variant,
            json,
        } => {
            if answers.len() != 3 || answers.iter().any(|a| !(1..=4).contains(a)) {
                return Err("expected three answers between 1 and 4".into());
            }

            let ctx = super::context().await?;
            let variant = variant.unwrap_or(ctx.config().quiz.default_variant);
            let mut page = QuizPage::mount(&ctx, variant);

            page.set_name(name.as_str());
            let mut events = Vec::new();
            match page.start() {
                Some(event) => events.push(event),
                None => return Err("guest name must not be empty".into()),
            }
            for answer in answers {
                events.extend(page.answer(answer - 1).await?);
            }
            events.extend(page.flush_saves().await);
            page.unmount();

            if json {
                super::print_json(&events)?;
                return Ok(());
            }
            for event in &events {
                if let QuizEvent::QuizSubmitted { draft, verdict, .. } = event {
                    let label = if verdict.is_sus() { "SUS" } else { "INVITED" };
                    println!("{}: {label} (score {})", draft.name, verdict.total_score);
                    println!("{}", verdict.reason);
                }
            }
        }
        QuizAction::Questions { variant } => {
            let variant = variant.unwrap_or_default();
            let questions: Vec<QuestionView> = variant
                .questions()
                .iter()
                .enumerate()
                .map(|(i, q)| QuestionView {
                    number: i + 1,
                    prompt: q.prompt,
                    options: q.options.iter().map(|o| o.text).collect(),
                })
                .collect();
            super::print_json(&questions)?;
        }
    }
    Ok(())
}
