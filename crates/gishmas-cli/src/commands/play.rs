//! Interactive page flow.
//!
//! Reads one command per line from stdin and prints every resulting event
//! as a JSON line on stdout. Guest snapshots and the result overlay timer
//! are printed as they happen, between commands.

use std::io::BufRead;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use clap::Args;
use gishmas_core::{App, NavAction, QuizEvent, QuizVariant};
use tokio::sync::mpsc;

use super::CliResult;

const WAIT_LIMIT: Duration = Duration::from_secs(10);

const HELP: &str = "\
navigation: enter | back | quiz [v1|v2] | game | day <n> | frame <message>
quiz page:  name <text> | start | answer <1-4> | wait | list | filter <text> | state
other:      help | quit";

#[derive(Args)]
pub struct PlayArgs {
    /// Evaluate day unlocks as of this date (YYYY-MM-DD, default: today)
    #[arg(long)]
    today: Option<NaiveDate>,
}

enum Input {
    Line(Option<String>),
    Event(Option<QuizEvent>),
}

enum Flow {
    Continue,
    Quit,
}

fn emit(event: &QuizEvent) -> CliResult {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn next_page_event(app: &mut App<'_>) -> Option<QuizEvent> {
    match app.quiz_mut() {
        Some(page) => page.next_event().await,
        None => None,
    }
}

async fn handle(app: &mut App<'_>, line: &str) -> Result<Flow, Box<dyn std::error::Error>> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let nav = match command {
        "" => return Ok(Flow::Continue),
        "quit" | "exit" => return Ok(Flow::Quit),
        "help" => {
            eprintln!("{HELP}");
            return Ok(Flow::Continue);
        }
        "enter" => Some(NavAction::Enter),
        "back" => Some(NavAction::Back),
        "game" => Some(NavAction::OpenGame),
        "quiz" => {
            let variant = if rest.is_empty() {
                QuizVariant::default()
            } else {
                rest.parse()?
            };
            Some(NavAction::OpenQuiz(variant))
        }
        "day" => Some(NavAction::OpenDay(rest.parse()?)),
        "frame" => Some(NavAction::FrameMessage(rest.to_string())),
        _ => None,
    };
    if let Some(action) = nav {
        let events = app.dispatch(action);
        if events.is_empty() {
            eprintln!("nothing happens on {}", app.page());
        }
        for event in &events {
            emit(event)?;
        }
        return Ok(Flow::Continue);
    }

    let Some(page) = app.quiz_mut() else {
        return Err(format!("'{command}' needs the quiz page; try 'quiz'").into());
    };
    match command {
        "name" => {
            page.set_name(rest);
            emit(&page.snapshot())?;
        }
        "start" => match page.start() {
            Some(event) => emit(&event)?,
            None => eprintln!("enter a name first"),
        },
        "answer" => {
            let choice: usize = rest.parse()?;
            if choice == 0 {
                return Err("answers are numbered from 1".into());
            }
            for event in page.answer(choice - 1).await? {
                emit(&event)?;
            }
        }
        "wait" => match tokio::time::timeout(WAIT_LIMIT, page.next_event()).await {
            Ok(Some(event)) => emit(&event)?,
            Ok(None) | Err(_) => eprintln!("nothing pending"),
        },
        "filter" => {
            page.set_filter(rest);
            println!("{}", serde_json::to_string(&page.filtered())?);
        }
        "list" => {
            println!(
                "{}",
                serde_json::json!({ "sus": page.sus_list(), "invited": page.pass_list() })
            );
        }
        "state" => emit(&page.snapshot())?,
        other => return Err(format!("unknown command '{other}'; try 'help'").into()),
    }
    Ok(Flow::Continue)
}

pub async fn run(args: PlayArgs) -> CliResult {
    let ctx = super::context().await?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let mut app = App::new(&ctx, today);
    let mut lines = stdin_lines();
    eprintln!("on {}; type 'help' for commands", app.page());

    loop {
        let pending = app.quiz().is_some_and(|page| !page.is_idle());
        let input = tokio::select! {
            line = lines.recv() => Input::Line(line),
            event = next_page_event(&mut app), if pending => Input::Event(event),
        };
        match input {
            Input::Line(None) => break,
            Input::Line(Some(line)) => match handle(&mut app, line.trim()).await {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => eprintln!("error: {e}"),
            },
            Input::Event(Some(event)) => emit(&event)?,
            Input::Event(None) => {}
        }
    }
    if let Some(page) = app.quiz_mut() {
        for event in page.flush_saves().await {
            emit(&event)?;
        }
    }
    Ok(())
}
