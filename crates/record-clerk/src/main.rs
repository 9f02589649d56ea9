//! An interactive music store clerk in the terminal.

#[macro_use]
extern crate tracing;

use std::io::Write as _;
use std::pin::pin;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use record_clerk::{Catalog, Config, SessionBuilder};
use record_clerk_openai_model::OpenAIProvider;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::time::sleep;

const BAR_CHAR: &str = "▎";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };
    debug!("loaded config: {config:?}");

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    let catalog = match with_spinner(
        &progress_style,
        "📀 Loading the catalog...",
        Catalog::load(&config.catalog),
    )
    .await
    {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("{} {err}", "Failed to load the catalog:".bright_red());
            return;
        }
    };

    let model_provider = OpenAIProvider::new(config.openai_config());
    let mut session_builder =
        SessionBuilder::with_model_provider(model_provider)
            .with_catalog(catalog);
    if let Some(timeout) = config.model_timeout {
        session_builder = session_builder.with_model_timeout(Some(timeout));
    }
    if let Some(timeout) = config.tool_timeout {
        session_builder = session_builder.with_tool_timeout(Some(timeout));
    }
    if let Some(max_turns) = config.max_turns {
        session_builder = session_builder.with_max_turns(max_turns);
    }
    let mut session = session_builder.build();

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line().await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = with_spinner(
            &progress_style,
            "🤔 Thinking...",
            session.send_message(line),
        )
        .await;
        match reply {
            Ok(answer) => {
                let bar = BAR_CHAR.bright_cyan();
                println!("{bar}🤖 {}", answer.bright_white());
            }
            Err(err) => {
                let bar = BAR_CHAR.bright_red();
                println!("{bar}⚠️  {}", err.bright_red());
            }
        }
        println!();
    }
}

/// Shows a spinner until `fut` completes.
async fn with_spinner<F: Future>(
    style: &ProgressStyle,
    message: &'static str,
    fut: F,
) -> F::Output {
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(style.clone());
    progress_bar.set_message(message);

    let mut fut = pin!(fut);
    let output = loop {
        progress_bar.inc(1);
        select! {
            output = &mut fut => break output,
            _ = sleep(Duration::from_millis(100)) => {}
        }
    };

    // Finish the progress bar before printing anything else.
    progress_bar.finish_and_clear();
    output
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
