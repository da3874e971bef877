use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration as StdDuration;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use lessondeck::client::{ClientState, HttpLessonApi, LessonForm, RunError, Step, run_session};
use lessondeck::models::{DEFAULT_TEMPLATE, Duration};

#[derive(Debug, Clone, Parser)]
#[command(name = "lessondeck-client", about = "Generate a lesson deck through a lessondeck server")]
struct Cli {
    /// Lesson topic
    #[arg(long)]
    topic: String,

    /// Target audience, e.g. "5th Grade"
    #[arg(long, default_value = "")]
    grade: String,

    /// short, medium, long or a minute count
    #[arg(long, default_value = "medium")]
    duration: Duration,

    /// Template file on the server
    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    template: String,

    /// Generate outline and content in one request
    #[arg(long)]
    one_shot: bool,

    /// Server base URL
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Where to store the deck. Defaults to the server's file name
    #[arg(long)]
    output: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "180")]
    timeout: u64,
}

fn report(state: &ClientState) {
    match (state.step, state.progress_percent()) {
        (Step::Generation, Some(pct)) => log::info!(
            "Generating slides: {}/{} ({pct}%)",
            state.progress.completed,
            state.progress.total.unwrap_or_default()
        ),
        (Step::Generation, None) => log::info!("Planning lesson \"{}\"", state.form.topic),
        _ => {}
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let api = match HttpLessonApi::new(&cli.server, StdDuration::from_secs(cli.timeout)) {
        Ok(api) => api,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let token = CancellationToken::new();
    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling session");
            ctrl_c.cancel();
        }
    });

    let form = LessonForm {
        topic: cli.topic,
        grade: cli.grade,
        duration: cli.duration,
        template_filename: cli.template,
        one_shot: cli.one_shot,
    };

    let state = match run_session(&api, form, &token, report).await {
        Ok(state) => state,
        Err(RunError::Cancelled) => return ExitCode::from(130),
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    for note in &state.skipped {
        log::warn!("Skipped {note}");
    }

    let Some(url) = state.download_url else {
        return ExitCode::FAILURE;
    };
    let dest = cli.output.unwrap_or_else(|| {
        PathBuf::from(url.rsplit('/').next().filter(|n| !n.is_empty()).unwrap_or("lesson.pptx"))
    });

    match api.download(&url, &dest).await {
        Ok(bytes) => {
            log::info!("Saved {} ({bytes} bytes)", dest.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Download of {url} failed: {e}");
            ExitCode::FAILURE
        }
    }
}
