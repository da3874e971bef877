use std::collections::VecDeque;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::api::LessonApi;
use super::state::{ClientState, Command, Event, LessonForm, Step, transition};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("session cancelled")]
    Cancelled,

    #[error("{0}")]
    Alert(String),

    #[error("session ended before the presentation was built")]
    Incomplete,
}

struct Session<'a, F> {
    state: ClientState,
    pending: VecDeque<Command>,
    observer: &'a mut F,
}

impl<F: FnMut(&ClientState)> Session<'_, F> {
    fn apply(&mut self, event: Event) {
        let (state, commands) = transition(std::mem::take(&mut self.state), event);
        self.state = state;
        self.pending.extend(commands);
        (self.observer)(&self.state);
    }
}

/// Drives one lesson from template loading to a built deck.
///
/// Commands run strictly one at a time. The token is checked before every
/// request; a request already in flight runs to completion.
pub async fn run_session<A, F>(
    api: &A,
    form: LessonForm,
    token: &CancellationToken,
    mut observer: F,
) -> Result<ClientState, RunError>
where
    A: LessonApi + ?Sized,
    F: FnMut(&ClientState),
{
    let mut session = Session { state: ClientState::default(), pending: VecDeque::new(), observer: &mut observer };
    let mut submitted = false;
    session.apply(Event::Start);

    loop {
        if token.is_cancelled() {
            return Err(RunError::Cancelled);
        }

        let Some(command) = session.pending.pop_front() else {
            if session.state.step == Step::Config && !submitted {
                submitted = true;
                session.apply(Event::Submit(form.clone()));
                continue;
            }
            break;
        };

        match execute(api, command).await {
            Ok(event) => session.apply(event),
            Err(message) => {
                log::warn!("{message}");
                return Err(RunError::Alert(message));
            }
        }
    }

    match session.state.step {
        Step::Done => Ok(session.state),
        _ => Err(RunError::Incomplete),
    }
}

/// Runs a command. `Err` carries the text of an alert.
async fn execute<A: LessonApi + ?Sized>(api: &A, command: Command) -> Result<Event, String> {
    let event = match command {
        Command::LoadTemplates => match api.list_templates().await {
            Ok(templates) => Event::TemplatesLoaded(templates),
            Err(e) => Event::TemplatesFailed(e.to_string()),
        },
        Command::GenerateOutline(req) => match api.generate_outline(&req).await {
            Ok(plans) => Event::OutlineReady(plans),
            Err(e) => Event::OutlineFailed(e.to_string()),
        },
        Command::GenerateSlide { index, request } => match api.generate_slide(&request).await {
            Ok(content) => Event::SlideReady { index, content },
            Err(e) => {
                log::warn!("Slide {} skipped: {e}", index + 1);
                Event::SlideFailed { index, error: e.to_string() }
            }
        },
        Command::GenerateOneShot(req) => match api.generate_one_shot(&req).await {
            Ok(slides) => Event::OneShotReady(slides),
            Err(e) => Event::OneShotFailed(e.to_string()),
        },
        Command::Build(req) => match api.build(&req).await {
            Ok(result) => Event::BuildReady(result.download_url),
            Err(e) => Event::BuildFailed(e.to_string()),
        },
        Command::Alert(message) => return Err(message),
    };
    Ok(event)
}
