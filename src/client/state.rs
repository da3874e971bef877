//! Client workflow as a pure state machine.
//!
//! `transition` never performs I/O. It returns the commands the caller must
//! run; their outcomes come back as events.

use serde::{Deserialize, Serialize};

use crate::models::api::{OneShotRequest, OutlineRequest, SlideRequest};
use crate::models::{
    BuildRequest, ContentMap, DEFAULT_TEMPLATE, Duration, GeneratedSlide, SlideContent, SlidePlan, TemplatePlan,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Config,
    Generation,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonForm {
    pub topic: String,
    pub grade: String,
    pub duration: Duration,
    pub template_filename: String,
    pub one_shot: bool,
}

impl Default for LessonForm {
    fn default() -> Self {
        Self {
            topic: String::new(),
            grade: String::new(),
            duration: Duration::default(),
            template_filename: DEFAULT_TEMPLATE.to_string(),
            one_shot: false,
        }
    }
}

/// `total == None` means the slide count is not known yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClientState {
    pub step: Step,
    pub form: LessonForm,
    pub templates: Vec<TemplatePlan>,
    pub outline: Vec<SlidePlan>,
    pub contents: Vec<Option<ContentMap>>,
    pub progress: Progress,
    pub download_url: Option<String>,
    pub error: Option<String>,
    pub skipped: Vec<String>,
}

impl ClientState {
    pub fn progress_percent(&self) -> Option<u8> {
        let total = self.progress.total?;
        if total == 0 {
            return Some(100);
        }
        Some((self.progress.completed.min(total) * 100 / total) as u8)
    }

    fn awaiting_plan(&self) -> bool {
        self.step == Step::Generation && self.progress.total.is_none() && self.error.is_none()
    }

    fn build_request(&self) -> BuildRequest {
        BuildRequest {
            template_filename: self.form.template_filename.clone(),
            slides: self
                .outline
                .iter()
                .zip(&self.contents)
                .map(|(plan, content)| SlideContent {
                    layout_id: plan.layout_id,
                    content: content.clone().unwrap_or_default(),
                })
                .collect(),
        }
    }

    fn slide_request(&self, index: usize) -> Option<SlideRequest> {
        self.outline.get(index).map(|plan| SlideRequest {
            title: plan.title.clone(),
            purpose: plan.purpose.clone(),
            grade: self.form.grade.clone(),
            layout_id: plan.layout_id,
            template_filename: self.form.template_filename.clone(),
        })
    }

    /// Command after slide `completed - 1` finished.
    fn next_slide_or_build(&self) -> Command {
        match self.slide_request(self.progress.completed) {
            Some(request) => Command::GenerateSlide { index: self.progress.completed, request },
            None => Command::Build(self.build_request()),
        }
    }

    fn fail(mut self, message: String) -> (Self, Vec<Command>) {
        self.error = Some(message.clone());
        (self, vec![Command::Alert(message)])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Start,
    TemplatesLoaded(Vec<TemplatePlan>),
    TemplatesFailed(String),
    Submit(LessonForm),
    OutlineReady(Vec<SlidePlan>),
    OutlineFailed(String),
    SlideReady { index: usize, content: ContentMap },
    SlideFailed { index: usize, error: String },
    OneShotReady(Vec<GeneratedSlide>),
    OneShotFailed(String),
    BuildReady(String),
    BuildFailed(String),
    Restart,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadTemplates,
    GenerateOutline(OutlineRequest),
    GenerateSlide { index: usize, request: SlideRequest },
    GenerateOneShot(OneShotRequest),
    Build(BuildRequest),
    /// Blocking message for the user.
    Alert(String),
}

pub fn transition(state: ClientState, event: Event) -> (ClientState, Vec<Command>) {
    let mut state = state;
    match (state.step, event) {
        (_, Event::Restart) => (ClientState::default(), vec![Command::LoadTemplates]),

        (Step::Config, Event::Start) => (state, vec![Command::LoadTemplates]),

        (Step::Config, Event::TemplatesLoaded(templates)) => {
            state.templates = templates;
            state.error = None;
            (state, vec![])
        }
        (Step::Config, Event::TemplatesFailed(e)) => state.fail(format!("Could not load templates: {e}")),

        (Step::Config, Event::Submit(mut form)) => {
            form.topic = form.topic.trim().to_string();
            if form.topic.is_empty() {
                return (state, vec![Command::Alert("Please enter a lesson topic".to_string())]);
            }
            if form.template_filename.trim().is_empty() {
                form.template_filename = DEFAULT_TEMPLATE.to_string();
            }

            state.step = Step::Generation;
            state.outline.clear();
            state.contents.clear();
            state.skipped.clear();
            state.progress = Progress::default();
            state.download_url = None;
            state.error = None;

            let command = if form.one_shot {
                Command::GenerateOneShot(OneShotRequest {
                    topic: form.topic.clone(),
                    grade: form.grade.clone(),
                    duration: form.duration,
                    template_filename: form.template_filename.clone(),
                })
            } else {
                Command::GenerateOutline(OutlineRequest {
                    topic: form.topic.clone(),
                    grade: form.grade.clone(),
                    duration: form.duration,
                    template_filename: form.template_filename.clone(),
                })
            };
            state.form = form;
            (state, vec![command])
        }

        (Step::Generation, Event::OutlineReady(plans)) if state.awaiting_plan() && !state.form.one_shot => {
            state.progress = Progress { completed: 0, total: Some(plans.len()) };
            state.contents = vec![None; plans.len()];
            state.outline = plans;
            let command = state.next_slide_or_build();
            (state, vec![command])
        }
        (Step::Generation, Event::OutlineFailed(e)) if state.awaiting_plan() => {
            state.fail(format!("Outline generation failed: {e}"))
        }

        (Step::Generation, Event::SlideReady { index, content }) if is_current_slide(&state, index) => {
            state.contents[index] = Some(content);
            state.progress.completed += 1;
            let command = state.next_slide_or_build();
            (state, vec![command])
        }
        (Step::Generation, Event::SlideFailed { index, error }) if is_current_slide(&state, index) => {
            let title = state.outline[index].title.clone();
            state.skipped.push(format!("Slide {} ({title}): {error}", index + 1));
            state.progress.completed += 1;
            let command = state.next_slide_or_build();
            (state, vec![command])
        }

        (Step::Generation, Event::OneShotReady(slides)) if state.awaiting_plan() && state.form.one_shot => {
            state.outline = crate::services::slide_content::outline_of(&slides);
            state.contents = slides.into_iter().map(|s| Some(s.content)).collect();
            state.progress = Progress { completed: state.outline.len(), total: Some(state.outline.len()) };
            let command = Command::Build(state.build_request());
            (state, vec![command])
        }
        (Step::Generation, Event::OneShotFailed(e)) if state.awaiting_plan() => {
            state.fail(format!("Presentation generation failed: {e}"))
        }

        (Step::Generation, Event::BuildReady(url)) if is_building(&state) => {
            state.step = Step::Done;
            state.download_url = Some(url);
            (state, vec![])
        }
        (Step::Generation, Event::BuildFailed(e)) if is_building(&state) => {
            state.fail(format!("Building the presentation failed: {e}"))
        }

        (step, event) => {
            log::debug!("Ignoring {event:?} in step {step:?}");
            (state, vec![])
        }
    }
}

fn is_current_slide(state: &ClientState, index: usize) -> bool {
    state.error.is_none()
        && matches!(state.progress.total, Some(total) if index == state.progress.completed && index < total)
}

fn is_building(state: &ClientState) -> bool {
    state.error.is_none() && matches!(state.progress.total, Some(total) if state.progress.completed >= total)
}
