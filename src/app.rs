use iced::Task;

use crate::api::ApiConfig;
use crate::application::{DownloadOrchestrator, LocalSaver, SettledAttempt};
use crate::ui::{self, FormMessage, RouteScope};

pub struct RouteApp {
    orchestrator: DownloadOrchestrator<LocalSaver>,
}

impl Default for RouteApp {
    fn default() -> Self {
        Self::new(ApiConfig::from_env(), LocalSaver::from_env())
    }
}

impl RouteApp {
    pub fn new(config: ApiConfig, saver: LocalSaver) -> Self {
        tracing::info!(base = %config.base_url, timeout_secs = config.timeout.as_secs(), "route service configured");
        Self {
            orchestrator: DownloadOrchestrator::new(&config, saver),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Form(FormMessage),
    /// Outcome of the background fetch-and-save
    DownloadSettled(SettledAttempt),
}

pub fn update(app: &mut RouteApp, message: Message) -> Task<Message> {
    let orchestrator = &mut app.orchestrator;
    match message {
        Message::Form(FormMessage::CategorySelected(category)) => {
            orchestrator.set_category(category);
        }
        Message::Form(FormMessage::RouteNumberChanged(value)) => {
            orchestrator.set_route_number(value);
        }
        Message::Form(FormMessage::ScopeSelected(scope)) => {
            orchestrator.set_segment_enabled(scope == RouteScope::SingleSegment);
        }
        Message::Form(FormMessage::SegmentNumberChanged(value)) => {
            orchestrator.set_segment_number(value);
        }
        Message::Form(FormMessage::DownloadPressed) => {
            // iced Task::perform runs in the background tokio executor
            if let Some(pending) = orchestrator.begin_attempt() {
                tracing::debug!(
                    request = %pending.request(),
                    url = %pending.url(),
                    filename = pending.filename(),
                    "dispatching route download"
                );
                return Task::perform(pending.run(), Message::DownloadSettled);
            }
        }
        Message::Form(FormMessage::ResetPressed) => {
            orchestrator.reset();
        }
        Message::DownloadSettled(settled) => {
            orchestrator.settle(settled);
        }
    }
    Task::none()
}

pub fn view(app: &RouteApp) -> iced::Element<'_, Message> {
    ui::view(&app.orchestrator).map(Message::Form)
}
