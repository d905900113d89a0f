use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, info, warn};
use url::Url;

use super::save::RouteSaver;
use crate::{
    api::{filename_for, ApiClient, ApiConfig, RouteLocator},
    domain::{
        validate_form, DownloadError, DownloadPhase, RouteCategory, RouteForm, RouteRequest,
        TerminalState,
    },
};

/// A route export that was written to local storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedRoute {
    pub filename: String,
    pub path: PathBuf,
}

/// Result of one [`PendingDownload`], tagged with the attempt it belongs to.
/// `outcome` is `None` when the attempt was abandoned before anything was saved.
#[derive(Debug, Clone)]
pub struct SettledAttempt {
    generation: u64,
    outcome: Option<Result<SavedRoute, DownloadError>>,
}

impl SettledAttempt {
    pub fn outcome(&self) -> Option<&Result<SavedRoute, DownloadError>> {
        self.outcome.as_ref()
    }
}

/// Owns the form fields and the download state machine.
///
/// An attempt is split in three so the network part can run on an executor
/// without borrowing the orchestrator: [`begin_attempt`](Self::begin_attempt)
/// validates and marks the attempt in flight, [`PendingDownload::run`] fetches
/// and saves, and [`settle`](Self::settle) records the outcome and clears the
/// in-flight flag.
pub struct DownloadOrchestrator<S> {
    form: RouteForm,
    in_flight: bool,
    terminal: Option<TerminalState>,
    generation: Arc<AtomicU64>,
    locator: RouteLocator,
    client: ApiClient,
    saver: S,
}

impl<S: RouteSaver> DownloadOrchestrator<S> {
    pub fn new(config: &ApiConfig, saver: S) -> Self {
        Self {
            form: RouteForm::default(),
            in_flight: false,
            terminal: None,
            generation: Arc::new(AtomicU64::new(0)),
            locator: RouteLocator::new(config.base_url.clone()),
            client: ApiClient::new(config),
            saver,
        }
    }

    pub fn form(&self) -> &RouteForm {
        &self.form
    }

    pub fn category(&self) -> RouteCategory {
        self.form.category
    }

    pub fn route_number(&self) -> &str {
        &self.form.route_number
    }

    pub fn segment_enabled(&self) -> bool {
        self.form.segment_enabled
    }

    pub fn segment_number(&self) -> &str {
        &self.form.segment_number
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn terminal_state(&self) -> Option<&TerminalState> {
        self.terminal.as_ref()
    }

    pub fn phase(&self) -> DownloadPhase {
        if self.in_flight {
            return DownloadPhase::InFlight;
        }
        self.terminal
            .clone()
            .map(DownloadPhase::from)
            .unwrap_or(DownloadPhase::Idle)
    }

    pub fn set_category(&mut self, category: RouteCategory) {
        self.form.category = category;
    }

    pub fn set_route_number(&mut self, value: String) {
        self.form.route_number = value;
    }

    pub fn set_segment_enabled(&mut self, enabled: bool) {
        self.form.segment_enabled = enabled;
    }

    pub fn set_segment_number(&mut self, value: String) {
        self.form.segment_number = value;
    }

    /// Start an attempt from the current form.
    ///
    /// Returns `None` when the attempt ended synchronously (invalid input or
    /// an unusable service address, both recorded as `Failed`) or when
    /// another attempt is still in flight, which leaves all state untouched.
    pub fn begin_attempt(&mut self) -> Option<PendingDownload<S>> {
        if self.in_flight {
            debug!("download already in flight, ignoring attempt");
            return None;
        }

        self.terminal = None;

        let request = match validate_form(&self.form) {
            Ok(request) => request,
            Err(reason) => {
                debug!(%reason, "route input rejected");
                self.record_failure(&DownloadError::Input(reason));
                return None;
            }
        };

        let url = match self.locator.locate(&request) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, base = self.locator.base(), "cannot build route export address");
                self.record_failure(&DownloadError::Configuration(e.to_string()));
                return None;
            }
        };

        let filename = filename_for(&request);
        let generation = self.next_generation();
        self.in_flight = true;
        info!(%request, %url, %filename, "starting route download");

        Some(PendingDownload {
            generation,
            current_generation: Arc::clone(&self.generation),
            request,
            url,
            filename,
            client: self.client.clone(),
            saver: self.saver.clone(),
        })
    }

    /// Record the outcome of a [`PendingDownload`] and clear the in-flight
    /// flag. Results of attempts abandoned by [`reset`](Self::reset) are dropped.
    pub fn settle(&mut self, settled: SettledAttempt) {
        if !self.in_flight || settled.generation != self.generation.load(Ordering::SeqCst) {
            debug!(generation = settled.generation, "dropping result of an abandoned attempt");
            return;
        }

        self.in_flight = false;
        match settled.outcome {
            None => debug!(generation = settled.generation, "attempt ended without a result"),
            Some(Ok(saved)) => {
                info!(filename = %saved.filename, path = %saved.path.display(), "route download succeeded");
                self.terminal = Some(TerminalState::Succeeded {
                    message: format!(
                        "Downloaded {} to {}",
                        saved.filename,
                        saved.path.display()
                    ),
                });
            }
            Some(Err(e)) => {
                warn!(kind = e.title(), error = %e, "route download failed");
                self.record_failure(&e);
            }
        }
    }

    /// Run a whole attempt: begin, fetch and save, settle. The GUI drives the
    /// three steps itself so the fetch runs on the iced executor.
    #[allow(dead_code)]
    pub async fn attempt(&mut self) {
        if let Some(pending) = self.begin_attempt() {
            let outcome = pending.run().await;
            self.settle(outcome);
        }
    }

    /// Back to an empty Hiking form with no terminal state.
    pub fn reset(&mut self) {
        debug!("resetting route form");
        self.form = RouteForm::default();
        self.terminal = None;
        self.in_flight = false;
        self.next_generation();
    }

    /// Invalidates every pending download and returns the new generation.
    fn next_generation(&self) -> u64 {
        self.generation
            .fetch_add(1, Ordering::SeqCst)
            .wrapping_add(1)
    }

    fn record_failure(&mut self, error: &DownloadError) {
        self.terminal = Some(TerminalState::Failed {
            title: error.title().to_string(),
            message: error.message(),
        });
    }
}

/// Everything needed to finish an attempt away from the orchestrator.
pub struct PendingDownload<S> {
    generation: u64,
    current_generation: Arc<AtomicU64>,
    request: RouteRequest,
    url: Url,
    filename: String,
    client: ApiClient,
    saver: S,
}

impl<S: RouteSaver> PendingDownload<S> {
    pub fn request(&self) -> &RouteRequest {
        &self.request
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Fetch the export and save it. Panics inside are reported as
    /// [`DownloadError::Unexpected`] so the attempt always settles. Nothing is
    /// saved once the orchestrator has been reset.
    pub async fn run(self) -> SettledAttempt {
        let generation = self.generation;
        let outcome = AssertUnwindSafe(self.fetch_and_save())
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Some(Err(DownloadError::Unexpected(format!(
                    "Unexpected error: {}",
                    panic_message(panic.as_ref())
                ))))
            });
        SettledAttempt {
            generation,
            outcome,
        }
    }

    fn is_abandoned(&self) -> bool {
        self.current_generation.load(Ordering::SeqCst) != self.generation
    }

    async fn fetch_and_save(self) -> Option<Result<SavedRoute, DownloadError>> {
        let body = match self.client.fetch_route(&self.url).await {
            Ok(body) => body,
            Err(e) => return Some(Err(DownloadError::Transfer(e.to_string()))),
        };

        if body.is_empty() {
            return Some(Err(DownloadError::EmptyPayload));
        }

        if self.is_abandoned() {
            info!(url = %self.url, filename = %self.filename, "download reset before saving, discarding export");
            return None;
        }

        let saved = self.saver.save(&self.filename, body).await;
        let outcome = match saved {
            Ok(path) => Ok(SavedRoute {
                filename: self.filename,
                path,
            }),
            Err(e) => Err(DownloadError::Unexpected(e.to_string())),
        };
        Some(outcome)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown failure".to_string()
    }
}
