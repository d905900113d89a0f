pub mod download_orchestrator;
pub mod save;

pub use download_orchestrator::{DownloadOrchestrator, SettledAttempt};
pub use save::{LocalSaver, RouteSaver};
