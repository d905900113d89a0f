pub mod error;
pub mod model;
pub mod validation;

pub use error::DownloadError;
pub use model::{DownloadPhase, RouteCategory, RouteForm, RouteRequest, TerminalState};
pub use validation::{validate, validate_form};
