use thiserror::Error;

/// Why the form fields could not be turned into a [`super::RouteRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("Please enter a route number.")]
    RouteNumberRequired,

    #[error("Route number must be a whole number.")]
    RouteNumberNotANumber,

    #[error("Route number must be a positive number.")]
    RouteNumberNotPositive,

    #[error("Route number is too large.")]
    RouteNumberTooLarge,

    #[error("Please enter a segment number, or switch to the whole route.")]
    SegmentNumberRequired,

    #[error("Segment number must be a whole number.")]
    SegmentNumberNotANumber,

    #[error("Segment number must be a positive number.")]
    SegmentNumberNotPositive,

    #[error("Segment number is too large.")]
    SegmentNumberTooLarge,
}

/// Every way a download attempt can fail, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error("{0}")]
    Input(RejectionReason),

    #[error("Could not build the download address: {0}")]
    Configuration(String),

    #[error("{0}")]
    Transfer(String),

    #[error("The downloaded file is empty. The route or segment might not exist.")]
    EmptyPayload,

    #[error("{0}")]
    Unexpected(String),
}

impl DownloadError {
    pub fn title(&self) -> &'static str {
        match self {
            DownloadError::Input(_) => "Input Required",
            DownloadError::Configuration(_) => "Configuration Error",
            DownloadError::Transfer(_)
            | DownloadError::EmptyPayload
            | DownloadError::Unexpected(_) => "Download Failed",
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<RejectionReason> for DownloadError {
    fn from(reason: RejectionReason) -> Self {
        DownloadError::Input(reason)
    }
}
