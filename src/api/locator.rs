use thiserror::Error;
use url::Url;

use crate::domain::RouteRequest;

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("invalid service address {base:?}: {source}")]
    InvalidBase {
        base: String,
        #[source]
        source: url::ParseError,
    },

    #[error("service address {base:?} cannot carry a route path")]
    CannotBeABase { base: String },
}

/// Builds the export address for a [`RouteRequest`] below a service base URL.
#[derive(Debug, Clone)]
pub struct RouteLocator {
    base: String,
}

impl RouteLocator {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `<base>/route/<category>/<route>` plus `/part/<segment>` for a single part.
    pub fn locate(&self, request: &RouteRequest) -> Result<Url, LocateError> {
        let mut url = Url::parse(&self.base).map_err(|source| LocateError::InvalidBase {
            base: self.base.clone(),
            source,
        })?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| LocateError::CannotBeABase {
                    base: self.base.clone(),
                })?;
            // push() percent-encodes each segment
            segments
                .pop_if_empty()
                .push("route")
                .push(request.category().path_token())
                .push(&request.route_number().to_string());
            if let Some(segment) = request.segment() {
                segments.push("part").push(&segment.to_string());
            }
        }

        Ok(url)
    }
}

/// Local file name for the export, e.g. `route51-part2.gpx`.
pub fn filename_for(request: &RouteRequest) -> String {
    match request.segment() {
        Some(segment) => format!("route{}-part{}.gpx", request.route_number(), segment),
        None => format!("route{}.gpx", request.route_number()),
    }
}
