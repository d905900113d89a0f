use std::fmt;

/// Route namespace published by the upstream service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RouteCategory {
    #[default]
    Hiking,
    Cycling,
}

impl RouteCategory {
    pub const ALL: [RouteCategory; 2] = [RouteCategory::Hiking, RouteCategory::Cycling];

    /// Token used in the resource path, e.g. `/route/hiking/51`.
    pub fn path_token(self) -> &'static str {
        match self {
            RouteCategory::Hiking => "hiking",
            RouteCategory::Cycling => "cycling",
        }
    }
}

impl fmt::Display for RouteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteCategory::Hiking => write!(f, "Hiking"),
            RouteCategory::Cycling => write!(f, "Cycling"),
        }
    }
}

/// A validated request for one route, or one numbered part of it.
///
/// Only built by [`crate::domain::validate`], so `route_number >= 1` and a
/// present `segment` is `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteRequest {
    category: RouteCategory,
    route_number: u32,
    segment: Option<u32>,
}

impl RouteRequest {
    pub(crate) fn new(category: RouteCategory, route_number: u32, segment: Option<u32>) -> Self {
        debug_assert!(route_number >= 1);
        debug_assert!(segment.is_none_or(|s| s >= 1));
        Self {
            category,
            route_number,
            segment,
        }
    }

    pub fn category(&self) -> RouteCategory {
        self.category
    }

    pub fn route_number(&self) -> u32 {
        self.route_number
    }

    pub fn segment(&self) -> Option<u32> {
        self.segment
    }
}

impl fmt::Display for RouteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.segment {
            Some(segment) => write!(
                f,
                "{} route {} part {}",
                self.category, self.route_number, segment
            ),
            None => write!(f, "{} route {}", self.category, self.route_number),
        }
    }
}

/// Raw form fields as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteForm {
    pub category: RouteCategory,
    pub route_number: String,
    pub segment_enabled: bool,
    pub segment_number: String,
}

/// Settled outcome of the last attempt. `Failed` and `Succeeded` replace each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalState {
    Failed { title: String, message: String },
    Succeeded { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadPhase {
    Idle,
    InFlight,
    Failed { title: String, message: String },
    Succeeded { message: String },
}

impl From<TerminalState> for DownloadPhase {
    fn from(state: TerminalState) -> Self {
        match state {
            TerminalState::Failed { title, message } => DownloadPhase::Failed { title, message },
            TerminalState::Succeeded { message } => DownloadPhase::Succeeded { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_form_is_empty_hiking_whole_route() {
        let form = RouteForm::default();
        assert_eq!(form.category, RouteCategory::Hiking);
        assert!(form.route_number.is_empty());
        assert!(!form.segment_enabled);
        assert!(form.segment_number.is_empty());
    }

    #[test]
    fn request_display_names_the_part() {
        let whole = RouteRequest::new(RouteCategory::Cycling, 9, None);
        let part = RouteRequest::new(RouteCategory::Hiking, 51, Some(2));
        assert_eq!(whole.to_string(), "Cycling route 9");
        assert_eq!(part.to_string(), "Hiking route 51 part 2");
    }
}
