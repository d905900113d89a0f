use std::fmt;

use iced::{
    widget::{button, column, pick_list, row, text, text_input, Space},
    Element, Length,
};

use crate::application::{DownloadOrchestrator, RouteSaver};
use crate::domain::{DownloadPhase, RouteCategory};

/// Whole route or a single numbered part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteScope {
    WholeRoute,
    SingleSegment,
}

impl RouteScope {
    const ALL: [RouteScope; 2] = [RouteScope::WholeRoute, RouteScope::SingleSegment];

    fn from_segment_enabled(enabled: bool) -> Self {
        if enabled {
            RouteScope::SingleSegment
        } else {
            RouteScope::WholeRoute
        }
    }
}

impl fmt::Display for RouteScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteScope::WholeRoute => write!(f, "Whole route"),
            RouteScope::SingleSegment => write!(f, "Single segment"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum FormMessage {
    CategorySelected(RouteCategory),
    RouteNumberChanged(String),
    ScopeSelected(RouteScope),
    SegmentNumberChanged(String),
    DownloadPressed,
    ResetPressed,
}

/// Renders the orchestrator's current form and outcome.
pub fn view<S: RouteSaver>(orchestrator: &DownloadOrchestrator<S>) -> Element<'_, FormMessage> {
    let in_flight = orchestrator.is_in_flight();
    let scope = RouteScope::from_segment_enabled(orchestrator.segment_enabled());

    let mut segment_input = text_input("Segment number, e.g. 2", orchestrator.segment_number())
        .padding(10);
    if scope == RouteScope::SingleSegment {
        segment_input = segment_input.on_input(FormMessage::SegmentNumberChanged);
    }

    let status = match orchestrator.phase() {
        DownloadPhase::Idle => text("Enter a route number to download its GPX track").size(14),
        DownloadPhase::InFlight => text("Downloading...").size(14),
        DownloadPhase::Failed { title, message } => text(format!("{title}: {message}"))
            .size(14)
            .style(text::danger),
        DownloadPhase::Succeeded { message } => text(message).size(14).style(text::success),
    };

    column![
        text("Route GPX Downloader").size(32),
        Space::new().height(Length::Fixed(20.0)),
        text("Route type:").size(16),
        pick_list(
            RouteCategory::ALL,
            Some(orchestrator.category()),
            FormMessage::CategorySelected
        ),
        text("Route number:").size(16),
        text_input("Route number, e.g. 51", orchestrator.route_number())
            .on_input(FormMessage::RouteNumberChanged)
            .padding(10),
        pick_list(RouteScope::ALL, Some(scope), FormMessage::ScopeSelected),
        segment_input,
        Space::new().height(Length::Fixed(10.0)),
        status,
        Space::new().height(Length::Fixed(20.0)),
        row![
            button("Download GPX")
                .on_press_maybe((!in_flight).then_some(FormMessage::DownloadPressed))
                .padding([10, 20]),
            button("Reset")
                .on_press(FormMessage::ResetPressed)
                .padding([10, 20]),
        ]
        .spacing(10),
    ]
    .padding(20)
    .spacing(10)
    .into()
}
