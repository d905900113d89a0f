mod api;
mod app;
mod application;
mod domain;
mod ui;

use iced::{window, Size};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,route_gpx_downloader=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

fn main() -> iced::Result {
    init_logging();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Route GPX Downloader starting");

    iced::application(app::RouteApp::default, app::update, app::view)
        .title("Route GPX Downloader")
        .window(window::Settings {
            size: Size::new(480.0, 560.0),
            ..Default::default()
        })
        .run()
}
