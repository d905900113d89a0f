pub mod client;
pub mod locator;
pub mod models;

pub use client::ApiClient;
pub use locator::{filename_for, RouteLocator};
pub use models::ApiConfig;
