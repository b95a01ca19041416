mod error;
pub use error::ApiError;

mod handler;
pub use handler::DashboardHandler;

mod adapter;
pub use adapter::DashboardAdapter;

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpApi;

#[cfg(feature = "http")]
pub use axum;
