//! Health check endpoint.

use axum::Json;
use common::DateTime;
use serde::Serialize;

/// Health status of the application.
#[derive(Clone, Debug, Serialize)]
pub struct Health {
    /// Name of the reporting service.
    pub service: &'static str,

    /// Status of the reporting service.
    pub status: &'static str,

    /// [RFC 3339] moment of the report.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub timestamp: String,
}

/// Health check handler.
#[expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]
pub async fn health() -> Json<Health> {
    Json(Health {
        service: "reservation",
        status: "healthy",
        timestamp: DateTime::now().to_rfc3339(),
    })
}
