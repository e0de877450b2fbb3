use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::{BoxError, ServiceBuilder};

use crate::handlers::api::{create_meeting, list_meetings, AppState};
use crate::handlers::health::health_check;

// Bookings in flight or queued on the booking lock before new ones are shed.
pub const MAX_PENDING_BOOKINGS: usize = 64;

// Error handler for the booking route's load shedding
async fn handle_overload(error: BoxError) -> (StatusCode, String) {
    if error.is::<tower::load_shed::error::Overloaded>() {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Service is overloaded, try again later".to_string(),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", error),
        )
    }
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    create_router_with_booking_limit(app_state, MAX_PENDING_BOOKINGS)
}

/// Build the router, shedding `POST /meetings` beyond `booking_limit`
/// concurrent requests. Listing and health checks are never shed, so a
/// backlog of bookings waiting on the lock cannot starve them.
pub fn create_router_with_booking_limit(app_state: Arc<AppState>, booking_limit: usize) -> Router {
    let booking = post(create_meeting).layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_overload))
            .load_shed()
            .concurrency_limit(booking_limit),
    );

    Router::new()
        .route("/health", get(health_check))
        .route("/meetings", get(list_meetings).merge(booking))
        .with_state(app_state)
}
