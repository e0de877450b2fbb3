//! Zoom Booking Service
//!
//! Books meetings through the Zoom API while guaranteeing that no two
//! meetings booked through this service overlap.
//!
//! # Modules
//!
//! - `services::booking`: `BookingCoordinator`, which serializes booking
//!   attempts and rejects overlapping candidates
//! - `client`: the `MeetingProvider` trait and its Zoom implementation
//! - `auth`: Zoom Server-to-Server OAuth
//! - `handlers` / `routes`: the HTTP surface
//!
//! # Identifiers
//!
//! Meeting ids exposed by the API are UUIDv5 hashes of Zoom's meeting uuid,
//! so the same Zoom meeting keeps the same id across listings without any
//! local storage.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;




// Re-export the main API types for ease of use
pub use client::{MeetingProvider, ZoomMeetingClient};
pub use config::AppConfig;
pub use error::{ConflictError, ProviderError};
pub use handlers::api::AppState;
pub use routes::create_router;
pub use services::booking::{BookingCoordinator, BookingOutcome};
