//! Booking coordination.
//!
//! The coordinator is the single authority for admitting new meetings. It
//! guarantees that no two meetings booked through it overlap, even when
//! booking requests arrive concurrently.
//!
//! The provider offers no atomic check-and-create, so the overlap check and
//! the create call run inside one process-wide critical section. This covers
//! every caller sharing a coordinator; a second process or a booking made
//! directly in the provider's own UI can still race with it.
//!
//! No timeout is applied here. A slow provider call holds the lock and delays
//! every queued booking behind it.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::client::MeetingProvider;
use crate::error::{ConflictError, ProviderError};
use crate::models::meeting::{CreatedMeeting, Interval, Meeting, MeetingCreate};

/// Result of a booking attempt that reached a decision.
///
/// A conflict is an ordinary outcome; provider faults travel in the `Err` arm
/// of [`BookingCoordinator::create_meeting`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Created(CreatedMeeting),
    Conflict(ConflictError),
}

pub struct BookingCoordinator {
    provider: Arc<dyn MeetingProvider>,
    // Guards the overlap-check-then-create sequence. tokio's mutex queues
    // waiters in FIFO order.
    booking_lock: Mutex<()>,
}

impl BookingCoordinator {
    pub fn new(provider: Arc<dyn MeetingProvider>) -> Self {
        Self {
            provider,
            booking_lock: Mutex::new(()),
        }
    }

    /// Current meetings, straight from the provider. Never waits on bookings.
    pub async fn list_meetings(&self) -> Result<Vec<Meeting>, ProviderError> {
        self.provider.list_meetings().await
    }

    /// Book `candidate` unless it overlaps an existing meeting.
    ///
    /// At most one call runs its check-then-create sequence at a time. The
    /// lock is released on every exit path, including provider failures.
    pub async fn create_meeting(
        &self,
        candidate: MeetingCreate,
    ) -> Result<BookingOutcome, ProviderError> {
        let _guard = self.booking_lock.lock().await;
        debug!("Acquired booking lock for \"{}\"", candidate.topic);

        let existing = self.list_meetings().await.map_err(|e| {
            error!("Failed to list meetings before booking: {}", e);
            e
        })?;

        let candidate_interval = candidate.interval();
        if let Some(clash) = find_overlapping(&candidate_interval, &existing) {
            warn!(
                "Rejecting \"{}\" at {} ({} min): overlaps meeting {} at {}",
                candidate.topic,
                candidate.start_date,
                candidate.duration_minutes,
                clash.id,
                clash.start_date
            );
            return Ok(BookingOutcome::Conflict(ConflictError));
        }

        let created = self.provider.create_meeting(&candidate).await.map_err(|e| {
            error!("Provider failed to create meeting: {}", e);
            e
        })?;

        info!(
            "Booked meeting {} at {} ({} min)",
            created.meeting.id, created.meeting.start_date, created.meeting.duration_minutes
        );
        Ok(BookingOutcome::Created(created))
    }
}

/// First existing meeting whose interval overlaps `candidate`, if any.
pub fn find_overlapping<'a>(candidate: &Interval, existing: &'a [Meeting]) -> Option<&'a Meeting> {
    existing
        .iter()
        .find(|meeting| meeting.interval().overlaps(candidate))
}

#[cfg(test)]
#[path = "booking_test.rs"]
mod booking_test;
