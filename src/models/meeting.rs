use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

// A meeting booked with the provider. The provider is the source of truth;
// nothing here is persisted locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meeting {
    pub id: Uuid,
    pub start_date: DateTime<Utc>,
    pub duration_minutes: u32,
}

impl Meeting {
    pub fn interval(&self) -> Interval {
        Interval::from_start(self.start_date, self.duration_minutes)
    }
}

// Returned only by a successful create; listing never carries a join link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedMeeting {
    pub meeting: Meeting,
    pub join_link: String,
}

// Candidate submitted for booking. Lives for one booking attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingCreate {
    pub topic: String,
    pub start_date: DateTime<Utc>,
    pub duration_minutes: u32,
}

impl MeetingCreate {
    pub fn interval(&self) -> Interval {
        Interval::from_start(self.start_date, self.duration_minutes)
    }
}

/// Half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Interval covering `duration_minutes` from `start`.
    ///
    /// Saturates at the largest representable instant instead of overflowing.
    pub fn from_start(start: DateTime<Utc>, duration_minutes: u32) -> Self {
        let end = start
            .checked_add_signed(Duration::minutes(i64::from(duration_minutes)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { start, end }
    }

    /// True when the two ranges share at least one instant.
    ///
    /// Ranges that only touch (`self.end == other.start`) do not overlap. An
    /// empty range overlaps any range that strictly contains its instant, but
    /// not one it sits on the boundary of, and not itself.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}
