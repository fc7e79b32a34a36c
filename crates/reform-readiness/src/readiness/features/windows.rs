use chrono::{DateTime, Duration, Utc};

/// Half-open trailing interval `(reference - length, reference]`.
///
/// An event exactly at the reference instant is inside; one exactly `length` before it is not,
/// so consecutive daily runs never count the same boundary event twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TrailingWindow {
    start_exclusive: DateTime<Utc>,
    end_inclusive: DateTime<Utc>,
}

impl TrailingWindow {
    pub(crate) fn days(reference: DateTime<Utc>, days: u32) -> Self {
        Self {
            start_exclusive: reference
                .checked_sub_signed(Duration::days(i64::from(days)))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            end_inclusive: reference,
        }
    }

    pub(crate) fn contains(&self, at: DateTime<Utc>) -> bool {
        at > self.start_exclusive && at <= self.end_inclusive
    }
}
