use super::windows::TrailingWindow;
use super::CompiledRules;
use crate::readiness::domain::Event;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker {
    CartAdd,
    Checkout,
    Other,
}

#[derive(Debug, Clone)]
pub(crate) struct TimelineEntry {
    pub(crate) at: DateTime<Utc>,
    pub(crate) marker: Marker,
    pub(crate) high_intent: bool,
    pub(crate) category: Option<String>,
}

/// One identity's events, normalized against the rules and sorted once by time.
#[derive(Debug)]
pub(crate) struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub(crate) fn build(events: &[&Event], rules: &CompiledRules) -> Self {
        let mut entries: Vec<TimelineEntry> = events
            .iter()
            .map(|event| {
                let name = event.normalized_name();
                let marker = match name.as_deref() {
                    Some(name) if name == rules.cart_add => Marker::CartAdd,
                    Some(name) if name == rules.checkout => Marker::Checkout,
                    _ => Marker::Other,
                };
                let high_intent = name
                    .as_deref()
                    .is_some_and(|name| rules.high_intent.contains(name));

                TimelineEntry {
                    at: event.event_time,
                    marker,
                    high_intent,
                    category: event.properties.category(),
                }
            })
            .collect();

        entries.sort_by_key(|entry| entry.at);
        Self { entries }
    }

    pub(crate) fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// Latest event time that is not after `reference`.
    pub(crate) fn latest_at_or_before(&self, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let end = self.entries.partition_point(|entry| entry.at <= reference);
        end.checked_sub(1).map(|index| self.entries[index].at)
    }

    /// Counts cart adds inside `window` with no checkout in `[add, add + grace]`.
    ///
    /// Checkouts are searched across the whole timeline, not just the window. Both sequences
    /// are time-ordered, so a single forward pointer over the checkouts suffices.
    pub(crate) fn abandoned_carts(&self, window: TrailingWindow, grace: Duration) -> u32 {
        let checkouts: Vec<DateTime<Utc>> = self
            .entries
            .iter()
            .filter(|entry| entry.marker == Marker::Checkout)
            .map(|entry| entry.at)
            .collect();

        let mut next = 0;
        let mut abandoned = 0;

        for entry in &self.entries {
            if entry.marker != Marker::CartAdd || !window.contains(entry.at) {
                continue;
            }

            while next < checkouts.len() && checkouts[next] < entry.at {
                next += 1;
            }

            let converted = checkouts
                .get(next)
                .is_some_and(|checkout| match entry.at.checked_add_signed(grace) {
                    Some(deadline) => *checkout <= deadline,
                    None => true,
                });
            if !converted {
                abandoned += 1;
            }
        }

        abandoned
    }
}
