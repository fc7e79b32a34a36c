use super::config::ReadinessThresholds;
use super::rules::round2;
use super::{ComponentScore, ScoreComponent};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

const TOP_DRIVERS: usize = 3;

/// Outreach tier derived from the readiness score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadinessClass {
    Ready,
    Nurture,
    DoNotApproach,
}

impl ReadinessClass {
    pub const fn ordered() -> [Self; 3] {
        [Self::Ready, Self::Nurture, Self::DoNotApproach]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Nurture => "NURTURE",
            Self::DoNotApproach => "DO_NOT_APPROACH",
        }
    }
}

impl fmt::Display for ReadinessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl ReadinessThresholds {
    /// Each band includes its lower bound.
    pub fn classify(&self, score: f64) -> ReadinessClass {
        if score >= self.ready_floor {
            ReadinessClass::Ready
        } else if score >= self.nurture_floor {
            ReadinessClass::Nurture
        } else {
            ReadinessClass::DoNotApproach
        }
    }
}

/// A named component reported alongside the score to explain it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub component: ScoreComponent,
    pub contribution: f64,
}

/// Top three components by weighted contribution; ties keep the canonical component order.
pub(crate) fn rank_drivers(components: &[ComponentScore]) -> Vec<Driver> {
    let mut ranked: Vec<&ComponentScore> = components.iter().collect();
    ranked.sort_by_key(|score| score.component.rank());
    // partial_cmp treats -0.0 and 0.0 as equal, so signed zeros keep the canonical order.
    ranked.sort_by(|a, b| {
        b.contribution
            .partial_cmp(&a.contribution)
            .unwrap_or(Ordering::Equal)
    });

    ranked
        .into_iter()
        .take(TOP_DRIVERS)
        .map(|score| Driver {
            component: score.component,
            contribution: round2(score.contribution),
        })
        .collect()
}
