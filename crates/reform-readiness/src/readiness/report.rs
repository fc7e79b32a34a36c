use super::pipeline::ScoringRun;
use super::scoring::{ReadinessClass, ScoreRecord};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Serialize)]
pub struct ClassShareEntry {
    pub class: ReadinessClass,
    pub class_label: &'static str,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedScoreView {
    pub rank: usize,
    pub identity: String,
    pub score: f64,
    pub class_label: &'static str,
}

/// Run-level overview for operators: volumes, tier distribution and the highest scores.
#[derive(Debug, Clone, Serialize)]
pub struct ScoringRunSummary {
    pub score_date: NaiveDate,
    pub events: usize,
    pub identities: usize,
    pub mean_score: f64,
    pub distribution: Vec<ClassShareEntry>,
    pub top_scores: Vec<RankedScoreView>,
}

impl ScoringRunSummary {
    pub fn from_run(run: &ScoringRun, top_n: usize) -> Self {
        let scores = &run.scores;
        let identities = scores.len();

        let mean_score = if identities == 0 {
            0.0
        } else {
            let total: f64 = scores.iter().map(|record| record.score).sum();
            (total / identities as f64 * 100.0).round() / 100.0
        };

        let distribution = ReadinessClass::ordered()
            .into_iter()
            .map(|class| {
                let count = scores
                    .iter()
                    .filter(|record| record.class_label == class)
                    .count();
                let percentage = if identities == 0 {
                    0.0
                } else {
                    (count as f64 / identities as f64 * 1000.0).round() / 10.0
                };
                ClassShareEntry {
                    class,
                    class_label: class.label(),
                    count,
                    percentage,
                }
            })
            .collect();

        let mut ranked: Vec<&ScoreRecord> = scores.iter().collect();
        ranked.sort_by(|a, b| match b.score.total_cmp(&a.score) {
            Ordering::Equal => a.identity.cmp(&b.identity),
            other => other,
        });

        let top_scores = ranked
            .into_iter()
            .take(top_n)
            .enumerate()
            .map(|(index, record)| RankedScoreView {
                rank: index + 1,
                identity: record.identity.to_string(),
                score: record.score,
                class_label: record.class_label.label(),
            })
            .collect();

        Self {
            score_date: run.reference_time.date_naive(),
            events: run.events,
            identities,
            mean_score,
            distribution,
            top_scores,
        }
    }
}
