//! Analytics - per-session trends from consolidated history
//!
//! Two series per exercise, one point per recorded session:
//! - max weight lifted in the session
//! - volume (sum of reps * weight)
//!
//! Empty sessions produce `None` so the series stay aligned with the
//! session count.

use crate::history::ConsolidatedHistory;
use crate::models::{Routine, SetData};

/// Trend series for one exercise
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseTrend {
    pub name: String,
    pub max_weight: Vec<Option<f64>>,
    pub volume: Vec<Option<f64>>,
}

impl ExerciseTrend {
    pub fn sessions(&self) -> usize {
        self.max_weight.len()
    }

    /// Latest non-empty max weight
    pub fn latest_max_weight(&self) -> Option<f64> {
        self.max_weight.iter().rev().find_map(|w| *w)
    }

    /// Best max weight across all sessions
    pub fn best_max_weight(&self) -> Option<f64> {
        self.max_weight.iter().flatten().copied().reduce(f64::max)
    }
}

pub struct Analytics {
    history: ConsolidatedHistory,
}

impl Analytics {
    pub fn new(history: ConsolidatedHistory) -> Self {
        Self { history }
    }

    pub fn max_weight_series(&self, exercise: &str) -> Vec<Option<f64>> {
        self.history
            .sessions(exercise)
            .iter()
            .map(|session| session_max_weight(session))
            .collect()
    }

    pub fn volume_series(&self, exercise: &str) -> Vec<Option<f64>> {
        self.history
            .sessions(exercise)
            .iter()
            .map(|session| session_volume(session))
            .collect()
    }

    pub fn trend(&self, exercise: &str) -> Option<ExerciseTrend> {
        if self.history.sessions(exercise).is_empty() {
            return None;
        }
        Some(ExerciseTrend {
            name: exercise.to_string(),
            max_weight: self.max_weight_series(exercise),
            volume: self.volume_series(exercise),
        })
    }

    /// Trends for a routine's exercises that have history, in routine order
    pub fn routine_trends(&self, routine: &Routine) -> Vec<ExerciseTrend> {
        let mut trends: Vec<ExerciseTrend> = Vec::new();
        for planned in &routine.exercises {
            if trends.iter().any(|t| t.name == planned.name) {
                continue;
            }
            if let Some(trend) = self.trend(&planned.name) {
                trends.push(trend);
            }
        }
        trends
    }
}

fn session_max_weight(session: &[SetData]) -> Option<f64> {
    session.iter().map(|s| s.weight).reduce(f64::max)
}

fn session_volume(session: &[SetData]) -> Option<f64> {
    if session.is_empty() {
        return None;
    }
    Some(session.iter().map(SetData::volume).sum())
}
