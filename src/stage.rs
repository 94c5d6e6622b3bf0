//! Progress stages
//!
//! The service reports only a coarse percentage. Each stage covers a fixed
//! band of that percentage; the bands are contiguous over 0-100 and ordered,
//! so the label never moves backward while progress grows.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-readable phase of a running validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Initializing,
    AnalyzingProblemClarity,
    ResearchingMarketDemand,
    DiscoveringCompetitors,
    EvaluatingSolutionFit,
    AssessingBusinessModel,
    EstimatingScalability,
    ScoringFeasibility,
    GeneratingReport,
    Completed,
}

/// (lowest percent, stage), ascending
const BREAKPOINTS: [(u8, Stage); 10] = [
    (0, Stage::Initializing),
    (10, Stage::AnalyzingProblemClarity),
    (20, Stage::ResearchingMarketDemand),
    (30, Stage::DiscoveringCompetitors),
    (40, Stage::EvaluatingSolutionFit),
    (55, Stage::AssessingBusinessModel),
    (70, Stage::EstimatingScalability),
    (85, Stage::ScoringFeasibility),
    (95, Stage::GeneratingReport),
    (100, Stage::Completed),
];

impl Stage {
    /// Stage for a reported percentage. Out-of-range input is clamped.
    pub fn from_percent(percent: i64) -> Self {
        let p = clamp_percent(percent);
        BREAKPOINTS
            .iter()
            .rev()
            .find(|(floor, _)| p >= *floor)
            .map(|(_, stage)| *stage)
            .unwrap_or(Stage::Initializing)
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Initializing => "initializing",
            Stage::AnalyzingProblemClarity => "analyzing problem clarity",
            Stage::ResearchingMarketDemand => "researching market demand",
            Stage::DiscoveringCompetitors => "discovering competitors",
            Stage::EvaluatingSolutionFit => "evaluating solution fit",
            Stage::AssessingBusinessModel => "assessing business model",
            Stage::EstimatingScalability => "estimating scalability",
            Stage::ScoringFeasibility => "scoring feasibility",
            Stage::GeneratingReport => "generating report",
            Stage::Completed => "completed",
        }
    }

    /// Percentage at which this stage begins
    pub fn floor(self) -> u8 {
        BREAKPOINTS
            .iter()
            .find(|(_, stage)| *stage == self)
            .map(|(floor, _)| *floor)
            .unwrap_or(0)
    }

    pub fn all() -> impl Iterator<Item = Stage> {
        BREAKPOINTS.iter().map(|(_, stage)| *stage)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label for a reported percentage
pub fn stage_label(percent: i64) -> &'static str {
    Stage::from_percent(percent).label()
}

pub fn clamp_percent(percent: i64) -> u8 {
    percent.clamp(0, 100) as u8
}

/// Displayed progress for one job: clamped, and never lower than what was
/// already shown.
pub fn smooth_progress(previous: u8, reported: i64) -> u8 {
    previous.max(clamp_percent(reported))
}
