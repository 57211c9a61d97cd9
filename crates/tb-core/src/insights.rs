//! Rule-based observations about an [`Analytics`] summary.

use serde::{Deserialize, Serialize};

use crate::aggregate::Analytics;

/// Maximum number of insights returned by [`insights`].
pub const MAX_INSIGHTS: usize = 3;

const EXCELLENT_SCORE: u32 = 80;
const GOOD_SCORE: u32 = 60;
const LOW_DAILY_HOURS: f64 = 6.0;
const HIGH_DAILY_HOURS: f64 = 12.0;

/// How an insight should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Neutral,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub tone: Tone,
    pub message: String,
}

impl Insight {
    fn new(tone: Tone, message: String) -> Self {
        Self { tone, message }
    }
}

/// Derives up to [`MAX_INSIGHTS`] observations, in rule order:
/// productivity tier, shrink outweighing growth, daily average outside
/// 6-12 hours, then growth outweighing everything else.
pub fn insights(analytics: &Analytics) -> Vec<Insight> {
    let score = analytics.productivity_score;
    let growth = analytics.growth.hours;
    let maintenance = analytics.maintenance.hours;
    let shrink = analytics.shrink.hours;
    let daily = analytics.avg_daily_hours;

    let mut found = Vec::new();

    found.push(if score >= EXCELLENT_SCORE {
        Insight::new(
            Tone::Positive,
            format!("Productivity score of {score}% shows a strong balance of growth and maintenance."),
        )
    } else if score >= GOOD_SCORE {
        Insight::new(
            Tone::Neutral,
            format!("Productivity score of {score}%. More growth time would raise it."),
        )
    } else {
        Insight::new(
            Tone::Warning,
            format!("Productivity score of {score}% leaves room to improve. Cutting shrink time helps most."),
        )
    });

    if shrink > growth {
        found.push(Insight::new(
            Tone::Warning,
            format!("Shrink time ({shrink}h) exceeded growth time ({growth}h)."),
        ));
    }

    if daily < LOW_DAILY_HOURS {
        found.push(Insight::new(
            Tone::Neutral,
            format!("Daily average of {daily}h suggests some activities are not being logged."),
        ));
    } else if daily > HIGH_DAILY_HOURS {
        found.push(Insight::new(
            Tone::Warning,
            format!("Daily average of {daily}h is high. Make sure breaks and rest are scheduled."),
        ));
    }

    if growth > maintenance + shrink {
        found.push(Insight::new(
            Tone::Positive,
            format!("{growth}h went to growth, more than everything else combined."),
        ));
    }

    found.truncate(MAX_INSIGHTS);
    found
}
