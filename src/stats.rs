use crate::grades::PASS_THRESHOLD;
use crate::models::Student;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: usize,
    pub average: f64,
    pub pass_count: usize,
    pub fail_count: usize,
    pub pass_percentage: f64,
    pub max_grade: f64,
    pub min_grade: f64,
}

/// Summarises a set of records. An empty set yields all zeros rather than
/// NaN so the page has something stable to show.
pub fn aggregate(records: &[Student]) -> Statistics {
    if records.is_empty() {
        return Statistics::default();
    }

    let total = records.len();
    let mut sum = 0.0;
    let mut pass_count = 0usize;
    let mut max_grade = f64::NEG_INFINITY;
    let mut min_grade = f64::INFINITY;

    for record in records {
        let grade = record.nota;
        sum += grade;
        if grade >= PASS_THRESHOLD {
            pass_count += 1;
        }
        max_grade = max_grade.max(grade);
        min_grade = min_grade.min(grade);
    }

    let count = total as f64;
    Statistics {
        total,
        average: round_to(sum / count, 2),
        pass_count,
        fail_count: total - pass_count,
        pass_percentage: round_to(pass_count as f64 / count * 100.0, 1),
        max_grade,
        min_grade,
    }
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
