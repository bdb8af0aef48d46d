/// Classifier quality metrics over the whole series.
///
/// Every call recomputes `predicted`/`actual` for each record from the
/// thresholds it is given, then cross-tabulates the label pairs. Any
/// prediction or label columns that came with the input were dropped by the
/// loader and play no part here.
///
/// Degenerate denominators resolve to `0.0`, never NaN or infinity: the
/// dashboard shows "0.00%" for a precision with no positive predictions.

use serde::Serialize;

use crate::model::{DerivedLabels, Series, Thresholds};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Confusion matrix cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConfusionCounts {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

/// Each confusion matrix cell as a percentage of all records.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ConfusionShares {
    pub true_positives_pct: f64,
    pub true_negatives_pct: f64,
    pub false_positives_pct: f64,
    pub false_negatives_pct: f64,
}

impl ConfusionCounts {
    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// Tallies one label pair into the matching cell.
    pub fn record(&mut self, labels: DerivedLabels) {
        match (labels.predicted, labels.actual) {
            (true, true) => self.true_positives += 1,
            (false, false) => self.true_negatives += 1,
            (true, false) => self.false_positives += 1,
            (false, true) => self.false_negatives += 1,
        }
    }

    /// Cell shares of the total, in percent. All zero for an empty matrix.
    pub fn shares(&self) -> ConfusionShares {
        let total = self.total();
        ConfusionShares {
            true_positives_pct: ratio(self.true_positives, total) * 100.0,
            true_negatives_pct: ratio(self.true_negatives, total) * 100.0,
            false_positives_pct: ratio(self.false_positives, total) * 100.0,
            false_negatives_pct: ratio(self.false_negatives, total) * 100.0,
        }
    }
}

/// Confusion counts plus the four derived scores, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityReport {
    pub counts: ConfusionCounts,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Scores formatted for display, e.g. `"87.50%"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedScores {
    pub accuracy: String,
    pub precision: String,
    pub recall: String,
    pub f1: String,
}

impl QualityReport {
    pub fn formatted(&self) -> FormattedScores {
        FormattedScores {
            accuracy: format_percent(self.accuracy),
            precision: format_percent(self.precision),
            recall: format_percent(self.recall),
            f1: format_percent(self.f1),
        }
    }
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Recomputed label pair for every record, in series order.
pub fn labels(series: &Series, thresholds: &Thresholds) -> Vec<DerivedLabels> {
    series
        .records()
        .iter()
        .map(|r| DerivedLabels::for_record(r, thresholds))
        .collect()
}

/// Confusion counts over the full series.
pub fn confusion_counts(series: &Series, thresholds: &Thresholds) -> ConfusionCounts {
    let mut counts = ConfusionCounts::default();
    for record in series.records() {
        counts.record(DerivedLabels::for_record(record, thresholds));
    }
    counts
}

/// Scores derived from a confusion matrix with the zero guards applied.
pub fn scores(counts: ConfusionCounts) -> QualityReport {
    let tp = counts.true_positives;

    let accuracy = ratio(tp + counts.true_negatives, counts.total());
    let precision = ratio(tp, tp + counts.false_positives);
    let recall = ratio(tp, tp + counts.false_negatives);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    QualityReport {
        counts,
        accuracy,
        precision,
        recall,
        f1,
    }
}

/// Confusion counts and quality scores for the series under `thresholds`.
pub fn confusion_and_scores(series: &Series, thresholds: &Thresholds) -> QualityReport {
    scores(confusion_counts(series, thresholds))
}

/// Formats a score in [0, 1] as a percentage with two decimals.
pub fn format_percent(score: f64) -> String {
    format!("{:.2}%", score * 100.0)
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AlarmRecord;
    use chrono::{Duration, TimeZone, Utc};

    fn series_of(points: &[(f64, u32)]) -> Series {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Series::from_records(
            points
                .iter()
                .enumerate()
                .map(|(i, &(probability, active_alarms))| AlarmRecord {
                    timestamp: base + Duration::minutes(30 * i as i64),
                    active_alarms,
                    probability,
                })
                .collect(),
        )
    }

    fn reference_series() -> Series {
        series_of(&[(0.9, 300), (0.1, 100), (0.7, 250), (0.3, 200)])
    }

    #[test]
    fn test_perfect_classifier() {
        let report = confusion_and_scores(&reference_series(), &Thresholds { probability: 0.6, alarms: 225 });

        assert_eq!(
            report.counts,
            ConfusionCounts {
                true_positives: 2,
                true_negatives: 2,
                false_positives: 0,
                false_negatives: 0,
            }
        );
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.precision, 1.0);
        assert_eq!(report.recall, 1.0);
        assert_eq!(report.f1, 1.0);
    }

    #[test]
    fn test_lower_probability_threshold_keeps_same_labels() {
        let report = confusion_and_scores(&reference_series(), &Thresholds { probability: 0.5, alarms: 225 });
        assert_eq!(report.counts.true_positives, 2);
        assert_eq!(report.counts.true_negatives, 2);
        assert_eq!(report.f1, 1.0);
    }

    #[test]
    fn test_no_actual_floods_guards_recall_and_f1() {
        let report = confusion_and_scores(&reference_series(), &Thresholds { probability: 0.6, alarms: 350 });

        assert_eq!(report.counts.true_positives, 0);
        assert_eq!(report.counts.false_positives, 2);
        assert_eq!(report.counts.false_negatives, 0);
        assert_eq!(report.counts.true_negatives, 2);
        assert_eq!(report.accuracy, 0.5);
        assert_eq!(report.precision, 0.0);
        assert_eq!(report.recall, 0.0);
        assert_eq!(report.f1, 0.0);
    }

    #[test]
    fn test_no_positive_predictions_precision_is_zero_not_nan() {
        let series = series_of(&[(0.1, 300), (0.2, 100)]);
        let report = confusion_and_scores(&series, &Thresholds { probability: 0.6, alarms: 225 });

        assert_eq!(report.counts.false_negatives, 1);
        assert_eq!(report.precision, 0.0);
        assert!(!report.precision.is_nan());
        assert_eq!(report.recall, 0.0);
        assert_eq!(report.f1, 0.0);
    }

    #[test]
    fn test_empty_series_scores_are_zero() {
        let report = confusion_and_scores(&series_of(&[]), &Thresholds::default());
        assert_eq!(report.counts.total(), 0);
        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.precision, 0.0);
        assert_eq!(report.recall, 0.0);
        assert_eq!(report.f1, 0.0);
        assert_eq!(report.counts.shares(), ConfusionShares::default());
    }

    #[test]
    fn test_counts_sum_to_series_length() {
        let series = series_of(&[(0.61, 224), (0.59, 226), (0.6, 225), (0.0, 0), (1.0, 1000), (0.35, 240)]);
        for (p, a) in [(0.0, 0), (0.6, 225), (1.0, 1000), (0.35, 10)] {
            let counts = confusion_counts(&series, &Thresholds { probability: p, alarms: a });
            assert_eq!(counts.total(), series.len(), "thresholds ({}, {})", p, a);
        }
    }

    #[test]
    fn test_mixed_outcomes_scores() {
        // predicted: T T F F T ; actual: T F T F T
        let series = series_of(&[(0.8, 300), (0.7, 100), (0.2, 260), (0.1, 50), (0.95, 400)]);
        let report = confusion_and_scores(&series, &Thresholds { probability: 0.6, alarms: 225 });

        assert_eq!(report.counts.true_positives, 2);
        assert_eq!(report.counts.false_positives, 1);
        assert_eq!(report.counts.false_negatives, 1);
        assert_eq!(report.counts.true_negatives, 1);
        assert!((report.accuracy - 0.6).abs() < 1e-12);
        assert!((report.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((report.recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((report.f1 - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_labels_follow_series_order() {
        let labels = labels(&reference_series(), &Thresholds { probability: 0.6, alarms: 225 });
        let predicted: Vec<bool> = labels.iter().map(|l| l.predicted).collect();
        let actual: Vec<bool> = labels.iter().map(|l| l.actual).collect();
        assert_eq!(predicted, vec![true, false, true, false]);
        assert_eq!(actual, vec![true, false, true, false]);
    }

    #[test]
    fn test_shares_and_formatting() {
        let report = confusion_and_scores(&reference_series(), &Thresholds { probability: 0.6, alarms: 350 });
        let shares = report.counts.shares();
        assert_eq!(shares.false_positives_pct, 50.0);
        assert_eq!(shares.true_negatives_pct, 50.0);
        assert_eq!(shares.true_positives_pct, 0.0);

        let formatted = report.formatted();
        assert_eq!(formatted.accuracy, "50.00%");
        assert_eq!(formatted.precision, "0.00%");
        assert_eq!(format_percent(0.875), "87.50%");
    }

    #[test]
    fn test_repeated_evaluation_is_deterministic() {
        let series = reference_series();
        let t = Thresholds { probability: 0.3, alarms: 200 };
        assert_eq!(confusion_and_scores(&series, &t), confusion_and_scores(&series, &t));
    }
}
