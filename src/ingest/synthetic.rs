/// Demo series used when no prediction output file can be loaded.
///
/// Fixed shape (100 half-hourly points starting 2025-01-01 00:00 UTC),
/// random values: alarm counts uniform in [100, 300) and probabilities
/// uniform in [0, 1). Pass a seeded RNG for reproducible output.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::Rng;

use crate::model::{AlarmRecord, Series, NOMINAL_SAMPLE_INTERVAL_MINUTES};

pub const DEMO_POINTS: usize = 100;
pub const DEMO_MIN_ALARMS: u32 = 100;
pub const DEMO_MAX_ALARMS: u32 = 300; // exclusive

/// First timestamp of the demo series.
pub fn demo_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap_or_default()
}

/// Generates `points` records spaced `interval_minutes` apart from `start`.
pub fn synthetic_series<R: Rng + ?Sized>(
    rng: &mut R,
    start: DateTime<Utc>,
    points: usize,
    interval_minutes: u32,
) -> Series {
    let records = (0..points)
        .map(|i| AlarmRecord {
            timestamp: start + Duration::minutes(i as i64 * interval_minutes as i64),
            active_alarms: rng.gen_range(DEMO_MIN_ALARMS..DEMO_MAX_ALARMS),
            probability: rng.r#gen::<f64>(),
        })
        .collect();
    Series::from_records(records)
}

/// The standard demo series, freshly randomized.
pub fn demo_series() -> Series {
    synthetic_series(
        &mut rand::thread_rng(),
        demo_start(),
        DEMO_POINTS,
        NOMINAL_SAMPLE_INTERVAL_MINUTES,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_demo_series_shape() {
        let series = demo_series();
        assert_eq!(series.len(), DEMO_POINTS);
        assert_eq!(series.records()[0].timestamp, demo_start());
        assert_eq!(
            series.latest().map(|r| r.timestamp),
            Some(demo_start() + Duration::minutes(30 * 99))
        );
    }

    #[test]
    fn test_demo_values_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let series = synthetic_series(&mut rng, demo_start(), 500, 30);
        for r in series.records() {
            assert!((DEMO_MIN_ALARMS..DEMO_MAX_ALARMS).contains(&r.active_alarms));
            assert!((0.0..1.0).contains(&r.probability));
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = synthetic_series(&mut StdRng::seed_from_u64(42), demo_start(), 20, 30);
        let b = synthetic_series(&mut StdRng::seed_from_u64(42), demo_start(), 20, 30);
        assert_eq!(a, b);
    }
}
