use proptest::prelude::*;

/// Property-based checks of the detection pipeline invariants

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FixationDetector, GazeTable, Options};

    /// Gaze trace at 1 kHz: plateaus joined by linear saccades, with a
    /// small deterministic tremor and an optional dropout.
    fn synthesize(plateaus: &[(f64, f64, usize)], saccade: usize, dropout: Option<(usize, usize)>) -> GazeTable {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for (k, &(px, py, len)) in plateaus.iter().enumerate() {
            if k > 0 {
                let (qx, qy, _) = plateaus[k - 1];
                for s in 1..=saccade {
                    let a = s as f64 / (saccade + 1) as f64;
                    x.push(qx + a * (px - qx));
                    y.push(qy + a * (py - qy));
                }
            }
            for i in 0..len {
                let phase = (x.len() + i) as f64;
                x.push(px + 0.8 * (phase * 0.7).sin());
                y.push(py + 0.8 * (phase * 1.3).cos());
            }
        }
        if let Some((start, len)) = dropout {
            for i in start..(start + len).min(x.len()) {
                x[i] = -1920.0;
                y[i] = -1080.0;
            }
        }
        let time = (0..x.len()).map(|i| i as f64).collect();
        GazeTable::new(time).with_average(x, y)
    }

    fn plateau() -> impl Strategy<Value = (f64, f64, usize)> {
        (100.0..1800.0f64, 100.0..1000.0f64, 120usize..400)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn test_fixations_ordered_and_long_enough(
            plateaus in prop::collection::vec(plateau(), 1..4),
            saccade in 5usize..30,
            dropout in prop::option::of((0usize..800, 1usize..60)),
        ) {
            let table = synthesize(&plateaus, saccade, dropout);
            let options = Options::with_defaults(1920.0, 1080.0, 1000.0);
            let detector = FixationDetector::new(options.clone()).unwrap();

            let detection = detector.detect(&table).unwrap();

            for f in &detection.fixations {
                prop_assert!(f.duration >= options.min_fix_dur);
                prop_assert!(f.start_index <= f.end_index);
                prop_assert!(f.end_index < table.len());
                prop_assert!((0.0..=1.0).contains(&f.fraction_interpolated));
            }
            for pair in detection.fixations.windows(2) {
                prop_assert!(pair[0].end_time < pair[1].start_time);
            }
        }

        #[test]
        fn test_detection_is_deterministic(
            plateaus in prop::collection::vec(plateau(), 1..4),
            saccade in 5usize..30,
        ) {
            let table = synthesize(&plateaus, saccade, None);
            let detector = FixationDetector::new(Options::with_defaults(1920.0, 1080.0, 1000.0)).unwrap();

            let first = detector.detect(&table).unwrap();
            let second = detector.detect(&table).unwrap();

            prop_assert_eq!(first.fixations, second.fixations);
            prop_assert_eq!(first.weights, second.weights);
        }

        #[test]
        fn test_unbounded_merge_collapses_to_one(
            plateaus in prop::collection::vec(plateau(), 2..4),
        ) {
            let table = synthesize(&plateaus, 10, None);
            let mut options = Options::with_defaults(1920.0, 1080.0, 1000.0);
            options.max_merge_dist = 5000.0;
            options.max_merge_time = 5000.0;

            let detection = FixationDetector::new(options).unwrap().detect(&table).unwrap();

            prop_assert!(detection.fixations.len() <= 1);
        }
    }
}
