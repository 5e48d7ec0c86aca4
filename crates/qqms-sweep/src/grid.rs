//! Delay grid construction.

use qqms_hal::DelayGrid;

use crate::error::{SweepError, SweepResult};

/// Builds one delay grid per qubit.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelayGridBuilder;

impl DelayGridBuilder {
    /// Build `num_qubits` grids of `count` delays linearly spaced over
    /// `[start, end]`, endpoints included.
    ///
    /// Every qubit currently receives the same grid; callers index the
    /// result by physical qubit so per-qubit bounds can be introduced
    /// without changing this signature.
    ///
    /// Fails with [`SweepError::InvalidSweepConfig`] when `count` is zero,
    /// `end < start`, a bound is negative or non-finite, or `num_qubits`
    /// is zero. Bounds are never clamped.
    pub fn build(num_qubits: u32, start: f64, end: f64, count: usize) -> SweepResult<Vec<DelayGrid>> {
        if num_qubits == 0 {
            return Err(SweepError::InvalidSweepConfig(
                "qubit count must be at least 1".into(),
            ));
        }
        if count == 0 {
            return Err(SweepError::InvalidSweepConfig(
                "delay spread must be at least 1".into(),
            ));
        }
        if !start.is_finite() || !end.is_finite() {
            return Err(SweepError::InvalidSweepConfig(format!(
                "delay bounds must be finite (start={start}, end={end})"
            )));
        }
        if start < 0.0 {
            return Err(SweepError::InvalidSweepConfig(format!(
                "delay start {start} is negative"
            )));
        }
        if end < start {
            return Err(SweepError::InvalidSweepConfig(format!(
                "delay end {end} is before start {start}"
            )));
        }

        let grid = DelayGrid::from_values(linspace(start, end, count))
            .map_err(|e| SweepError::InvalidSweepConfig(e.to_string()))?;
        Ok(vec![grid; num_qubits as usize])
    }
}

/// `count` evenly spaced values from `start` to `end` inclusive.
fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    if count == 1 {
        return vec![start];
    }
    let span = end - start;
    let last = (count - 1) as f64;
    (0..count)
        .map(|i| {
            if i + 1 == count {
                end
            } else {
                (start + span * (i as f64) / last).min(end)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reference_grid() {
        let grids = DelayGridBuilder::build(3, 0.0, 50e-5, 100).unwrap();
        assert_eq!(grids.len(), 3);
        let g = &grids[0];
        assert_eq!(g.len(), 100);
        assert_eq!(g.start(), 0.0);
        assert_eq!(g.end(), 50e-5);
        assert!(grids.iter().all(|other| other == g));
    }

    #[test]
    fn test_single_point() {
        let grids = DelayGridBuilder::build(1, 2e-5, 9e-5, 1).unwrap();
        assert_eq!(grids[0].values(), &[2e-5]);
    }

    #[test]
    fn test_degenerate_span() {
        let grids = DelayGridBuilder::build(1, 1e-5, 1e-5, 4).unwrap();
        assert!(grids[0].values().iter().all(|v| *v == 1e-5));
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(matches!(
            DelayGridBuilder::build(2, 0.0, 1.0, 0),
            Err(SweepError::InvalidSweepConfig(_))
        ));
        assert!(matches!(
            DelayGridBuilder::build(2, 1.0, 0.5, 10),
            Err(SweepError::InvalidSweepConfig(_))
        ));
        assert!(DelayGridBuilder::build(0, 0.0, 1.0, 10).is_err());
        assert!(DelayGridBuilder::build(1, -1.0, 1.0, 10).is_err());
        assert!(DelayGridBuilder::build(1, 0.0, f64::INFINITY, 10).is_err());
        assert!(DelayGridBuilder::build(1, f64::NAN, 1.0, 10).is_err());
    }

    proptest! {
        #[test]
        fn prop_grid_spans_bounds(
            num_qubits in 1u32..16,
            start in 0.0f64..1e-3,
            span in 0.0f64..1e-3,
            count in 1usize..300,
        ) {
            let end = start + span;
            let grids = DelayGridBuilder::build(num_qubits, start, end, count).unwrap();
            prop_assert_eq!(grids.len(), num_qubits as usize);
            for grid in &grids {
                let values = grid.values();
                prop_assert_eq!(values.len(), count);
                prop_assert_eq!(values[0], start);
                if count > 1 {
                    prop_assert_eq!(values[count - 1], end);
                }
                prop_assert!(values.iter().all(|v| *v >= start && *v <= end));
                prop_assert!(values.windows(2).all(|w| w[0] <= w[1]));
            }
        }

        #[test]
        fn prop_invalid_bounds_rejected(
            num_qubits in 1u32..16,
            start in 1e-6f64..1e-3,
            gap in 1e-9f64..1e-3,
            count in 0usize..50,
        ) {
            let reversed = DelayGridBuilder::build(num_qubits, start, start - gap, count.max(1));
            prop_assert!(matches!(reversed, Err(SweepError::InvalidSweepConfig(_))));

            let empty = DelayGridBuilder::build(num_qubits, start, start + gap, 0);
            prop_assert!(matches!(empty, Err(SweepError::InvalidSweepConfig(_))));
        }
    }
}
