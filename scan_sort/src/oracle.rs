//! Comparison of device results against CPU references.
//!
//! Integer primitives must match exactly. Floating-point results may differ
//! by rounding, so they are accepted while the average relative difference
//! stays within `MAX_AVERAGE_RELATIVE_DIFFERENCE`.

use crate::error::{Error, Result};
use log::error;
use std::panic::Location;

pub const MAX_AVERAGE_RELATIVE_DIFFERENCE: f64 = 0.01;

/// Fails with the first index at which `actual` differs from `expected`.
/// The error carries the caller's file and line.
#[track_caller]
pub fn expect_same(expected: &[u32], actual: &[u32], message: &str) -> Result<()> {
    let location = Location::caller();
    if expected.len() != actual.len() {
        return Err(Error::LengthMismatch {
            message: message.to_string(),
            expected: expected.len(),
            actual: actual.len(),
            location,
        });
    }

    match expected.iter().zip(actual).position(|(e, a)| e != a) {
        None => Ok(()),
        Some(index) => {
            error!("{}: first mismatch at index {}", message, index);
            Err(Error::Mismatch {
                message: message.to_string(),
                index,
                expected: expected[index],
                actual: actual[index],
                location,
            })
        }
    }
}

/// Mean of `|a - b| / max(|a|, |b|)` over every pair, where pairs of two zeros
/// contribute nothing but still count towards the mean.
pub fn average_relative_difference(expected: &[f32], actual: &[f32]) -> f64 {
    if expected.is_empty() {
        return 0.0;
    }
    let sum: f64 = expected
        .iter()
        .zip(actual)
        .map(|(&e, &a)| (e as f64, a as f64))
        .filter(|&(e, a)| e != 0.0 || a != 0.0)
        .map(|(e, a)| (e - a).abs() / e.abs().max(a.abs()))
        .sum();
    sum / expected.len() as f64
}

/// Accepts `actual` if its average relative difference to `expected` is at
/// most 1%. Returns the difference.
#[track_caller]
pub fn expect_close(expected: &[f32], actual: &[f32]) -> Result<f64> {
    if expected.len() != actual.len() {
        return Err(Error::LengthMismatch {
            message: "Floating-point results differ in length.".to_string(),
            expected: expected.len(),
            actual: actual.len(),
            location: Location::caller(),
        });
    }

    let average = average_relative_difference(expected, actual);
    if average > MAX_AVERAGE_RELATIVE_DIFFERENCE {
        return Err(Error::Tolerance {
            average: average * 100.0,
            threshold: MAX_AVERAGE_RELATIVE_DIFFERENCE * 100.0,
        });
    }
    Ok(average)
}
