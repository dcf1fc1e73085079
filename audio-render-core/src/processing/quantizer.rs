//! Buffer duration quantization.
//!
//! Exclusive streams own the device timing and get no smoothing from the
//! audio engine, so they need a larger floor (three default periods, aligned
//! to the minimum period) than shared streams (two default periods).

use crate::models::session::ShareMode;

/// Backend time unit: 100 nanoseconds.
pub type ReferenceTime = i64;

pub const HNS_PER_MS: i64 = 10_000;

/// Round a requested buffer duration up to what the device can honour.
///
/// Period arguments of `0.0` (or less) mean "unknown" and impose no floor.
pub fn quantize(
    requested_ms: u32,
    mode: ShareMode,
    default_period_ms: f64,
    minimum_period_ms: f64,
) -> u32 {
    let mut ms = requested_ms;
    match mode {
        ShareMode::Exclusive => {
            ms = ms.max(ceil_ms(default_period_ms * 3.0));
            if minimum_period_ms > 0.0 {
                let periods = (ms as f64 / minimum_period_ms).ceil();
                ms = ceil_ms(periods * minimum_period_ms);
            }
        }
        ShareMode::Shared => {
            ms = ms.max(ceil_ms(default_period_ms * 2.0));
        }
    }
    ms
}

fn ceil_ms(value: f64) -> u32 {
    if value <= 0.0 {
        0
    } else {
        value.ceil() as u32
    }
}

pub fn ms_to_hns(ms: u32) -> ReferenceTime {
    ms as i64 * HNS_PER_MS
}

pub fn hns_to_ms(hns: ReferenceTime) -> f64 {
    hns as f64 / HNS_PER_MS as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn shared_floors_at_two_default_periods() {
        assert_eq!(quantize(5, ShareMode::Shared, 10.0, 3.0), 20);
        assert_eq!(quantize(20, ShareMode::Shared, 10.0, 3.0), 20);
        assert_eq!(quantize(45, ShareMode::Shared, 10.0, 3.0), 45);
        // fractional periods round up
        assert_eq!(quantize(1, ShareMode::Shared, 10.1, 0.0), 21);
    }

    #[test]
    fn exclusive_floors_at_three_default_periods() {
        assert_eq!(quantize(10, ShareMode::Exclusive, 10.0, 0.0), 30);
        assert_eq!(quantize(50, ShareMode::Exclusive, 10.0, 0.0), 50);
    }

    #[test]
    fn exclusive_rounds_to_minimum_period() {
        assert_eq!(quantize(10, ShareMode::Exclusive, 3.0, 4.0), 12);
        assert_eq!(quantize(31, ShareMode::Exclusive, 10.0, 3.0), 33);
        assert_eq!(quantize(30, ShareMode::Exclusive, 10.0, 3.0), 30);
    }

    #[test]
    fn exclusive_properties_hold_over_grid() {
        for requested in 1..=120 {
            for default in [0.0, 1.0, 2.5, 3.0, 10.0] {
                for minimum in [0.0, 1.0, 2.0, 3.0, 5.0] {
                    let q = quantize(requested, ShareMode::Exclusive, default, minimum);
                    assert!(q >= requested);
                    assert!(q >= (default * 3.0).ceil() as u32);
                    if minimum > 0.0 {
                        assert_eq!(q % minimum as u32, 0, "{} {} {}", requested, default, minimum);
                    }
                }
            }
        }
    }

    #[test]
    fn unknown_periods_pass_request_through() {
        assert_eq!(quantize(7, ShareMode::Shared, 0.0, 0.0), 7);
        assert_eq!(quantize(7, ShareMode::Exclusive, 0.0, 0.0), 7);
    }

    #[test]
    fn unit_conversions() {
        assert_eq!(ms_to_hns(20), 200_000);
        assert_relative_eq!(hns_to_ms(26_667), 2.6667, epsilon = 1e-9);
        assert_relative_eq!(hns_to_ms(100_000), 10.0);
    }
}
