// Data rate computation and output
// (c) 2024 Ross Younger

use human_repr::HumanThroughput;
use std::{fmt::Display, time::Duration};

/// A payload data rate, with human friendly output
#[derive(Debug, Clone, Copy)]
pub struct DataRate {
    /// Bytes per second; if None, we were unable to compute a rate.
    rate: Option<f64>,
}

impl DataRate {
    /// Computes the rate at which `bytes` moved in `time`.
    /// A zero duration has no meaningful rate.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(bytes: u64, time: Duration) -> Self {
        if time.is_zero() {
            Self { rate: None }
        } else {
            Self {
                rate: Some((bytes as f64) / time.as_secs_f64()),
            }
        }
    }
    /// Bits per second
    #[must_use]
    pub fn bit_rate(&self) -> Option<f64> {
        self.rate.map(|r| r * 8.)
    }
}

impl Display for DataRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.bit_rate() {
            None => f.write_str("unknown"),
            Some(rate) => rate.human_throughput("bit").fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DataRate;
    use std::time::Duration;

    #[test]
    fn zero() {
        let r = DataRate::new(1234, Duration::from_secs(0));
        assert_eq!(r.bit_rate(), None);
        assert_eq!(format!("{r}"), "unknown");
    }

    #[test]
    fn rates() {
        let r = DataRate::new(10_240, Duration::from_millis(500));
        assert_eq!(r.bit_rate(), Some(163_840.));
    }

    fn test_case(bytes: u64, time: u64, expect: &str) {
        let r = DataRate::new(bytes, Duration::from_secs(time));
        assert_eq!(format!("{r}"), expect);
    }
    #[test]
    fn display() {
        test_case(42, 8, "42bit/s");
        test_case(1250, 1, "10kbit/s");
        test_case(10_000_000_000, 500, "160Mbit/s");
    }
}
