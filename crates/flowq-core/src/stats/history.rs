// ── Time-ordered sample history ──

use std::collections::BTreeMap;

use crate::model::{AveragedStatistics, FlowStatistics, StatisticsSample};

/// Samples of one flow keyed by timestamp. Inserting a sample with an
/// existing timestamp replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleHistory {
    samples: BTreeMap<i64, StatisticsSample>,
}

impl SampleHistory {
    pub fn from_samples<'a>(samples: impl IntoIterator<Item = &'a StatisticsSample>) -> Self {
        let mut history = Self::default();
        for sample in samples {
            history.insert(*sample);
        }
        history
    }

    pub fn insert(&mut self, sample: StatisticsSample) {
        self.samples.insert(sample.timestamp_ms, sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<StatisticsSample> {
        self.samples.values().next_back().copied()
    }

    /// Average rates over the window of `window_secs` ending at the
    /// latest sample.
    ///
    /// The start sample is the one nearest the target start time among
    /// the sample at or before it and the one at or after it; the earlier
    /// one wins a tie. No average exists with fewer than two samples or
    /// when the start sample is not older than the end sample.
    pub fn average(&self, window_secs: u32) -> Option<AveragedStatistics> {
        if self.samples.len() < 2 {
            return None;
        }
        let end = self.latest()?;
        let target = end
            .timestamp_ms
            .saturating_sub(i64::from(window_secs).saturating_mul(1000));

        let floor = self.samples.range(..=target).next_back().map(|(_, s)| *s);
        let ceiling = self.samples.range(target..).next().map(|(_, s)| *s);
        let start = match (floor, ceiling) {
            (Some(f), Some(c)) => {
                if target.abs_diff(f.timestamp_ms) <= c.timestamp_ms.abs_diff(target) {
                    f
                } else {
                    c
                }
            }
            (Some(only), None) | (None, Some(only)) => only,
            (None, None) => return None,
        };

        if start.timestamp_ms >= end.timestamp_ms {
            return None;
        }

        let elapsed = millis_to_secs(end.timestamp_ms.abs_diff(start.timestamp_ms));
        Some(AveragedStatistics {
            start_time_ms: start.timestamp_ms,
            end_time_ms: end.timestamp_ms,
            packet_rate: counter_delta(end.packet_count, start.packet_count) / elapsed,
            byte_rate: counter_delta(end.byte_count, start.byte_count) / elapsed,
        })
    }

    /// Latest sample plus the windowed average, or `None` when there is
    /// no sample at all.
    pub fn summarize(&self, window_secs: u32) -> Option<FlowStatistics> {
        let current = self.latest()?;
        Some(FlowStatistics {
            current,
            average: self.average(window_secs),
        })
    }
}

/// Signed difference of two counters. Negative after a counter reset.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn counter_delta(end: u64, start: u64) -> f64 {
    end as f64 - start as f64
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn millis_to_secs(ms: u64) -> f64 {
    ms as f64 / 1000.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn sample(ts: i64, packets: u64) -> StatisticsSample {
        StatisticsSample::new(ts, packets * 100, packets)
    }

    fn boundary_history() -> SampleHistory {
        SampleHistory::from_samples(&[sample(0, 100), sample(5000, 150), sample(12_000, 400)])
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn floor_beats_farther_ceiling() {
        // Target start 7000: floor 5000 is 2000 away, ceiling 12000 is 5000 away.
        let avg = boundary_history().average(5).unwrap();
        assert_eq!(avg.start_time_ms, 5000);
        assert_eq!(avg.end_time_ms, 12_000);
        assert!(approx(avg.packet_rate, 250.0 / 7.0));
        assert!(approx(avg.byte_rate, 25_000.0 / 7.0));
    }

    #[test]
    fn ten_second_window_starts_at_the_nearer_floor() {
        // Target start 2000: floor 0 is 2000 away, ceiling 5000 is 3000 away.
        let avg = boundary_history().average(10).unwrap();
        assert_eq!(avg.start_time_ms, 0);
        assert!(approx(avg.packet_rate, 25.0));
    }

    #[test]
    fn ceiling_wins_when_nearer() {
        // Target start 4000: floor 0 is 4000 away, ceiling 5000 is 1000 away.
        let avg = boundary_history().average(8).unwrap();
        assert_eq!(avg.start_time_ms, 5000);
    }

    #[test]
    fn tie_keeps_the_floor() {
        let history =
            SampleHistory::from_samples(&[sample(0, 0), sample(2000, 10), sample(11_000, 100)]);
        // Target start 1000: floor 0 and ceiling 2000 are both 1000 away.
        let avg = history.average(10).unwrap();
        assert_eq!(avg.start_time_ms, 0);
    }

    #[test]
    fn window_wider_than_history_uses_the_oldest_sample() {
        let avg = boundary_history().average(3600).unwrap();
        assert_eq!(avg.start_time_ms, 0);
    }

    #[test]
    fn window_landing_on_the_latest_sample_is_degenerate() {
        // A zero window targets the end sample itself.
        let history = SampleHistory::from_samples(&[sample(5000, 1), sample(5500, 2)]);
        assert!(history.average(0).is_none());

        // Target start 8000: the end sample at 10000 is nearer than 0.
        let history = SampleHistory::from_samples(&[sample(0, 1), sample(10_000, 2)]);
        assert!(history.average(2).is_none());
    }

    #[test]
    fn single_sample_has_current_but_no_average() {
        let history = SampleHistory::from_samples(&[sample(1000, 5)]);
        let stats = history.summarize(10).unwrap();
        assert_eq!(stats.current, sample(1000, 5));
        assert!(stats.average.is_none());
    }

    #[test]
    fn empty_history_has_no_statistics() {
        assert!(SampleHistory::default().summarize(10).is_none());
    }

    #[test]
    fn duplicate_timestamps_keep_the_last_write() {
        let history = SampleHistory::from_samples(&[sample(1000, 5), sample(1000, 9)]);
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().unwrap().packet_count, 9);
    }

    #[test]
    fn extreme_timestamps_do_not_overflow() {
        // Target start i64::MAX - 1000: the floor at i64::MIN is more than
        // i64::MAX away, the end sample is the nearer ceiling.
        let history = SampleHistory::from_samples(&[sample(i64::MIN, 0), sample(i64::MAX, 20)]);
        assert!(history.average(1).is_none());

        let history = SampleHistory::from_samples(&[
            sample(i64::MIN, 0),
            sample(i64::MAX - 1000, 10),
            sample(i64::MAX, 20),
        ]);
        let avg = history.average(1).unwrap();
        assert_eq!(avg.start_time_ms, i64::MAX - 1000);
        assert!(approx(avg.packet_rate, 10.0));
    }

    #[test]
    fn counter_reset_yields_a_negative_rate() {
        let history = SampleHistory::from_samples(&[sample(0, 500), sample(10_000, 100)]);
        let avg = history.average(10).unwrap();
        assert!(approx(avg.packet_rate, -40.0));
    }
}
