//! Adaptive request pacing.
//!
//! The feed delivers at most `num_art` articles per request. Polling too
//! often wastes requests on near-empty batches, polling too rarely lets the
//! backlog grow. The pacer keeps a smoothed estimate of the article rate and
//! derives both the interval and the batch size from it, so that batches
//! come back at a roughly constant size.
//!
//! When the previous batch was (nearly) full the client is "behind": it skips
//! the interval wait and does not update its estimate, since a full batch
//! says nothing about the real rate.

use std::time::{Duration, Instant};

use crate::config::SafefeedConfig;

/// Rate assumed before anything has been observed, in articles per second.
pub const DEFAULT_RATE: f64 = 40.0;

/// Polling interval used when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Batch size used when none is configured.
pub const DEFAULT_NUM_ART: u32 = 500;

/// Upper bound for the tuned interval, in seconds.
const MAX_INTERVAL_SECS: f64 = 900.0;

/// Lower bound for the tuned batch size.
const MIN_NUM_ART: f64 = 50.0;

/// Weight of the previous estimate in the moving average.
const SMOOTHING: f64 = 0.9;

/// Fraction of `num_art` above which a batch counts as full.
const BEHIND_THRESHOLD: f64 = 0.95;

/// Interval and batch-size planner.
#[derive(Debug, Clone)]
pub struct Pacer {
    interval_secs: f64,
    num_art: f64,
    expected_rate: Option<f64>,
    autoconfig: bool,
    last_num: u64,
    last_request: Option<Instant>,
}

impl Pacer {
    /// Create a pacer from the configured (or default) parameters.
    pub fn new(config: &SafefeedConfig) -> Self {
        Self {
            interval_secs: config.interval.unwrap_or(DEFAULT_INTERVAL).as_secs_f64(),
            num_art: f64::from(config.num_art.unwrap_or(DEFAULT_NUM_ART).max(1)),
            expected_rate: config.expected_rate,
            autoconfig: config.autoconfig(),
            last_num: 0,
            last_request: None,
        }
    }

    /// Whether the last batch was (nearly) full.
    pub fn is_behind(&self) -> bool {
        #[allow(clippy::cast_precision_loss)] // batch sizes are far below 2^52
        let last = self.last_num as f64;
        last > self.num_art * BEHIND_THRESHOLD
    }

    /// How long to wait before the next request may start.
    ///
    /// Returns `None` when the interval has already elapsed, when no request
    /// has been made yet, or when the client is behind.
    pub fn delay_before_next(&self, now: Instant) -> Option<Duration> {
        let previous = self.last_request?;
        if self.is_behind() {
            return None;
        }
        let target = previous + self.interval();
        target.checked_duration_since(now).filter(|d| !d.is_zero())
    }

    /// Record that a request starts at `now`.
    pub fn mark_request(&mut self, now: Instant) {
        self.last_request = Some(now);
    }

    /// Feed the outcome of a request into the estimate.
    ///
    /// `documents` is the number of articles in the batch, `server_rate`
    /// the feed's own rate estimate if it sent one.
    pub fn observe(&mut self, documents: u64, server_rate: Option<f64>) {
        self.last_num = documents;
        tracing::debug!(documents, "Got articles");

        if self.autoconfig && !self.is_behind() {
            let previous = self.expected_rate.unwrap_or(DEFAULT_RATE);
            let sample = self.sample_rate(documents, server_rate);
            let rate = SMOOTHING.mul_add(previous, (1.0 - SMOOTHING) * sample);
            self.apply_rate(rate);
        }

        if self.is_behind() {
            tracing::debug!("Is behind, cannot estimate rate or configure interval/num_art");
        } else {
            tracing::debug!(
                expected_rate = self.expected_rate.unwrap_or(0.0),
                interval = self.interval_secs,
                num_art = self.num_art,
                "Pacing parameters"
            );
        }
    }

    fn sample_rate(&self, documents: u64, server_rate: Option<f64>) -> f64 {
        if let Some(rate) = server_rate.filter(|r| *r != 0.0) {
            return rate;
        }
        if documents > 0 && self.interval_secs > 0.0 {
            #[allow(clippy::cast_precision_loss)]
            return documents as f64 / self.interval_secs;
        }
        self.expected_rate.unwrap_or(DEFAULT_RATE)
    }

    fn apply_rate(&mut self, rate: f64) {
        let root = rate.max(0.0).sqrt();
        self.expected_rate = Some(rate);
        self.interval_secs = (60.0 / root).min(MAX_INTERVAL_SECS);
        self.num_art = (120.0 * root).max(MIN_NUM_ART);
    }

    /// Current polling interval.
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval_secs).unwrap_or(DEFAULT_INTERVAL)
    }

    /// Articles to request in the next batch.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to u32 range
    pub fn batch_size(&self) -> u32 {
        self.num_art.ceil().clamp(1.0, f64::from(u32::MAX)) as u32
    }

    /// Current rate estimate, if any.
    pub const fn expected_rate(&self) -> Option<f64> {
        self.expected_rate
    }

    /// Number of articles in the last batch.
    pub const fn last_num(&self) -> u64 {
        self.last_num
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn auto() -> Pacer {
        Pacer::new(&SafefeedConfig::new("k"))
    }

    #[test]
    fn test_defaults() {
        let pacer = auto();
        assert_eq!(pacer.interval(), DEFAULT_INTERVAL);
        assert_eq!(pacer.batch_size(), DEFAULT_NUM_ART);
        assert_eq!(pacer.expected_rate(), None);
        assert!(!pacer.is_behind());
    }

    #[test]
    fn test_first_request_has_no_delay() {
        let pacer = auto();
        assert_eq!(pacer.delay_before_next(Instant::now()), None);
    }

    #[test]
    fn test_delay_respects_interval() {
        let mut pacer = Pacer::new(&SafefeedConfig::new("k").with_interval(Duration::from_secs(10)));
        let start = Instant::now();
        pacer.mark_request(start);

        let delay = pacer
            .delay_before_next(start + Duration::from_secs(4))
            .unwrap();
        assert_eq!(delay, Duration::from_secs(6));
        assert_eq!(pacer.delay_before_next(start + Duration::from_secs(10)), None);
        assert_eq!(pacer.delay_before_next(start + Duration::from_secs(30)), None);
    }

    #[test]
    fn test_behind_skips_delay() {
        let mut pacer = Pacer::new(&SafefeedConfig::new("k").with_num_art(100));
        let start = Instant::now();
        pacer.mark_request(start);
        pacer.observe(96, None);

        assert!(pacer.is_behind());
        assert_eq!(pacer.delay_before_next(start), None);
    }

    #[test]
    fn test_behind_threshold_is_strict() {
        let mut pacer = Pacer::new(&SafefeedConfig::new("k").with_num_art(100));
        pacer.observe(95, None);
        assert!(!pacer.is_behind());
        pacer.observe(96, None);
        assert!(pacer.is_behind());
    }

    #[test]
    fn test_empty_batches_keep_default_rate() {
        let mut pacer = auto();
        pacer.observe(0, None);

        let rate = pacer.expected_rate().unwrap();
        assert!(approx(rate, DEFAULT_RATE));
        assert!(approx(pacer.interval_secs, 60.0 / DEFAULT_RATE.sqrt()));
        assert!(approx(pacer.num_art, 120.0 * DEFAULT_RATE.sqrt()));
        assert_eq!(pacer.batch_size(), 759);
    }

    #[test]
    fn test_server_rate_is_blended() {
        let mut pacer = auto();
        pacer.observe(10, Some(140.0));
        // 0.9 * 40 + 0.1 * 140
        assert!(approx(pacer.expected_rate().unwrap(), 50.0));
    }

    #[test]
    fn test_zero_server_rate_falls_back_to_observed() {
        let mut pacer = auto();
        // 120 documents over the default 60s interval: 2/s
        pacer.observe(120, Some(0.0));
        assert!(approx(pacer.expected_rate().unwrap(), 0.9f64.mul_add(40.0, 0.2)));
    }

    #[test]
    fn test_interval_is_capped() {
        let mut pacer = auto();
        pacer.apply_rate(0.001);
        assert!(approx(pacer.interval_secs, MAX_INTERVAL_SECS));
        assert_eq!(pacer.interval(), Duration::from_secs(900));
    }

    #[test]
    fn test_num_art_is_floored() {
        let mut pacer = auto();
        pacer.apply_rate(0.01);
        assert_eq!(pacer.batch_size(), 50);
    }

    #[test]
    fn test_zero_rate_does_not_produce_infinite_interval() {
        let mut pacer = auto();
        pacer.apply_rate(0.0);
        assert_eq!(pacer.interval(), Duration::from_secs(900));
        assert_eq!(pacer.batch_size(), 50);
    }

    #[test]
    fn test_pinned_parameters_never_change() {
        let mut pacer = Pacer::new(
            &SafefeedConfig::new("k")
                .with_interval(Duration::from_secs(5))
                .with_num_art(200),
        );
        pacer.observe(10, Some(300.0));
        assert_eq!(pacer.interval(), Duration::from_secs(5));
        assert_eq!(pacer.batch_size(), 200);
        assert_eq!(pacer.expected_rate(), None);
    }

    #[test]
    fn test_zero_batch_size_is_raised_to_one() {
        let mut pacer = Pacer::new(&SafefeedConfig::new("k").with_num_art(0));
        assert_eq!(pacer.batch_size(), 1);

        pacer.observe(0, None);
        assert!(!pacer.is_behind());
        pacer.observe(1, None);
        assert!(pacer.is_behind());
    }

    #[test]
    fn test_behind_freezes_estimate() {
        let mut pacer = auto();
        pacer.observe(0, None);
        let before = pacer.clone();

        pacer.observe(u64::from(pacer.batch_size()), Some(1000.0));
        assert!(pacer.is_behind());
        assert_eq!(pacer.expected_rate(), before.expected_rate());
        assert_eq!(pacer.batch_size(), before.batch_size());
    }
}
