//! Clock (C9): cycle counter, simulated time, sampling decimation, and
//! realtime pacing with an overrun warning.

use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Execution time exceeding this fraction of `cycle_time` triggers the
/// advisory overrun warning. The 60% figure is the one named by the
/// canonical suite's realtime scenario.
const EXECUTION_TIME_WARNING_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClockMode {
    Realtime,
    Generator,
}

/// Result of one `tick()`: everything the engine needs to assemble a
/// snapshot's reserved keys.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    pub cycle_count: u64,
    pub sim_time: f64,
    pub need_sample: bool,
}

#[derive(Debug)]
pub struct Clock {
    cycle_count: u64,
    start_time_epoch: f64,
    cycle_time: f64,
    mode: ClockMode,
    sample_interval: Option<f64>,
    time_format: Option<String>,
    current_cycle_start_wallclock: Option<Instant>,
}

impl Clock {
    pub fn new(
        cycle_time: f64,
        mode: ClockMode,
        sample_interval: Option<f64>,
        time_format: Option<String>,
        start_time_epoch: f64,
    ) -> Self {
        Self {
            cycle_count: 0,
            start_time_epoch,
            cycle_time,
            mode,
            sample_interval,
            time_format,
            current_cycle_start_wallclock: None,
        }
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ClockMode) {
        self.mode = mode;
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Advance by one cycle, returning the reserved snapshot fields and
    /// a human-readable time string formatted per `time_format` (or
    /// ISO-8601 if absent).
    pub fn tick(&mut self) -> (Tick, String) {
        // need_sample is evaluated against the cycle-start time (before
        // incrementing cycle_count), so the very first cycle — whose
        // cycle-start coincides with start_time — is always a sample
        // boundary, matching a strictly periodic decimation grid.
        let cycle_start_sim = self.cycle_count as f64 * self.cycle_time;
        let need_sample = match self.sample_interval {
            None => true,
            Some(si) if si <= 0.0 => true,
            Some(si) => cycle_start_sim.rem_euclid(si) < self.cycle_time / 2.0,
        };

        self.cycle_count += 1;
        self.current_cycle_start_wallclock = Some(Instant::now());

        let sim_time = self.start_time_epoch + self.cycle_count as f64 * self.cycle_time;
        let time_string = format_sim_time(sim_time, self.time_format.as_deref());

        (
            Tick {
                cycle_count: self.cycle_count,
                sim_time,
                need_sample,
            },
            time_string,
        )
    }

    /// In Realtime mode, sleep out the remainder of `cycle_time` not
    /// already spent evaluating this cycle's nodes. A no-op outside
    /// Realtime. Logs, never returns an error: per the error design,
    /// overrun is advisory and the engine never drops a cycle for it.
    pub fn sleep_remaining(&self) {
        if self.mode != ClockMode::Realtime {
            return;
        }
        let Some(start) = self.current_cycle_start_wallclock else {
            return;
        };
        let elapsed = start.elapsed();
        let cycle_time = Duration::from_secs_f64(self.cycle_time.max(0.0));
        let warning_threshold = cycle_time.mul_f64(EXECUTION_TIME_WARNING_THRESHOLD);

        if elapsed > warning_threshold {
            warn!(
                cycle_count = self.cycle_count,
                elapsed_secs = elapsed.as_secs_f64(),
                cycle_time_secs = self.cycle_time,
                "execution exceeded 60% of cycle"
            );
        }
        if elapsed >= cycle_time {
            warn!(
                cycle_count = self.cycle_count,
                elapsed_secs = elapsed.as_secs_f64(),
                "no remaining budget for cycle"
            );
            return;
        }
        thread::sleep(cycle_time - elapsed);
    }

    pub fn reset(&mut self, cycle_count: u64) {
        self.cycle_count = cycle_count;
        self.current_cycle_start_wallclock = None;
    }
}

fn format_sim_time(sim_time: f64, time_format: Option<&str>) -> String {
    let dt: DateTime<Utc> = Utc
        .timestamp_opt(sim_time.trunc() as i64, ((sim_time.fract()) * 1e9) as u32)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).single().unwrap());
    match time_format {
        Some(fmt) => dt.format(fmt).to_string(),
        None => dt.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_time_increments_by_cycle_time_matching_s5() {
        let mut clock = Clock::new(0.5, ClockMode::Generator, Some(2.0), None, 0.0);
        let mut samples = Vec::new();
        for _ in 0..8 {
            let (tick, _) = clock.tick();
            samples.push((tick.cycle_count, tick.need_sample));
        }
        assert!((clock.cycle_count() as f64 * 0.5 - 4.0).abs() < 1e-9);
        let sampled: Vec<u64> = samples
            .iter()
            .filter(|(_, need)| *need)
            .map(|(c, _)| *c)
            .collect();
        assert_eq!(sampled, vec![1, 5]);
    }

    #[test]
    fn no_sample_interval_samples_every_cycle() {
        let mut clock = Clock::new(1.0, ClockMode::Generator, None, None, 0.0);
        for _ in 0..3 {
            let (tick, _) = clock.tick();
            assert!(tick.need_sample);
        }
    }

    #[test]
    fn reset_restores_cycle_count() {
        let mut clock = Clock::new(1.0, ClockMode::Generator, None, None, 0.0);
        clock.tick();
        clock.tick();
        clock.reset(0);
        assert_eq!(clock.cycle_count(), 0);
    }
}
