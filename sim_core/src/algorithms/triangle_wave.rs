//! `TRIANGLE_WAVE(amplitude, period, phase)` — a linear ramp up/down wave.

use std::collections::HashMap;
use std::f64::consts::{FRAC_2_PI, TAU};

use super::{Algorithm, InitArgs, param};

const DEFAULTS: &[(&str, f64)] = &[("amplitude", 1.0), ("period", 1.0), ("phase", 0.0)];

#[derive(Debug)]
pub struct TriangleWave {
    amplitude: f64,
    period: f64,
    phase: f64,
    cycle_time: f64,
    cycle_count: u64,
    out: f64,
}

impl TriangleWave {
    pub fn new(cycle_time: f64, init_args: &InitArgs) -> Box<dyn Algorithm> {
        Box::new(Self {
            amplitude: param(init_args, DEFAULTS, "amplitude"),
            period: param(init_args, DEFAULTS, "period"),
            phase: param(init_args, DEFAULTS, "phase"),
            cycle_time,
            cycle_count: 0,
            out: 0.0,
        })
    }
}

impl Algorithm for TriangleWave {
    fn stored_attributes(&self) -> &'static [&'static str] {
        &["out"]
    }

    fn execute(&mut self, _kwargs: &HashMap<String, f64>) {
        self.cycle_count += 1;
        let t = self.cycle_count as f64 * self.cycle_time;
        let phase_angle = TAU * t / self.period + self.phase;
        // Standard triangle derived from asin(sin(x)): linear ramp with
        // the same period and zero-crossings as the sine it is built from.
        self.out = self.amplitude * FRAC_2_PI * phase_angle.sin().asin();
    }

    fn attribute(&self, name: &str) -> Option<f64> {
        match name {
            "out" => Some(self.out),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peaks_at_quarter_period() {
        let mut args = InitArgs::new();
        args.insert("amplitude".into(), 1.0.into());
        args.insert("period".into(), 4.0.into());
        args.insert("phase".into(), 0.0.into());
        let mut s = TriangleWave::new(1.0, &args);
        s.execute(&HashMap::new());
        assert!((s.attribute("out").unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_at_start_of_period() {
        let mut args = InitArgs::new();
        args.insert("period".into(), 4.0.into());
        let mut s = TriangleWave::new(4.0, &args);
        s.execute(&HashMap::new());
        assert!(s.attribute("out").unwrap().abs() < 1e-9);
    }
}
