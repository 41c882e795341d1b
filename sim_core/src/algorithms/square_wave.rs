//! `SQUARE_WAVE(amplitude, period, phase)` — a bipolar square wave.

use std::collections::HashMap;
use std::f64::consts::TAU;

use super::{Algorithm, InitArgs, param};

const DEFAULTS: &[(&str, f64)] = &[("amplitude", 1.0), ("period", 1.0), ("phase", 0.0)];

#[derive(Debug)]
pub struct SquareWave {
    amplitude: f64,
    period: f64,
    phase: f64,
    cycle_time: f64,
    cycle_count: u64,
    out: f64,
}

impl SquareWave {
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

impl Algorithm for SquareWave {
    fn stored_attributes(&self) -> &'static [&'static str] {
        &["out"]
    }

    fn execute(&mut self, _kwargs: &HashMap<String, f64>) {
        self.cycle_count += 1;
        let t = self.cycle_count as f64 * self.cycle_time;
        let phase_angle = TAU * t / self.period + self.phase;
        self.out = self.amplitude * phase_angle.sin().signum();
    }

    fn attribute(&self, name: &str) -> Option<f64> {
        match name {
            "out" => Some(self.out),
            _ => None,
        }
    }
}
