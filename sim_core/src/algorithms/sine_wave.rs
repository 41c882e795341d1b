//! `SINE_WAVE(amplitude, period, phase)` — a sinusoid sampled once per
//! cycle.

use std::collections::HashMap;
use std::f64::consts::TAU;

use super::{Algorithm, InitArgs, param};

const DEFAULTS: &[(&str, f64)] = &[("amplitude", 1.0), ("period", 1.0), ("phase", 0.0)];

#[derive(Debug)]
pub struct SineWave {
    amplitude: f64,
    period: f64,
    phase: f64,
    cycle_time: f64,
    cycle_count: u64,
    out: f64,
}

impl SineWave {
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

impl Algorithm for SineWave {
    fn stored_attributes(&self) -> &'static [&'static str] {
        &["out"]
    }

    fn execute(&mut self, _kwargs: &HashMap<String, f64>) {
        self.cycle_count += 1;
        let t = self.cycle_count as f64 * self.cycle_time;
        self.out = self.amplitude * (TAU * t / self.period + self.phase).sin();
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
    fn matches_s2_first_cycle() {
        let mut args = InitArgs::new();
        args.insert("amplitude".into(), 1.0.into());
        args.insert("period".into(), 4.0.into());
        args.insert("phase".into(), 0.0.into());
        let mut s = SineWave::new(1.0, &args);
        s.execute(&HashMap::new());
        assert!((s.attribute("out").unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn defaults_apply_when_unset() {
        let mut s = SineWave::new(1.0, &InitArgs::new());
        s.execute(&HashMap::new());
        let expected = (TAU * 1.0).sin();
        assert!((s.attribute("out").unwrap() - expected).abs() < 1e-9);
    }
}
