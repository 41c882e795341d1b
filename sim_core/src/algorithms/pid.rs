//! `PID(pb, ti, td, out_min, out_max)` — a proportional-band PID
//! controller with backward-Euler integration and back-calculation
//! anti-windup.
//!
//! Proportional band `pb` (percent of span for 100% output swing) is
//! converted to a proportional gain `kp = 100 / pb`; `ti`/`td` are
//! integral/derivative time constants in seconds, matching the cycle
//! time unit `dt` is expressed in.

use std::collections::HashMap;

use super::{Algorithm, InitArgs, param};

const DEFAULTS: &[(&str, f64)] = &[
    ("pb", 100.0),
    ("ti", 0.0),
    ("td", 0.0),
    ("out_min", 0.0),
    ("out_max", 100.0),
];

#[derive(Debug)]
pub struct Pid {
    kp: f64,
    ki: f64,
    kd: f64,
    out_min: f64,
    out_max: f64,
    cycle_time: f64,

    integral: f64,
    prev_error: f64,

    mv: f64,
    pv: f64,
    sv: f64,
    error: f64,
}

impl Pid {
    pub fn new(cycle_time: f64, init_args: &InitArgs) -> Box<dyn Algorithm> {
        let pb = param(init_args, DEFAULTS, "pb");
        let ti = param(init_args, DEFAULTS, "ti");
        let td = param(init_args, DEFAULTS, "td");
        let kp = if pb != 0.0 { 100.0 / pb } else { 0.0 };
        let ki = if ti > 0.0 { kp / ti } else { 0.0 };
        let kd = kp * td;
        Box::new(Self {
            kp,
            ki,
            kd,
            out_min: param(init_args, DEFAULTS, "out_min"),
            out_max: param(init_args, DEFAULTS, "out_max"),
            cycle_time,
            integral: 0.0,
            prev_error: 0.0,
            mv: 0.0,
            pv: 0.0,
            sv: 0.0,
            error: 0.0,
        })
    }
}

impl Algorithm for Pid {
    fn stored_attributes(&self) -> &'static [&'static str] {
        &["MV", "PV", "SV", "error"]
    }

    fn execute(&mut self, kwargs: &HashMap<String, f64>) {
        let dt = self.cycle_time;
        if let Some(pv) = kwargs.get("PV") {
            self.pv = *pv;
        }
        if let Some(sv) = kwargs.get("SV") {
            self.sv = *sv;
        }
        self.error = self.sv - self.pv;

        let p_term = self.kp * self.error;

        let i_term = if self.ki != 0.0 && dt > 0.0 {
            self.integral += self.ki * self.error * dt;
            self.integral
        } else {
            0.0
        };

        let d_term = if self.kd != 0.0 && dt > 0.0 {
            self.kd * (self.error - self.prev_error) / dt
        } else {
            0.0
        };
        self.prev_error = self.error;

        let raw = p_term + i_term + d_term;
        let clamped = raw.clamp(self.out_min, self.out_max);
        // Back-calculation anti-windup: undo the integral contribution
        // that pushed the output past its clamped range.
        if self.ki != 0.0 && raw != clamped {
            self.integral -= raw - clamped;
        }
        self.mv = clamped;
    }

    fn attribute(&self, name: &str) -> Option<f64> {
        match name {
            "MV" => Some(self.mv),
            "PV" => Some(self.pv),
            "SV" => Some(self.sv),
            "error" => Some(self.error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pb: f64, ti: f64, td: f64) -> InitArgs {
        let mut a = InitArgs::new();
        a.insert("pb".into(), pb.into());
        a.insert("ti".into(), ti.into());
        a.insert("td".into(), td.into());
        a
    }

    #[test]
    fn pure_proportional_tracks_error() {
        let mut p = Pid::new(0.1, &args(50.0, 0.0, 0.0));
        let mut kwargs = HashMap::new();
        kwargs.insert("PV".to_string(), 0.0);
        kwargs.insert("SV".to_string(), 10.0);
        p.execute(&kwargs);
        // kp = 100/50 = 2.0, error = 10 -> MV = 20, clamped to out_max=100
        assert_eq!(p.attribute("error").unwrap(), 10.0);
        assert_eq!(p.attribute("MV").unwrap(), 20.0);
    }

    #[test]
    fn zero_error_produces_zero_output() {
        let mut p = Pid::new(0.1, &args(50.0, 10.0, 1.0));
        let mut kwargs = HashMap::new();
        kwargs.insert("PV".to_string(), 5.0);
        kwargs.insert("SV".to_string(), 5.0);
        p.execute(&kwargs);
        assert_eq!(p.attribute("MV").unwrap(), 0.0);
    }

    #[test]
    fn output_respects_clamp() {
        let mut p = Pid::new(0.1, &args(1.0, 0.0, 0.0));
        let mut kwargs = HashMap::new();
        kwargs.insert("PV".to_string(), 0.0);
        kwargs.insert("SV".to_string(), 1000.0);
        p.execute(&kwargs);
        assert_eq!(p.attribute("MV").unwrap(), 100.0);
    }
}
