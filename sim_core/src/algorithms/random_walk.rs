//! `RANDOM(L, H, max_step, seed)` — a bounded random walk.
//!
//! Starts at the midpoint of `[L, H]` and steps by a value drawn uniformly
//! from `[-max_step, max_step]` each cycle, clamped back into `[L, H]`.
//! `seed` (default 42) seeds a dedicated PRNG so that Generator-mode runs
//! with identical configuration reproduce identical sequences, per the
//! clock-invariant property.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Algorithm, InitArgs, param};

const DEFAULTS: &[(&str, f64)] = &[("L", 0.0), ("H", 1.0), ("max_step", 0.1), ("seed", 42.0)];

#[derive(Debug)]
pub struct RandomWalk {
    l: f64,
    h: f64,
    max_step: f64,
    current: f64,
    rng: StdRng,
}

impl RandomWalk {
    pub fn new(_cycle_time: f64, init_args: &InitArgs) -> Box<dyn Algorithm> {
        let l = param(init_args, DEFAULTS, "L");
        let h = param(init_args, DEFAULTS, "H");
        let max_step = param(init_args, DEFAULTS, "max_step");
        let seed = param(init_args, DEFAULTS, "seed") as u64;
        Box::new(Self {
            l,
            h,
            max_step,
            current: (l + h) / 2.0,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl Algorithm for RandomWalk {
    fn stored_attributes(&self) -> &'static [&'static str] {
        &["out"]
    }

    fn execute(&mut self, _kwargs: &HashMap<String, f64>) {
        let step = if self.max_step > 0.0 {
            self.rng.gen_range(-self.max_step..=self.max_step)
        } else {
            0.0
        };
        self.current = (self.current + step).clamp(self.l, self.h);
    }

    fn attribute(&self, name: &str) -> Option<f64> {
        match name {
            "out" => Some(self.current),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_max_step_holds_midpoint() {
        let mut args = InitArgs::new();
        args.insert("L".into(), 0.0.into());
        args.insert("H".into(), 100.0.into());
        args.insert("max_step".into(), 0.0.into());
        let mut r = RandomWalk::new(1.0, &args);
        for _ in 0..5 {
            r.execute(&HashMap::new());
        }
        assert_eq!(r.attribute("out").unwrap(), 50.0);
    }

    #[test]
    fn stays_within_bounds() {
        let mut args = InitArgs::new();
        args.insert("L".into(), -1.0.into());
        args.insert("H".into(), 1.0.into());
        args.insert("max_step".into(), 0.5.into());
        let mut r = RandomWalk::new(1.0, &args);
        for _ in 0..1000 {
            r.execute(&HashMap::new());
            let v = r.attribute("out").unwrap();
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut args = InitArgs::new();
        args.insert("L".into(), 0.0.into());
        args.insert("H".into(), 100.0.into());
        args.insert("max_step".into(), 5.0.into());
        args.insert("seed".into(), 7.0.into());
        let mut a = RandomWalk::new(1.0, &args);
        let mut b = RandomWalk::new(1.0, &args);
        for _ in 0..20 {
            a.execute(&HashMap::new());
            b.execute(&HashMap::new());
            assert_eq!(a.attribute("out"), b.attribute("out"));
        }
    }
}
