//! `VALVE(min_opening, max_opening, step, full_travel_time)` — slews
//! `current_opening` toward `target_opening` at a rate bounded by
//! `max_opening * cycle_time / full_travel_time`, quantized to `step`,
//! clipped to `[min_opening, max_opening]`.

use std::collections::HashMap;

use super::{Algorithm, InitArgs, param};

const DEFAULTS: &[(&str, f64)] = &[
    ("min_opening", 0.0),
    ("max_opening", 100.0),
    ("step", 1.0),
    ("full_travel_time", 10.0),
];

#[derive(Debug)]
pub struct Valve {
    min_opening: f64,
    max_opening: f64,
    step: f64,
    max_delta_per_cycle: f64,

    current_opening: f64,
    target_opening: f64,
}

impl Valve {
    pub fn new(cycle_time: f64, init_args: &InitArgs) -> Box<dyn Algorithm> {
        let min_opening = param(init_args, DEFAULTS, "min_opening");
        let max_opening = param(init_args, DEFAULTS, "max_opening");
        let step = param(init_args, DEFAULTS, "step");
        let full_travel_time = param(init_args, DEFAULTS, "full_travel_time");
        let max_delta_per_cycle = if full_travel_time > 0.0 {
            max_opening * cycle_time / full_travel_time
        } else {
            max_opening
        };
        Box::new(Self {
            min_opening,
            max_opening,
            step,
            max_delta_per_cycle,
            current_opening: min_opening,
            target_opening: min_opening,
        })
    }
}

impl Algorithm for Valve {
    fn stored_attributes(&self) -> &'static [&'static str] {
        &["current_opening", "target_opening"]
    }

    fn execute(&mut self, kwargs: &HashMap<String, f64>) {
        if let Some(target) = kwargs.get("target_opening") {
            self.target_opening = *target;
        }
        let delta = (self.target_opening - self.current_opening)
            .clamp(-self.max_delta_per_cycle, self.max_delta_per_cycle);
        let mut opening = self.current_opening + delta;
        if self.step > 0.0 {
            opening = (opening / self.step).round() * self.step;
        }
        self.current_opening = opening.clamp(self.min_opening, self.max_opening);
    }

    fn attribute(&self, name: &str) -> Option<f64> {
        match name {
            "current_opening" => Some(self.current_opening),
            "target_opening" => Some(self.target_opening),
            _ => None,
        }
    }
}
