//! `LIST_WAVE(wave_list=[(v, duration_seconds), ...])` — emits `v` for
//! `duration_seconds / cycle_time` cycles, then advances to the next
//! entry; wraps to the start indefinitely.

use std::collections::HashMap;

use super::{Algorithm, InitArgs, param_pairs};

#[derive(Debug)]
pub struct ListWave {
    /// (value, cycles-to-hold) per segment; duration converted to a cycle
    /// count once at construction.
    segments: Vec<(f64, u64)>,
    index: usize,
    cycles_in_segment: u64,
    out: f64,
}

impl ListWave {
    pub fn new(cycle_time: f64, init_args: &InitArgs) -> Box<dyn Algorithm> {
        let pairs = param_pairs(init_args, "wave_list");
        let segments: Vec<(f64, u64)> = pairs
            .into_iter()
            .map(|(v, duration)| {
                let cycles = if cycle_time > 0.0 {
                    (duration / cycle_time).round().max(1.0) as u64
                } else {
                    1
                };
                (v, cycles)
            })
            .collect();
        let out = segments.first().map(|(v, _)| *v).unwrap_or(0.0);
        Box::new(Self {
            segments,
            index: 0,
            cycles_in_segment: 0,
            out,
        })
    }
}

impl Algorithm for ListWave {
    fn stored_attributes(&self) -> &'static [&'static str] {
        &["out"]
    }

    fn execute(&mut self, _kwargs: &HashMap<String, f64>) {
        if self.segments.is_empty() {
            self.out = 0.0;
            return;
        }
        self.cycles_in_segment += 1;
        let (_, hold) = self.segments[self.index];
        if self.cycles_in_segment > hold {
            self.index = (self.index + 1) % self.segments.len();
            self.cycles_in_segment = 1;
        }
        self.out = self.segments[self.index].0;
    }

    fn attribute(&self, name: &str) -> Option<f64> {
        match name {
            "out" => Some(self.out),
            _ => None,
        }
    }
}
