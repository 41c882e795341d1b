//! Program registry (C3): the process-wide catalog of algorithm classes
//! and stateless functions, each entry carrying documentation metadata
//! so a downstream UI can list what's available without parsing source.
//!
//! Built once, explicitly, at engine-construction time rather than kept
//! as ambient global state — see the design notes on testability and
//! deterministic init order.

use std::collections::HashMap;

use crate::algorithms::{
    cylindrical_tank::CylindricalTank, list_wave::ListWave, pid::Pid, random_walk::RandomWalk,
    sine_wave::SineWave, square_wave::SquareWave, triangle_wave::TriangleWave, valve::Valve,
    AlgorithmFactory,
};
use crate::expr::error::ExprErrorKind;

/// Documentation metadata every catalog entry must populate.
#[derive(Debug, Clone)]
pub struct CatalogDoc {
    pub english_name: &'static str,
    pub chinese_name: &'static str,
    pub doc_markdown: &'static str,
    pub params_table_markdown: &'static str,
}

pub struct AlgorithmEntry {
    pub doc: CatalogDoc,
    pub factory: AlgorithmFactory,
}

/// A pure stateless function: scalars in, one scalar out, no side effects.
pub type StatelessFn = fn(&[f64]) -> Result<f64, ExprErrorKind>;

pub struct FunctionEntry {
    pub doc: CatalogDoc,
    pub func: StatelessFn,
}

/// The program's type and function catalog. Threaded explicitly through
/// configuration loading and evaluation rather than accessed as a global.
pub struct Registry {
    algorithms: HashMap<&'static str, AlgorithmEntry>,
    functions: HashMap<&'static str, FunctionEntry>,
}

impl Registry {
    pub fn algorithm(&self, type_name: &str) -> Option<&AlgorithmEntry> {
        self.algorithms.get(type_name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionEntry> {
        self.functions.get(name)
    }

    pub fn algorithm_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.algorithms.keys().copied()
    }

    pub fn function_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }
}

impl Default for Registry {
    fn default() -> Self {
        let mut algorithms = HashMap::new();
        algorithms.insert(
            "SINE_WAVE",
            AlgorithmEntry {
                doc: CatalogDoc {
                    english_name: "Sine wave",
                    chinese_name: "正弦波",
                    doc_markdown: "`out = amplitude * sin(2*pi*cycle_count*cycle_time/period + phase)`",
                    params_table_markdown: "| param | meaning |\n|---|---|\n| amplitude | peak magnitude |\n| period | seconds per cycle |\n| phase | radians offset |",
                },
                factory: SineWave::new,
            },
        );
        algorithms.insert(
            "SQUARE_WAVE",
            AlgorithmEntry {
                doc: CatalogDoc {
                    english_name: "Square wave",
                    chinese_name: "方波",
                    doc_markdown: "`out = amplitude * sign(sin(phase_angle))`",
                    params_table_markdown: "| param | meaning |\n|---|---|\n| amplitude | peak magnitude |\n| period | seconds per cycle |\n| phase | radians offset |",
                },
                factory: SquareWave::new,
            },
        );
        algorithms.insert(
            "TRIANGLE_WAVE",
            AlgorithmEntry {
                doc: CatalogDoc {
                    english_name: "Triangle wave",
                    chinese_name: "三角波",
                    doc_markdown: "`out = amplitude * (2/pi) * asin(sin(phase_angle))`",
                    params_table_markdown: "| param | meaning |\n|---|---|\n| amplitude | peak magnitude |\n| period | seconds per cycle |\n| phase | radians offset |",
                },
                factory: TriangleWave::new,
            },
        );
        algorithms.insert(
            "LIST_WAVE",
            AlgorithmEntry {
                doc: CatalogDoc {
                    english_name: "List wave",
                    chinese_name: "列表波",
                    doc_markdown: "Emits each `(value, duration_seconds)` pair in `wave_list` for `duration/cycle_time` cycles, then advances; wraps indefinitely.",
                    params_table_markdown: "| param | meaning |\n|---|---|\n| wave_list | list of (value, duration_seconds) pairs |",
                },
                factory: ListWave::new,
            },
        );
        algorithms.insert(
            "RANDOM",
            AlgorithmEntry {
                doc: CatalogDoc {
                    english_name: "Random walk",
                    chinese_name: "随机游走",
                    doc_markdown: "Bounded random walk in `[L, H]`, step drawn uniformly from `[-max_step, max_step]`.",
                    params_table_markdown: "| param | meaning |\n|---|---|\n| L | lower bound |\n| H | upper bound |\n| max_step | max per-cycle step |\n| seed | PRNG seed (default 42) |",
                },
                factory: RandomWalk::new,
            },
        );
        algorithms.insert(
            "PID",
            AlgorithmEntry {
                doc: CatalogDoc {
                    english_name: "PID controller",
                    chinese_name: "PID控制器",
                    doc_markdown: "Proportional-band PID with backward-Euler integration and back-calculation anti-windup.",
                    params_table_markdown: "| param | meaning |\n|---|---|\n| pb | proportional band (percent) |\n| ti | integral time (s) |\n| td | derivative time (s) |\n| out_min | output clamp low |\n| out_max | output clamp high |",
                },
                factory: Pid::new,
            },
        );
        algorithms.insert(
            "CYLINDRICAL_TANK",
            AlgorithmEntry {
                doc: CatalogDoc {
                    english_name: "Cylindrical tank",
                    chinese_name: "圆柱形水箱",
                    doc_markdown: "Integrates flow in minus flow out over `cycle_time`, clamped to the tank's physical volume.",
                    params_table_markdown: "| param | meaning |\n|---|---|\n| height | tank height |\n| radius | tank radius |",
                },
                factory: CylindricalTank::new,
            },
        );
        algorithms.insert(
            "VALVE",
            AlgorithmEntry {
                doc: CatalogDoc {
                    english_name: "Valve",
                    chinese_name: "阀门",
                    doc_markdown: "Slews `current_opening` toward `target_opening`, quantized to `step`, clipped to `[min_opening, max_opening]`.",
                    params_table_markdown: "| param | meaning |\n|---|---|\n| min_opening | lower bound |\n| max_opening | upper bound |\n| step | quantization |\n| full_travel_time | seconds for a full-range slew |",
                },
                factory: Valve::new,
            },
        );

        let mut functions = HashMap::new();
        functions.insert(
            "abs",
            FunctionEntry {
                doc: unary_doc("Absolute value", "绝对值"),
                func: |a| unary(a, f64::abs),
            },
        );
        functions.insert(
            "sqrt",
            FunctionEntry {
                doc: unary_doc("Square root", "平方根"),
                func: |a| unary(a, f64::sqrt),
            },
        );
        functions.insert(
            "sin",
            FunctionEntry {
                doc: unary_doc("Sine", "正弦"),
                func: |a| unary(a, f64::sin),
            },
        );
        functions.insert(
            "cos",
            FunctionEntry {
                doc: unary_doc("Cosine", "余弦"),
                func: |a| unary(a, f64::cos),
            },
        );
        functions.insert(
            "floor",
            FunctionEntry {
                doc: unary_doc("Floor", "向下取整"),
                func: |a| unary(a, f64::floor),
            },
        );
        functions.insert(
            "ceil",
            FunctionEntry {
                doc: unary_doc("Ceiling", "向上取整"),
                func: |a| unary(a, f64::ceil),
            },
        );
        functions.insert(
            "round",
            FunctionEntry {
                doc: unary_doc("Round to nearest", "四舍五入"),
                func: |a| unary(a, f64::round),
            },
        );
        functions.insert(
            "min",
            FunctionEntry {
                doc: CatalogDoc {
                    english_name: "Minimum",
                    chinese_name: "最小值",
                    doc_markdown: "`min(a, b)`: the lesser of two scalars.",
                    params_table_markdown: "| param | meaning |\n|---|---|\n| a, b | operands |",
                },
                func: |a| binary(a, f64::min),
            },
        );
        functions.insert(
            "max",
            FunctionEntry {
                doc: CatalogDoc {
                    english_name: "Maximum",
                    chinese_name: "最大值",
                    doc_markdown: "`max(a, b)`: the greater of two scalars.",
                    params_table_markdown: "| param | meaning |\n|---|---|\n| a, b | operands |",
                },
                func: |a| binary(a, f64::max),
            },
        );
        functions.insert(
            "clamp",
            FunctionEntry {
                doc: CatalogDoc {
                    english_name: "Clamp",
                    chinese_name: "限幅",
                    doc_markdown: "`clamp(x, lo, hi)`: `x` restricted to `[lo, hi]`.",
                    params_table_markdown: "| param | meaning |\n|---|---|\n| x | value |\n| lo | lower bound |\n| hi | upper bound |",
                },
                func: |a| {
                    if a.len() != 3 {
                        return Err(ExprErrorKind::Type(format!(
                            "clamp expects 3 arguments, got {}",
                            a.len()
                        )));
                    }
                    Ok(a[0].clamp(a[1], a[2]))
                },
            },
        );

        Self {
            algorithms,
            functions,
        }
    }
}

fn unary_doc(english: &'static str, chinese: &'static str) -> CatalogDoc {
    CatalogDoc {
        english_name: english,
        chinese_name: chinese,
        doc_markdown: "Single-argument stateless scalar function.",
        params_table_markdown: "| param | meaning |\n|---|---|\n| a | operand |",
    }
}

fn unary(args: &[f64], f: fn(f64) -> f64) -> Result<f64, ExprErrorKind> {
    match args {
        [a] => Ok(f(*a)),
        other => Err(ExprErrorKind::Type(format!(
            "expected 1 argument, got {}",
            other.len()
        ))),
    }
}

fn binary(args: &[f64], f: fn(f64, f64) -> f64) -> Result<f64, ExprErrorKind> {
    match args {
        [a, b] => Ok(f(*a, *b)),
        other => Err(ExprErrorKind::Type(format!(
            "expected 2 arguments, got {}",
            other.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_algorithm_entry_has_complete_documentation() {
        let registry = Registry::default();
        for name in registry.algorithm_types() {
            let entry = registry.algorithm(name).unwrap();
            assert!(!entry.doc.english_name.is_empty());
            assert!(!entry.doc.chinese_name.is_empty());
            assert!(!entry.doc.doc_markdown.is_empty());
            assert!(!entry.doc.params_table_markdown.is_empty());
        }
    }

    #[test]
    fn clamp_rejects_wrong_arity() {
        let registry = Registry::default();
        let clamp = registry.function("clamp").unwrap();
        assert!((clamp.func)(&[1.0, 2.0]).is_err());
        assert_eq!((clamp.func)(&[5.0, 0.0, 1.0]).unwrap(), 1.0);
    }
}
