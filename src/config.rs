//! Resource ceilings for both engines
//!
//! Every run is bounded so arbitrary input always terminates. The defaults
//! can be overridden field by field from JSON:
//!
//! ```
//! use jstrace::config::InterpreterLimits;
//!
//! let limits = InterpreterLimits::from_json(r#"{ "maxLoopIterations": 50 }"#).unwrap();
//! assert_eq!(limits.max_loop_iterations, 50);
//! assert_eq!(limits.max_call_depth, 100);
//! ```

use serde::{Deserialize, Serialize};

/// Default ceiling on recorded interpreter steps
pub const DEFAULT_MAX_STEPS: usize = 10_000;
/// Default ceiling on nested calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 100;
/// Default ceiling on iterations of a single loop
pub const DEFAULT_MAX_LOOP_ITERATIONS: usize = 1_000;
/// Default ceiling on the length of any array a script builds
pub const DEFAULT_MAX_ARRAY_LENGTH: usize = 10_000;
/// Default ceiling on the length of any string a script builds, in UTF-16 units
pub const DEFAULT_MAX_STRING_LENGTH: usize = 100_000;
/// Default ceiling on event-loop analyzer steps
pub const DEFAULT_ANALYZER_MAX_STEPS: usize = 500;
/// Default ceiling on queue-drain iterations
pub const DEFAULT_ANALYZER_MAX_ITERATIONS: usize = 50;

/// Limits for [`Interpreter`](crate::interpreter::Interpreter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InterpreterLimits {
    /// Steps in a trace, including the terminal error step
    pub max_steps: usize,
    pub max_call_depth: usize,
    pub max_loop_iterations: usize,
    pub max_array_length: usize,
    pub max_string_length: usize,
}

impl Default for InterpreterLimits {
    fn default() -> Self {
        InterpreterLimits {
            max_steps: DEFAULT_MAX_STEPS,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_loop_iterations: DEFAULT_MAX_LOOP_ITERATIONS,
            max_array_length: DEFAULT_MAX_ARRAY_LENGTH,
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
        }
    }
}

impl InterpreterLimits {
    /// Parse limits from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Limits for [`analyze_event_loop_with_limits`](crate::event_loop::analyze_event_loop_with_limits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzerLimits {
    pub max_steps: usize,
    /// Event-loop passes before the simulation is cut short
    pub max_iterations: usize,
}

impl Default for AnalyzerLimits {
    fn default() -> Self {
        AnalyzerLimits {
            max_steps: DEFAULT_ANALYZER_MAX_STEPS,
            max_iterations: DEFAULT_ANALYZER_MAX_ITERATIONS,
        }
    }
}

impl AnalyzerLimits {
    /// Parse limits from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let limits = InterpreterLimits::default();
        assert_eq!(limits.max_steps, 10_000);
        assert_eq!(limits.max_call_depth, 100);
        assert_eq!(limits.max_loop_iterations, 1_000);
        assert_eq!(limits.max_array_length, 10_000);
        assert_eq!(limits.max_string_length, 100_000);

        let analyzer = AnalyzerLimits::default();
        assert_eq!(analyzer.max_steps, 500);
        assert_eq!(analyzer.max_iterations, 50);
    }

    #[test]
    fn test_partial_override() {
        let limits = AnalyzerLimits::from_json(r#"{"maxSteps": 20}"#).unwrap();
        assert_eq!(limits.max_steps, 20);
        assert_eq!(limits.max_iterations, 50);
    }

    #[test]
    fn test_size_limits_from_json() {
        let limits =
            InterpreterLimits::from_json(r#"{"maxArrayLength": 5, "maxStringLength": 8}"#).unwrap();
        assert_eq!(limits.max_array_length, 5);
        assert_eq!(limits.max_string_length, 8);
        assert_eq!(limits.max_steps, 10_000);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(InterpreterLimits::from_json("{ maxSteps: }").is_err());
    }
}
