//! Checker configuration.

use std::env;

/// Environment variable that turns on checker tracing.
pub const TRACE_ENV: &str = "GOLITE_TRACE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Emit `expr[ .. ]`/`stmt[ .. ]` trace events while checking.
    pub trace: bool,
    /// Report local variables that are declared and never used.
    pub report_unused: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            trace: false,
            report_unused: true,
        }
    }
}

impl Config {
    /// The default configuration with tracing taken from `GOLITE_TRACE`.
    pub fn from_env() -> Config {
        Config {
            trace: env::var(TRACE_ENV).map_or(false, |v| trace_enabled(&v)),
            ..Config::default()
        }
    }

    pub fn with_trace(mut self, trace: bool) -> Config {
        self.trace = trace;
        self
    }

    pub fn with_report_unused(mut self, report: bool) -> Config {
        self.report_unused = report;
        self
    }
}

fn trace_enabled(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != "0"
}
