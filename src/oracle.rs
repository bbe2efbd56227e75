//! Pytest oracle adapter.
//!
//! Runs one pytest invocation over an ordered list of selectors and reports
//! whether the LAST selector finished with the expected outcome. Everything
//! the engine knows about pass/fail flows through this boundary.

use std::path::PathBuf;
use std::process::Command;

use regex::Regex;

use crate::error::MinimizeError;

const OUTPUT_LIMIT: usize = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Passed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Passed,
    Failed,
}

/// Seam for the pytest boundary; tests script it in place of a real run.
pub trait Verifier {
    fn verify(&mut self, selectors: &[String], expected: Expected) -> Result<bool, MinimizeError>;
}

pub struct PytestOracle {
    rootdir: PathBuf,
    /// Forwarded to pytest-timeout as `--timeout=N`; a hung test run would
    /// otherwise block the whole minimization.
    pytest_timeout: Option<u64>,
    pub calls: usize,
}

impl PytestOracle {
    pub fn new(rootdir: PathBuf, pytest_timeout: Option<u64>) -> Self {
        Self {
            rootdir,
            pytest_timeout,
            calls: 0,
        }
    }
}

impl Verifier for PytestOracle {
    /// Run the selectors, in order, as one pytest invocation and compare the
    /// final selector's reported outcome against `expected`.
    fn verify(&mut self, selectors: &[String], expected: Expected) -> Result<bool, MinimizeError> {
        self.calls += 1;

        let command = build_command(selectors, self.pytest_timeout);
        let out = Command::new("sh")
            .arg("-lc")
            .arg(&command)
            .current_dir(&self.rootdir)
            .output()
            .map_err(|e| MinimizeError::Oracle(format!("failed to start pytest: {}", e)))?;

        let mut text = String::new();
        text.push_str(&String::from_utf8_lossy(&out.stdout));
        if !out.stderr.is_empty() {
            if !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&String::from_utf8_lossy(&out.stderr));
        }

        let outcome = last_outcome(&text).ok_or_else(|| {
            MinimizeError::Oracle(format!(
                "no per-test outcome in pytest output for `{}`:\n{}",
                command,
                truncate_output(&text)
            ))
        })?;

        Ok(match expected {
            Expected::Passed => outcome == Outcome::Passed,
            Expected::Failed => outcome == Outcome::Failed,
        })
    }
}

fn build_command(selectors: &[String], pytest_timeout: Option<u64>) -> String {
    let mut cmd = String::from("pytest -v -p no:randomly -p no:cacheprovider --color=no");
    if let Some(secs) = pytest_timeout {
        cmd.push_str(&format!(" --timeout={}", secs));
    }
    for sel in selectors {
        // brackets in parametrized ids are shell glob characters
        cmd.push_str(&format!(" '{}'", sel.replace('\'', r"'\''")));
    }
    cmd
}

/// The selectors run in the order given, so the last reported per-test line
/// belongs to the last selector. ERROR (setup/collection blew up) counts as
/// a failure for verification purposes.
fn last_outcome(output: &str) -> Option<Outcome> {
    let re = Regex::new(r"::\S+\s+(PASSED|FAILED|ERROR)\b").unwrap();
    re.captures_iter(output)
        .last()
        .and_then(|c| c.get(1))
        .map(|m| match m.as_str() {
            "PASSED" => Outcome::Passed,
            _ => Outcome::Failed,
        })
}

fn truncate_output(s: &str) -> String {
    if s.chars().count() <= OUTPUT_LIMIT {
        return s.to_string();
    }

    let tail: String = s
        .chars()
        .rev()
        .take(OUTPUT_LIMIT)
        .collect::<String>()
        .chars()
        .rev()
        .collect();

    format!("...truncated...\n{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_outcome_takes_final_test_line() {
        let out = "\
tests/test_a.py::test_polluter PASSED                                    [ 50%]
tests/test_b.py::test_victim FAILED                                      [100%]
=========================== 1 failed, 1 passed ================================";
        assert_eq!(last_outcome(out), Some(Outcome::Failed));
    }

    #[test]
    fn error_outcome_maps_to_failed() {
        let out = "tests/test_b.py::test_victim ERROR                       [100%]";
        assert_eq!(last_outcome(out), Some(Outcome::Failed));
    }

    #[test]
    fn collection_failure_has_no_outcome() {
        let out = "ERROR tests/test_a.py - SyntaxError: invalid syntax";
        assert_eq!(last_outcome(out), None);
    }

    #[test]
    fn command_quotes_parametrized_selectors() {
        let cmd = build_command(
            &["tests/test_a.py::test_x[1-2]".to_string()],
            Some(30),
        );
        assert!(cmd.contains("--timeout=30"));
        assert!(cmd.contains("'tests/test_a.py::test_x[1-2]'"));
    }
}
