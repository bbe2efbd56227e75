//! End-of-run report: console summary plus optional JSON artifact.

use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use crate::engine::SearchStats;

#[derive(Serialize)]
pub struct RunReport {
    pub polluter: String,
    pub victim: String,
    pub task_kind: &'static str,
    pub original_statements: usize,
    pub minimized_statements: usize,
    pub oracle_calls: usize,
    pub search: SearchStats,
    pub minimized_path: String,
    pub function_diff: String,
}

/// Line diff of the polluter function before vs after minimization.
pub fn function_diff(before: &str, after: &str) -> String {
    let diff = TextDiff::from_lines(before, after);
    let mut out = String::new();

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        out.push_str(sign);
        out.push_str(change.value());
    }

    out
}

impl RunReport {
    pub fn print_summary(&self) {
        println!("\ntask kind: {}", self.task_kind);
        println!(
            "statements: {} -> {}",
            self.original_statements, self.minimized_statements
        );
        println!(
            "search: {} sweeps, {} candidates, {} deletions accepted, {} pytest runs",
            self.search.sweeps,
            self.search.candidates_tried,
            self.search.deletions_accepted,
            self.oracle_calls
        );
        println!("minimized polluter written to: {}", self.minimized_path);
        if self.original_statements != self.minimized_statements {
            println!("\n{}", self.function_diff);
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        println!("report written to: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_marks_deleted_statements() {
        let before = "def t():\n    a = 1\n    b = 2\n";
        let after = "def t():\n    a = 1\n";
        let diff = function_diff(before, after);
        assert!(diff.contains(" def t():"));
        assert!(diff.contains("-    b = 2"));
        assert!(!diff.contains("+    b = 2"));
    }
}
