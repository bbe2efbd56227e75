//! Task-kind classification.
//!
//! Decided once, up front, from two oracle queries; the chosen kind pins the
//! pass/fail pattern the engine must preserve for the whole run.

use serde::Serialize;

use crate::error::MinimizeError;
use crate::oracle::{Expected, Verifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// The polluter alone passes and polluter+victim fails.
    Victim,
    /// The victim is order-sensitive: it fails alone and the polluter
    /// "fixes" it, so polluter+victim must keep passing.
    Brittle,
}

impl TaskKind {
    /// Required outcome of the victim when run after the polluter.
    pub fn joint_expected(self) -> Expected {
        match self {
            TaskKind::Victim => Expected::Failed,
            TaskKind::Brittle => Expected::Passed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskKind::Victim => "victim",
            TaskKind::Brittle => "brittle",
        }
    }
}

pub fn classify<V: Verifier>(
    oracle: &mut V,
    polluter: &str,
    victim: &str,
) -> Result<TaskKind, MinimizeError> {
    let victim_fails_alone = oracle.verify(&[victim.to_string()], Expected::Failed)?;
    let joint_passes = oracle.verify(
        &[polluter.to_string(), victim.to_string()],
        Expected::Passed,
    )?;

    if victim_fails_alone && joint_passes {
        Ok(TaskKind::Brittle)
    } else {
        Ok(TaskKind::Victim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted oracle: fixed solo outcome for the victim, fixed joint
    /// outcome for polluter+victim.
    struct Script {
        victim_alone_passes: bool,
        joint_passes: bool,
    }

    impl Verifier for Script {
        fn verify(&mut self, selectors: &[String], expected: Expected) -> Result<bool, MinimizeError> {
            let passes = if selectors.len() == 1 {
                self.victim_alone_passes
            } else {
                self.joint_passes
            };
            Ok(match expected {
                Expected::Passed => passes,
                Expected::Failed => !passes,
            })
        }
    }

    fn kind(victim_alone_passes: bool, joint_passes: bool) -> TaskKind {
        let mut oracle = Script {
            victim_alone_passes,
            joint_passes,
        };
        classify(&mut oracle, "t.py::test_p", "t.py::test_v").unwrap()
    }

    #[test]
    fn brittle_requires_both_signals() {
        assert_eq!(kind(false, true), TaskKind::Brittle);
    }

    #[test]
    fn everything_else_is_victim() {
        assert_eq!(kind(true, false), TaskKind::Victim);
        assert_eq!(kind(true, true), TaskKind::Victim);
        assert_eq!(kind(false, false), TaskKind::Victim);
    }

    #[test]
    fn joint_polarity_follows_kind() {
        assert_eq!(TaskKind::Victim.joint_expected(), Expected::Failed);
        assert_eq!(TaskKind::Brittle.joint_expected(), Expected::Passed);
    }
}
