//! Parsing and formatting of pytest node ids.
//!
//! A node id looks like `tests/test_a.py::TestDb::test_write[sqlite]`:
//! module path, optional class, function, optional parametrization.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestIdentifier {
    pub module: String,
    pub class: Option<String>,
    pub function: String,
    pub para: Option<String>,
}

impl TestIdentifier {
    /// Split a pytest node id into its components. The parametrization
    /// suffix (`[...]`) always belongs to the final segment.
    pub fn parse(node_id: &str) -> Result<Self, String> {
        let node_id = node_id.trim();
        let mut parts: Vec<&str> = node_id.split("::").collect();

        if parts.len() < 2 || parts.len() > 3 {
            return Err(format!(
                "'{}' is not a pytest node id (expected module::[Class::]function)",
                node_id
            ));
        }

        let module = parts.remove(0).to_string();
        if module.is_empty() {
            return Err(format!("'{}' has an empty module path", node_id));
        }

        let class = if parts.len() == 2 {
            Some(parts.remove(0).to_string())
        } else {
            None
        };

        let last = parts.remove(0);
        let (function, para) = match last.find('[') {
            Some(idx) => (
                last[..idx].to_string(),
                Some(last[idx..].to_string()),
            ),
            None => (last.to_string(), None),
        };

        if function.is_empty() {
            return Err(format!("'{}' has an empty function name", node_id));
        }

        Ok(TestIdentifier {
            module,
            class,
            function,
            para,
        })
    }

    /// Rebuild the pytest selector, including parametrization.
    pub fn selector(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TestIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.module)?;
        if let Some(class) = &self.class {
            write!(f, "::{}", class)?;
        }
        write!(f, "::{}", self.function)?;
        if let Some(para) = &self.para {
            write!(f, "{}", para)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_function() {
        let id = TestIdentifier::parse("tests/test_a.py::test_alpha").unwrap();
        assert_eq!(id.module, "tests/test_a.py");
        assert_eq!(id.class, None);
        assert_eq!(id.function, "test_alpha");
        assert_eq!(id.para, None);
    }

    #[test]
    fn parses_class_and_parametrization() {
        let id = TestIdentifier::parse("tests/test_db.py::TestDb::test_write[sqlite-1]").unwrap();
        assert_eq!(id.class.as_deref(), Some("TestDb"));
        assert_eq!(id.function, "test_write");
        assert_eq!(id.para.as_deref(), Some("[sqlite-1]"));
    }

    #[test]
    fn selector_round_trips() {
        for raw in [
            "tests/test_a.py::test_alpha",
            "tests/test_db.py::TestDb::test_write[sqlite-1]",
        ] {
            let id = TestIdentifier::parse(raw).unwrap();
            assert_eq!(id.selector(), raw);
        }
    }

    #[test]
    fn rejects_bare_module() {
        assert!(TestIdentifier::parse("tests/test_a.py").is_err());
        assert!(TestIdentifier::parse("::test_x").is_err());
        assert!(TestIdentifier::parse("a.py::B::c::d").is_err());
    }
}
