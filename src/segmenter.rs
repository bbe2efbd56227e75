//! Code segmenter.
//!
//! Locates a named Python function with tree-sitter and exposes its ordered
//! top-level statements as byte spans over the original source. Candidate
//! files are produced by splicing whole statements back in original order;
//! statements are only ever selected, never reordered or rewritten.

use tree_sitter::{Node, Parser, Tree};

use crate::error::MinimizeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementSpan {
    pub start: usize,
    pub end: usize,
}

/// A located function definition plus everything needed to re-render the
/// file around a reduced statement list.
#[derive(Debug)]
pub struct FunctionSite {
    pub name: String,
    pub path: String,
    src: String,
    /// Start of the `def` line (or the first decorator's line).
    def_start: usize,
    /// Start of the first body statement's line.
    body_start: usize,
    /// End byte of the last body statement.
    body_end: usize,
    indent: String,
    statements: Vec<StatementSpan>,
}

pub fn parse_source(src: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_python::language()).ok()?;
    parser.parse(src, None)
}

/// True when `text` re-parses as Python without syntax errors. Every rendered
/// candidate is checked before it touches disk.
pub fn reparses(text: &str) -> bool {
    parse_source(text)
        .map(|t| !t.root_node().has_error())
        .unwrap_or(false)
}

pub fn locate(src: &str, path: &str, function_name: &str) -> Result<FunctionSite, MinimizeError> {
    let not_found = || MinimizeError::FunctionNotFound {
        name: function_name.to_string(),
        path: path.to_string(),
    };

    let tree = parse_source(src).ok_or_else(|| MinimizeError::Parse {
        path: path.to_string(),
    })?;

    let func = find_function(tree.root_node(), src, function_name).ok_or_else(not_found)?;
    let body = func.child_by_field_name("body").ok_or_else(not_found)?;

    let mut statements = Vec::new();
    let mut w = body.walk();
    for child in body.named_children(&mut w) {
        if child.kind() == "comment" {
            continue;
        }
        statements.push(StatementSpan {
            start: child.start_byte(),
            end: child.end_byte(),
        });
    }

    if statements.is_empty() {
        return Err(not_found());
    }

    // decorators live on a wrapping decorated_definition node
    let def_node = match func.parent() {
        Some(p) if p.kind() == "decorated_definition" => p,
        _ => func,
    };

    let first = statements[0];
    let body_start = line_start(src, first.start);
    let indent = src[body_start..first.start].to_string();

    Ok(FunctionSite {
        name: function_name.to_string(),
        path: path.to_string(),
        src: src.to_string(),
        def_start: line_start(src, def_node.start_byte()),
        body_start,
        body_end: statements[statements.len() - 1].end,
        indent,
        statements,
    })
}

impl FunctionSite {
    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    pub fn statement_text(&self, index: usize) -> &str {
        let span = self.statements[index];
        &self.src[span.start..span.end]
    }

    /// Render the whole file with the body reduced to the statements at
    /// `keep` (indices into the original body, in original order). An empty
    /// selection renders a `pass` so the file still parses.
    pub fn render_file(&self, keep: &[usize]) -> String {
        let mut out = String::with_capacity(self.src.len());
        out.push_str(&self.src[..self.body_start]);
        self.push_body(&mut out, keep);
        out.push_str(&self.src[self.body_end..]);
        out
    }

    /// Render only the function definition, for the minimized artifact.
    pub fn render_function(&self, keep: &[usize]) -> String {
        let mut out = String::new();
        out.push_str(&self.src[self.def_start..self.body_start]);
        self.push_body(&mut out, keep);
        out.push('\n');
        out
    }

    fn push_body(&self, out: &mut String, keep: &[usize]) {
        if keep.is_empty() {
            out.push_str(&self.indent);
            out.push_str("pass");
            return;
        }
        for (k, &i) in keep.iter().enumerate() {
            if k > 0 {
                out.push('\n');
            }
            let span = self.statements[i];
            out.push_str(&self.indent);
            out.push_str(&self.src[span.start..span.end]);
        }
    }
}

fn find_function<'a>(node: Node<'a>, src: &str, name: &str) -> Option<Node<'a>> {
    if node.kind() == "function_definition" {
        let found = node
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(src.as_bytes()).ok())
            .map(|n| n == name)
            .unwrap_or(false);
        if found {
            return Some(node);
        }
    }

    let mut w = node.walk();
    for child in node.children(&mut w) {
        if let Some(hit) = find_function(child, src, name) {
            return Some(hit);
        }
    }
    None
}

fn line_start(src: &str, offset: usize) -> usize {
    src[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0)
}
