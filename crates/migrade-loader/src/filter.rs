use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One rewrite rule: lines matching `pattern` are rewritten with `replace`
/// (capture groups allowed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub pattern: String,
    pub replace: String,
}

/// Rules file contents: dialect name to rewrite rules.
pub type FilterRules = BTreeMap<String, Vec<RewriteRule>>;

/// Per-dialect SQL line filter.
///
/// Pure per line and stateless, so reading the same file twice or
/// interleaving files is always safe.
#[derive(Debug)]
pub struct SqlLineFilter {
    rules: Vec<(Regex, String)>,
}

impl SqlLineFilter {
    /// A filter that passes every line through unchanged.
    pub fn identity() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn compile(rules: &[RewriteRule]) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let regex = Regex::new(&rule.pattern)
                .with_context(|| format!("compile filter pattern: {}", rule.pattern))?;
            compiled.push((regex, rule.replace.clone()));
        }
        Ok(Self { rules: compiled })
    }

    pub fn is_identity(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn filter_line(&self, line: &str) -> String {
        let mut filtered = line.to_string();
        for (regex, replace) in &self.rules {
            filtered = regex.replace_all(&filtered, replace.as_str()).into_owned();
        }
        filtered
    }

    /// Filter a whole script, line by line. Output lines are newline
    /// terminated, matching how the engine consumes the changelog.
    pub fn filter_sql(&self, sql: &str) -> String {
        let mut out = String::with_capacity(sql.len());
        for line in sql.lines() {
            out.push_str(&self.filter_line(line));
            out.push('\n');
        }
        out
    }
}

/// Load the rules file and compile the rules of the requested dialect.
/// No rules file, or no rules for the dialect, yields the identity filter.
pub fn load_filter(path: Option<&Path>, dialect: Option<&str>) -> Result<SqlLineFilter> {
    let (Some(path), Some(dialect)) = (path, dialect) else {
        return Ok(SqlLineFilter::identity());
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("read filter rules: {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str());
    let rules: FilterRules = if ext == Some("yaml") || ext == Some("yml") {
        serde_yaml::from_str(&content)
            .with_context(|| format!("parse filter rules: {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("parse filter rules: {}", path.display()))?
    };

    match rules.get(dialect) {
        Some(rules) => SqlLineFilter::compile(rules),
        None => {
            tracing::warn!(dialect, "no filter rules for dialect, lines pass through");
            Ok(SqlLineFilter::identity())
        }
    }
}
