//! Candidate selection: the enumeration glob and the exclude list.

use std::path::Path;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};

/// True if the pattern uses glob wildcards.
fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

fn compile(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .case_insensitive(true)
        .literal_separator(false)
        .backslash_escape(false)
        .build()
        .with_context(|| format!("invalid pattern '{pattern}'"))?;
    Ok(glob.compile_matcher())
}

/// Case-insensitive glob matched against a candidate's file name.
#[derive(Debug, Clone)]
pub struct FilePattern {
    matcher: GlobMatcher,
}

impl FilePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            matcher: compile(pattern)?,
        })
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.matcher.is_match(Path::new(name)))
    }
}

/// One exclude rule.
#[derive(Debug, Clone)]
pub enum ExcludeRule {
    /// Lower-cased text searched anywhere in the path
    Substring(String),
    /// Glob anchored to the whole path
    Glob(GlobMatcher),
}

impl ExcludeRule {
    fn new(pattern: &str) -> Result<Self> {
        if has_glob_chars(pattern) {
            Ok(ExcludeRule::Glob(compile(pattern)?))
        } else {
            Ok(ExcludeRule::Substring(pattern.to_lowercase()))
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            ExcludeRule::Substring(needle) => path.to_lowercase().contains(needle.as_str()),
            ExcludeRule::Glob(matcher) => matcher.is_match(path),
        }
    }
}

/// Drops candidates matching any exclude pattern.
///
/// Patterns with `*` or `?` are case-insensitive globs over the full path;
/// anything else is a case-insensitive substring match.
#[derive(Debug, Clone)]
pub enum ExcludeFilter {
    None,
    Single(ExcludeRule),
    Many(Vec<ExcludeRule>),
}

impl ExcludeFilter {
    pub fn new(patterns: &[String]) -> Result<Self> {
        Ok(match patterns {
            [] => ExcludeFilter::None,
            [only] => ExcludeFilter::Single(ExcludeRule::new(only)?),
            many => ExcludeFilter::Many(
                many.iter()
                    .map(|p| ExcludeRule::new(p))
                    .collect::<Result<_>>()?,
            ),
        })
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        match self {
            ExcludeFilter::None => false,
            ExcludeFilter::Single(rule) => rule.matches(&path.to_string_lossy()),
            ExcludeFilter::Many(rules) => {
                let path = path.to_string_lossy();
                rules.iter().any(|rule| rule.matches(&path))
            }
        }
    }
}
