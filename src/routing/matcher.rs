//! Pattern matching for routes, groups and virtual hosts.
//!
//! # Responsibilities
//! - Build the candidate path from the active prefix and a route pattern
//! - Compile candidates and host patterns as anchored regular expressions
//! - Extract positional (and named) captures
//! - Decide whether a route's method token accepts the request method
//!
//! # Design Decisions
//! - Patterns are raw regex: caller syntax (groups, classes) is honored verbatim
//! - Paths are always anchored at the start; strict matches also at the end
//! - Host patterns are anchored at both ends
//! - Compilation failure is an error, never a silent non-match

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::http::request::collapse_slashes;

/// How a route's method token is compared with the request method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodMatch {
    /// The request method only has to appear inside the token.
    ///
    /// `GET|POST` accepts both `GET` and `POST`, but `GETX` also accepts
    /// `GET`. This is the historical behaviour.
    #[default]
    Contains,
    /// The token must equal the request method, ignoring ASCII case.
    Exact,
}

impl MethodMatch {
    /// Returns true if `token` accepts `request_method`.
    pub fn accepts(self, token: &str, request_method: &str) -> bool {
        match self {
            MethodMatch::Contains => token.contains(request_method),
            MethodMatch::Exact => token.eq_ignore_ascii_case(request_method),
        }
    }
}

/// Values captured by a matched pattern, whole match excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    values: Vec<Option<String>>,
    names: Vec<(String, usize)>,
}

impl Captures {
    fn from_regex(re: &Regex, caps: &regex::Captures<'_>) -> Self {
        let values = caps
            .iter()
            .skip(1)
            .map(|m| m.map(|m| m.as_str().to_string()))
            .collect();

        let names = re
            .capture_names()
            .enumerate()
            .skip(1)
            .filter_map(|(i, name)| name.map(|n| (n.to_string(), i - 1)))
            .collect();

        Self { values, names }
    }

    /// Number of capture groups in the pattern.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The `index`th group, or `None` if absent or it did not participate.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    /// A named group.
    pub fn name(&self, name: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, i)| self.get(*i))
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> {
        self.values.iter().map(|v| v.as_deref())
    }
}

/// Outcome of matching a path pattern against the request path.
#[derive(Debug, Clone)]
pub struct PathMatch {
    /// Captures if the pattern matched.
    pub captures: Option<Captures>,
    /// Prefix and pattern joined with slashes collapsed.
    pub path: String,
    /// Regex source actually matched.
    pub pattern: String,
}

impl PathMatch {
    pub fn is_match(&self) -> bool {
        self.captures.is_some()
    }
}

/// Join `prefix` and `pattern` into the candidate path `/prefix/pattern/`.
pub fn candidate_path(prefix: &str, pattern: &str) -> String {
    collapse_slashes(&format!("/{}/{}/", prefix, pattern))
}

/// Match `pattern` (under `prefix`) against `path`.
///
/// Always anchored at the start; `strict` also anchors at the end.
pub fn match_path(prefix: &str, pattern: &str, path: &str, strict: bool) -> Result<PathMatch> {
    let candidate = candidate_path(prefix, pattern);
    let source = format!("^{}{}", candidate, if strict { "$" } else { "" });
    let re = compile(&source)?;

    let captures = re.captures(path).map(|caps| Captures::from_regex(&re, &caps));

    Ok(PathMatch {
        captures,
        path: candidate,
        pattern: source,
    })
}

/// Match a host pattern against `hostname`, anchored at both ends.
pub fn match_host(pattern: &str, hostname: &str) -> Result<Option<Captures>> {
    let re = compile(&format!("^{}$", pattern))?;
    Ok(re
        .captures(hostname)
        .map(|caps| Captures::from_regex(&re, &caps)))
}

/// Split a route into its method token and path pattern.
///
/// The token ends at the first space and the pattern at the next one;
/// anything after that is ignored. A missing or blank token yields the
/// request method.
pub fn split_route<'a>(route: &'a str, request_method: &str) -> (String, &'a str) {
    let mut parts = route.splitn(3, ' ');
    match (parts.next(), parts.next()) {
        (Some(token), Some(pattern)) => {
            let token = token.trim().to_ascii_uppercase();
            if token.is_empty() {
                (request_method.to_string(), pattern)
            } else {
                (token, pattern)
            }
        }
        _ => (request_method.to_string(), route),
    }
}

fn compile(source: &str) -> Result<Regex> {
    Regex::new(source).map_err(|source_err| Error::InvalidPattern {
        pattern: source.to_string(),
        source: source_err,
    })
}
