//! Path patterns.
//!
//! Patterns use colon placeholders: `:name` matches one path segment and
//! `:name?` matches one segment or none. Names are made of ASCII letters,
//! digits and underscores, so a placeholder may share a segment with static
//! text (`/files/:name.json`). Captured values are percent-decoded.
//!
//! ```rust
//! use cartographer_router::{join_paths, parse_params};
//!
//! let path = join_paths("/orgs/:orgId", "/users/:userId?");
//! assert_eq!(path, "/orgs/:orgId/users/:userId?");
//!
//! let params = parse_params(&path);
//! assert_eq!(params[0].name, "orgId");
//! assert!(!params[0].optional);
//! assert!(params[1].optional);
//! ```

use std::borrow::Cow;
use std::sync::OnceLock;

use cartographer_core::Params;
use regex::Regex;
use serde::Serialize;

/// A placeholder found in a path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PathParam {
    /// Placeholder name without the leading colon.
    pub name: String,
    /// True for `:name?` placeholders.
    pub optional: bool,
}

impl PathParam {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, optional: bool) -> Self {
        Self {
            name: name.into(),
            optional,
        }
    }
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r":([A-Za-z0-9_]+)(\?)?").unwrap_or_else(|e| unreachable!("placeholder regex: {e}"))
    })
}

/// Extracts placeholders from `path`, left to right.
#[must_use]
pub fn parse_params(path: &str) -> Vec<PathParam> {
    placeholder()
        .captures_iter(path)
        .map(|caps| PathParam {
            name: caps[1].to_string(),
            optional: caps.get(2).is_some(),
        })
        .collect()
}

/// Joins a mount prefix and a local path.
///
/// Duplicate slashes collapse and a trailing slash is dropped. An empty or
/// `/` prefix adds nothing, and a `/` local path resolves to the prefix.
#[must_use]
pub fn join_paths(prefix: &str, local: &str) -> String {
    let joined = prefix
        .split('/')
        .chain(local.split('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{joined}")
}

#[derive(Debug, Clone)]
enum Segment {
    Static(String),
    Param {
        name: String,
        optional: bool,
    },
    /// Placeholders mixed with static text inside one segment.
    Mixed {
        regex: Regex,
        names: Vec<String>,
    },
}

impl Segment {
    fn compile(segment: &str) -> Self {
        let mut source = String::from("^");
        let mut names = Vec::new();
        let mut last = 0;

        for caps in placeholder().captures_iter(segment) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let optional = caps.get(2).is_some();
            if whole.start() == 0 && whole.end() == segment.len() {
                return Self::Param {
                    name: name.as_str().to_string(),
                    optional,
                };
            }
            source.push_str(&regex::escape(&segment[last..whole.start()]));
            source.push_str(if optional { "([^/]*?)" } else { "([^/]+?)" });
            names.push(name.as_str().to_string());
            last = whole.end();
        }

        if names.is_empty() {
            return Self::Static(segment.to_string());
        }
        source.push_str(&regex::escape(&segment[last..]));
        source.push('$');

        match Regex::new(&source) {
            Ok(regex) => Self::Mixed { regex, names },
            Err(e) => {
                tracing::debug!(segment, error = %e, "treating segment as static text");
                Self::Static(segment.to_string())
            }
        }
    }
}

/// A pattern compiled for matching request paths.
///
/// Placeholders are found with the same grammar as [`parse_params`], so the
/// names a match captures are always the names `parse_params` reports.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for PathPattern {}

impl PathPattern {
    /// Compiles a pattern. The raw text is normalized with [`join_paths`].
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        let raw = join_paths("", pattern);
        let segments = raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(Segment::compile)
            .collect();
        Self { raw, segments }
    }

    /// Lists the placeholders of the pattern, left to right.
    #[must_use]
    pub fn params(&self) -> Vec<PathParam> {
        parse_params(&self.raw)
    }

    /// Returns the normalized pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true for the root pattern `/`.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Matches the whole of `path`, returning captured parameters.
    #[must_use]
    pub fn match_exact(&self, path: &str) -> Option<Params> {
        let parts = split(path);
        let mut captured = Vec::new();
        let consumed = self.walk(0, &parts, 0, &mut captured, true)?;
        debug_assert_eq!(consumed, parts.len());
        Some(captured.into_iter().collect())
    }

    /// Matches a leading run of `path` segments.
    ///
    /// Returns the captured parameters and the unmatched remainder, which
    /// always starts with `/`.
    #[must_use]
    pub fn match_prefix(&self, path: &str) -> Option<(Params, String)> {
        let parts = split(path);
        let mut captured = Vec::new();
        let consumed = self.walk(0, &parts, 0, &mut captured, false)?;
        let rest = format!("/{}", parts[consumed..].join("/"));
        Some((captured.into_iter().collect(), rest))
    }

    fn walk(
        &self,
        seg: usize,
        parts: &[&str],
        at: usize,
        captured: &mut Vec<(String, String)>,
        exact: bool,
    ) -> Option<usize> {
        let Some(segment) = self.segments.get(seg) else {
            return (!exact || at == parts.len()).then_some(at);
        };

        match segment {
            Segment::Static(text) => {
                if parts.get(at) == Some(&text.as_str()) {
                    self.walk(seg + 1, parts, at + 1, captured, exact)
                } else {
                    None
                }
            }
            Segment::Param { name, optional } => {
                if let Some(part) = parts.get(at) {
                    let mark = captured.len();
                    captured.push((name.clone(), decode(part)));
                    if let Some(end) = self.walk(seg + 1, parts, at + 1, captured, exact) {
                        return Some(end);
                    }
                    captured.truncate(mark);
                }
                if *optional {
                    self.walk(seg + 1, parts, at, captured, exact)
                } else {
                    None
                }
            }
            Segment::Mixed { regex, names } => {
                let caps = parts.get(at).and_then(|part| regex.captures(part))?;
                let mark = captured.len();
                for (name, value) in names.iter().zip(caps.iter().skip(1)) {
                    if let Some(value) = value.filter(|v| !v.as_str().is_empty()) {
                        captured.push((name.clone(), decode(value.as_str())));
                    }
                }
                let end = self.walk(seg + 1, parts, at + 1, captured, exact);
                if end.is_none() {
                    captured.truncate(mark);
                }
                end
            }
        }
    }
}

fn split(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Percent-decodes a captured value; malformed UTF-8 keeps the raw text.
fn decode(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_string(), Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_params_order_and_optional() {
        let params = parse_params("/a/:x/:y?");
        assert_eq!(params, vec![PathParam::new("x", false), PathParam::new("y", true)]);
    }

    #[test]
    fn test_parse_params_none() {
        assert!(parse_params("/users").is_empty());
        assert!(parse_params("/").is_empty());
    }

    #[test]
    fn test_parse_params_consecutive() {
        let params = parse_params("/:a/:b");
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("", "/users"), "/users");
        assert_eq!(join_paths("/", "/users"), "/users");
        assert_eq!(join_paths("/api", "/"), "/api");
        assert_eq!(join_paths("/api/", "//users/"), "/api/users");
        assert_eq!(join_paths("", "/"), "/");
        assert_eq!(join_paths("/router", "sub"), "/router/sub");
    }

    #[test]
    fn test_match_exact_static() {
        let pattern = PathPattern::parse("/users/list");
        assert!(pattern.match_exact("/users/list").is_some());
        assert!(pattern.match_exact("/users/list/").is_some());
        assert!(pattern.match_exact("/users").is_none());
        assert!(pattern.match_exact("/users/list/extra").is_none());
    }

    #[test]
    fn test_match_exact_params() {
        let pattern = PathPattern::parse("/users/:id/posts/:postId");
        let params = pattern.match_exact("/users/42/posts/7").unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.get("postId"), Some("7"));
    }

    #[test]
    fn test_match_exact_optional_param() {
        let pattern = PathPattern::parse("/a/:x/:y?");
        let both = pattern.match_exact("/a/1/2").unwrap();
        assert_eq!(both.get("y"), Some("2"));

        let one = pattern.match_exact("/a/1").unwrap();
        assert_eq!(one.get("x"), Some("1"));
        assert_eq!(one.get("y"), None);
    }

    #[test]
    fn test_optional_param_backtracks() {
        let pattern = PathPattern::parse("/files/:name?/raw");
        let params = pattern.match_exact("/files/raw").unwrap();
        assert!(params.is_empty());
        let params = pattern.match_exact("/files/a/raw").unwrap();
        assert_eq!(params.get("name"), Some("a"));
    }

    #[test]
    fn test_match_prefix() {
        let pattern = PathPattern::parse("/orgs/:orgId");
        let (params, rest) = pattern.match_prefix("/orgs/acme/users/1").unwrap();
        assert_eq!(params.get("orgId"), Some("acme"));
        assert_eq!(rest, "/users/1");

        let (_, rest) = pattern.match_prefix("/orgs/acme").unwrap();
        assert_eq!(rest, "/");

        assert!(pattern.match_prefix("/organisations/acme").is_none());
    }

    #[test]
    fn test_placeholder_inside_segment() {
        let pattern = PathPattern::parse("/files/:name.json");
        let params = pattern.match_exact("/files/report.json").unwrap();
        assert_eq!(params.get("name"), Some("report"));
        assert!(pattern.match_exact("/files/report.xml").is_none());
        assert!(pattern.match_exact("/files/.json").is_none());
    }

    #[test]
    fn test_static_text_before_placeholder() {
        let pattern = PathPattern::parse("/a/b:c/:file.json");
        let params = pattern.match_exact("/a/bX/x.json").unwrap();
        assert_eq!(params.get("c"), Some("X"));
        assert_eq!(params.get("file"), Some("x"));
        assert!(pattern.match_exact("/a/b:c/x").is_none());
    }

    #[test]
    fn test_several_placeholders_in_one_segment() {
        let pattern = PathPattern::parse("/range/:from-:to");
        let params = pattern.match_exact("/range/3-9").unwrap();
        assert_eq!(params.get("from"), Some("3"));
        assert_eq!(params.get("to"), Some("9"));
    }

    #[test]
    fn test_pattern_params_match_parse_params() {
        for raw in ["/a/b:c/:file.json", "/files/:name.json", "/:a/:b?", "/range/:from-:to"] {
            assert_eq!(PathPattern::parse(raw).params(), parse_params(raw));
        }
    }

    #[test]
    fn test_captured_values_are_percent_decoded() {
        let pattern = PathPattern::parse("/users/:id/files/:name.txt");
        let params = pattern.match_exact("/users/a%20b/files/caf%C3%A9.txt").unwrap();
        assert_eq!(params.get("id"), Some("a b"));
        assert_eq!(params.get("name"), Some("café"));
    }

    #[test]
    fn test_malformed_escape_keeps_raw_value() {
        let pattern = PathPattern::parse("/users/:id");
        let params = pattern.match_exact("/users/%FF").unwrap();
        assert_eq!(params.get("id"), Some("%FF"));
    }

    #[test]
    fn test_root_prefix_matches_everything() {
        let root = PathPattern::parse("/");
        assert!(root.is_root());
        let (params, rest) = root.match_prefix("/anything/here").unwrap();
        assert!(params.is_empty());
        assert_eq!(rest, "/anything/here");
        assert!(root.match_exact("/").is_some());
        assert!(root.match_exact("/x").is_none());
    }
}
