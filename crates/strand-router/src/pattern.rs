//! Route patterns - parse-once path templates.
//!
//! A pattern is a `/`-delimited template whose segments are either literal
//! text or named parameter binders marked with a leading `:`
//! (`/products/:category/:id`). Patterns are compiled into tagged segments
//! at registration time; matching never re-parses the raw string.
//!
//! Malformed patterns fail fast at registration with a [`PatternError`]
//! rather than silently matching nothing later.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::percent_decode_lossy;

/// Registration-time pattern failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("route pattern must start with '/': {pattern}")]
    MissingLeadingSlash { pattern: String },

    #[error("route pattern has an empty segment: {pattern}")]
    EmptySegment { pattern: String },

    #[error("route pattern has a parameter with no name: {pattern}")]
    EmptyParamName { pattern: String },

    #[error("route pattern binds parameter ':{name}' more than once: {pattern}")]
    DuplicateParam { pattern: String, name: String },
}

/// One compiled pattern segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segment {
    /// Matches a path segment exactly (case-sensitive).
    Literal(String),
    /// Matches any non-empty path segment and binds its decoded value.
    Param(String),
}

/// A compiled route pattern.
///
/// `/` alone is the zero-segment root pattern. Trailing slashes and empty
/// segments are rejected at parse time, so a registered pattern always has
/// one compiled segment per path segment it can match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Compile a raw pattern string.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(PatternError::MissingLeadingSlash {
                pattern: pattern.to_string(),
            });
        };

        let mut segments = Vec::new();
        if !rest.is_empty() {
            for piece in rest.split('/') {
                if piece.is_empty() {
                    return Err(PatternError::EmptySegment {
                        pattern: pattern.to_string(),
                    });
                }
                match piece.strip_prefix(':') {
                    Some("") => {
                        return Err(PatternError::EmptyParamName {
                            pattern: pattern.to_string(),
                        });
                    }
                    Some(name) => {
                        let duplicate = segments
                            .iter()
                            .any(|s| matches!(s, Segment::Param(n) if n == name));
                        if duplicate {
                            return Err(PatternError::DuplicateParam {
                                pattern: pattern.to_string(),
                                name: name.to_string(),
                            });
                        }
                        segments.push(Segment::Param(name.to_string()));
                    }
                    None => segments.push(Segment::Literal(piece.to_string())),
                }
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// The raw pattern string this was compiled from.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.raw
    }

    /// The compiled segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of parameter segments. Fewer parameters means a more specific
    /// pattern in match resolution.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Param(_)))
            .count()
    }

    /// Match against already-split raw path segments.
    ///
    /// Returns the bound (percent-decoded) parameters on a match, `None`
    /// otherwise. Parameter segments require a non-empty path segment, so
    /// an empty segment in the path (double or trailing slash) can only
    /// fail to match.
    pub(crate) fn capture(&self, path_segments: &[&str]) -> Option<HashMap<String, String>> {
        if path_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, raw) in self.segments.iter().zip(path_segments) {
            match segment {
                Segment::Literal(text) => {
                    if text != raw {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if raw.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), percent_decode_lossy(raw));
                }
            }
        }

        Some(params)
    }
}

impl std::fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_literal_and_param_segments() {
        let pattern = RoutePattern::parse("/products/:category/:id").unwrap();
        assert_eq!(
            pattern.segments(),
            &[
                Segment::Literal("products".to_string()),
                Segment::Param("category".to_string()),
                Segment::Param("id".to_string()),
            ]
        );
        assert_eq!(pattern.param_count(), 2);
        assert_eq!(pattern.path(), "/products/:category/:id");
    }

    #[test]
    fn test_root_pattern_has_zero_segments() {
        let pattern = RoutePattern::parse("/").unwrap();
        assert!(pattern.segments().is_empty());
        assert_eq!(pattern.param_count(), 0);
    }

    #[test]
    fn test_malformed_patterns_fail_fast() {
        assert_matches!(
            RoutePattern::parse("users/:id"),
            Err(PatternError::MissingLeadingSlash { .. })
        );
        assert_matches!(
            RoutePattern::parse("/users//detail"),
            Err(PatternError::EmptySegment { .. })
        );
        assert_matches!(
            RoutePattern::parse("/users/"),
            Err(PatternError::EmptySegment { .. })
        );
        assert_matches!(
            RoutePattern::parse("/users/:"),
            Err(PatternError::EmptyParamName { .. })
        );
        assert_matches!(
            RoutePattern::parse("/pair/:x/:x"),
            Err(PatternError::DuplicateParam { ref name, .. }) if name == "x"
        );
    }

    #[test]
    fn test_capture_binds_decoded_params() {
        let pattern = RoutePattern::parse("/users/:id").unwrap();

        let params = pattern.capture(&["users", "a%20b"]).unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("a b"));

        assert_eq!(pattern.capture(&["teams", "7"]), None);
        assert_eq!(pattern.capture(&["users"]), None);
        assert_eq!(pattern.capture(&["users", "1", "extra"]), None);
    }

    #[test]
    fn test_param_requires_non_empty_segment() {
        let pattern = RoutePattern::parse("/users/:id").unwrap();
        assert_eq!(pattern.capture(&["users", ""]), None);
    }

    #[test]
    fn test_literal_match_is_case_sensitive() {
        let pattern = RoutePattern::parse("/Users").unwrap();
        assert!(pattern.capture(&["Users"]).is_some());
        assert_eq!(pattern.capture(&["users"]), None);
    }

    #[test]
    fn test_pattern_serializes_for_host_logging() {
        let pattern = RoutePattern::parse("/users/:id").unwrap();
        let json = serde_json::to_string(&pattern).unwrap();
        let back: RoutePattern = serde_json::from_str(&json).unwrap();
        assert_eq!(pattern, back);
    }
}
