//! Resource URI parsing and pattern matching.
//!
//! Resources are addressed by URIs of the form `scheme://seg1/seg2/...`.
//! Route patterns use the same syntax with `{name}` placeholders marking
//! positional parameters, e.g. `registry://providers/{namespace}/{provider}`.
//!
//! Patterns are compiled once at route-table construction into tagged
//! segments (literal vs. placeholder) so matching a request never re-parses
//! the pattern string.

use std::collections::HashMap;

use crate::error::{McpError, Result};

/// A parsed resource URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUri {
    /// Text before the `://` separator.
    pub scheme: String,
    /// Text after the separator, as given.
    pub path: String,
    /// `path` split on `/` with empty segments discarded, so leading,
    /// trailing, and duplicate slashes collapse away.
    pub components: Vec<String>,
}

impl ResourceUri {
    /// Parse a URI string of the form `scheme://path`.
    ///
    /// The scheme is one or more non-colon characters; the path may be empty.
    /// A string without the `://` separator fails with [`McpError::MalformedUri`].
    pub fn parse(uri: &str) -> Result<Self> {
        let (scheme, path) = uri
            .split_once("://")
            .ok_or_else(|| McpError::MalformedUri(uri.to_string()))?;
        if scheme.is_empty() || scheme.contains(':') {
            return Err(McpError::MalformedUri(uri.to_string()));
        }
        let components = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Ok(Self {
            scheme: scheme.to_string(),
            path: path.to_string(),
            components,
        })
    }
}

/// One compiled pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Matched by exact, case-sensitive string equality.
    Literal(String),
    /// `{name}` — matches any non-empty segment, capturing it under `name`.
    Param(String),
}

/// A compiled route pattern.
///
/// Compiled from a URI-shaped string where path segments wrapped in `{}` are
/// placeholders. Matching is case-sensitive and does no percent-decoding or
/// other normalization; a placeholder captures the raw segment verbatim.
#[derive(Debug, Clone)]
pub struct UriPattern {
    source: String,
    scheme: String,
    segments: Vec<Segment>,
}

impl UriPattern {
    /// Compile a pattern string. Fails only if the string is not URI-shaped.
    pub fn compile(pattern: &str) -> Result<Self> {
        let parsed = ResourceUri::parse(pattern)?;
        let segments = parsed
            .components
            .into_iter()
            .map(|seg| {
                if seg.starts_with('{') && seg.ends_with('}') && seg.len() > 2 {
                    Segment::Param(seg[1..seg.len() - 1].to_string())
                } else {
                    Segment::Literal(seg)
                }
            })
            .collect();
        Ok(Self {
            source: pattern.to_string(),
            scheme: parsed.scheme,
            segments,
        })
    }

    /// The pattern string this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Match a parsed URI against this pattern, returning the captured
    /// parameters on success.
    ///
    /// A URI matches when its scheme equals the pattern's scheme, it has
    /// exactly as many path components as the pattern (no variable-length
    /// wildcards), every literal segment is byte-for-byte equal, and every
    /// placeholder position holds a non-empty component.
    pub fn match_uri(&self, uri: &ResourceUri) -> Option<HashMap<String, String>> {
        if uri.scheme != self.scheme || uri.components.len() != self.segments.len() {
            return None;
        }
        let mut params = HashMap::new();
        for (seg, component) in self.segments.iter().zip(&uri.components) {
            match seg {
                Segment::Literal(lit) => {
                    if lit != component {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), component.clone());
                }
            }
        }
        Some(params)
    }
}

/// Whether `uri` structurally satisfies `pattern`.
///
/// Never errors: a malformed URI or pattern simply does not match.
pub fn matches(uri: &str, pattern: &str) -> bool {
    let (Ok(parsed), Ok(compiled)) = (ResourceUri::parse(uri), UriPattern::compile(pattern)) else {
        return false;
    };
    compiled.match_uri(&parsed).is_some()
}

/// Extract `{name}` placeholder values from `uri` according to `pattern`.
///
/// Fails open: a malformed URI or pattern, a scheme or length mismatch, or a
/// literal-segment mismatch all yield an empty map. On a structural match the
/// map holds exactly one entry per placeholder, with the raw segment value.
pub fn extract_params(uri: &str, pattern: &str) -> HashMap<String, String> {
    let (Ok(parsed), Ok(compiled)) = (ResourceUri::parse(uri), UriPattern::compile(pattern)) else {
        return HashMap::new();
    };
    compiled.match_uri(&parsed).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_scheme_and_components() {
        let uri = ResourceUri::parse("registry://providers/hashicorp/aws").unwrap();
        assert_eq!(uri.scheme, "registry");
        assert_eq!(uri.path, "providers/hashicorp/aws");
        assert_eq!(uri.components, vec!["providers", "hashicorp", "aws"]);
    }

    #[test]
    fn parse_collapses_extra_slashes() {
        let uri = ResourceUri::parse("registry:///a//b/").unwrap();
        assert_eq!(uri.components, vec!["a", "b"]);
    }

    #[test]
    fn parse_allows_empty_path() {
        let uri = ResourceUri::parse("registry://").unwrap();
        assert_eq!(uri.path, "");
        assert!(uri.components.is_empty());
    }

    #[test]
    fn parse_rejects_missing_separator() {
        assert!(matches!(
            ResourceUri::parse("not-a-uri"),
            Err(McpError::MalformedUri(_))
        ));
        assert!(ResourceUri::parse("registry:/providers").is_err());
    }

    #[test]
    fn literal_pattern_matches_exactly() {
        assert!(matches("registry://modules", "registry://modules"));
        assert!(!matches("registry://Modules", "registry://modules"));
        assert!(!matches("registry://modules/x", "registry://modules"));
    }

    #[test]
    fn placeholder_matches_any_segment() {
        let pattern = "registry://providers/{namespace}/{provider}";
        assert!(matches("registry://providers/hashicorp/aws", pattern));
        assert!(matches("registry://providers/a%2Fb/{weird}", pattern));
    }

    #[test]
    fn length_mismatch_does_not_match() {
        let pattern = "registry://providers/{namespace}/{provider}";
        assert!(!matches("registry://providers/hashicorp", pattern));
        assert!(!matches("registry://providers/a/b/c", pattern));
    }

    #[test]
    fn scheme_mismatch_does_not_match() {
        assert!(!matches("terraform://modules", "registry://modules"));
    }

    #[test]
    fn empty_path_matches_empty_pattern() {
        assert!(matches("registry://", "registry://"));
        assert!(extract_params("registry://", "registry://").is_empty());
    }

    #[test]
    fn trailing_slash_is_equivalent() {
        let pattern = "registry://providers/{namespace}/{provider}";
        assert_eq!(
            extract_params("registry://providers/hashicorp/aws/", pattern),
            extract_params("registry://providers/hashicorp/aws", pattern),
        );
    }

    #[test]
    fn malformed_inputs_never_match() {
        assert!(!matches("no-separator", "registry://modules"));
        assert!(!matches("registry://modules", "no-separator"));
        assert!(extract_params("no-separator", "registry://{x}").is_empty());
    }

    #[test]
    fn extract_one_entry_per_placeholder() {
        let params = extract_params(
            "registry://providers/hashicorp/aws",
            "registry://providers/{namespace}/{provider}",
        );
        assert_eq!(params.len(), 2);
        assert_eq!(params["namespace"], "hashicorp");
        assert_eq!(params["provider"], "aws");
    }

    #[test]
    fn extract_captures_raw_segments() {
        let params = extract_params("registry://providers/a%2Fb/{odd}", "registry://providers/{a}/{b}");
        assert_eq!(params["a"], "a%2Fb");
        assert_eq!(params["b"], "{odd}");
    }

    #[test]
    fn extract_is_empty_on_structural_mismatch() {
        assert!(extract_params(
            "registry://providers/hashicorp",
            "registry://providers/{namespace}/{provider}"
        )
        .is_empty());
        assert!(extract_params("terraform://a", "registry://{x}").is_empty());
    }

    #[test]
    fn extract_revalidates_literals() {
        // Stricter than a matcher-then-extract pipeline requires: a literal
        // mismatch yields an empty map instead of a bogus capture.
        assert!(extract_params("registry://modules/foo", "registry://providers/{name}").is_empty());
    }

    #[test]
    fn extract_without_placeholders_is_empty_on_match() {
        assert!(extract_params("registry://modules", "registry://modules").is_empty());
    }

    #[test]
    fn cloud_workspace_scenario() {
        let pattern = "terraform://organizations/{org}/workspaces/{workspace}";
        let uri = "terraform://organizations/acme/workspaces/ws-123";
        assert!(matches(uri, pattern));
        let params = extract_params(uri, pattern);
        assert_eq!(params["org"], "acme");
        assert_eq!(params["workspace"], "ws-123");
    }
}
