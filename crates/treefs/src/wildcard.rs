// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Pluggable name matching for wildcard path resolution.
//!
//! A matcher decides which path segments are patterns (they contain one of
//! its metacharacters) and whether a node name satisfies a pattern. Two
//! strategies are provided:
//! - [`GlobMatcher`] recognizes `*`, `?` and `[...]` (with `[!...]` for
//!   negation), escapes everything else, and anchors the whole name.
//! - [`RegexMatcher`] uses the pattern verbatim as a regular expression.

use std::cell::RefCell;
use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

/// Name/pattern strategy consumed by wildcard resolution.
pub trait WildcardMatcher {
    /// Recognized metacharacters and the regex fragment each stands for.
    fn metacharacters(&self) -> &'static [(char, &'static str)];

    /// Prefix that makes the following metacharacter literal.
    fn escape_char(&self) -> Option<char> {
        None
    }

    fn is_match(&self, name: &str, pattern: &str) -> bool;

    fn is_valid_pattern(&self, pattern: &str) -> bool;

    /// True if `segment` holds an unescaped metacharacter.
    fn contains_wildcard(&self, segment: &str) -> bool {
        let meta = self.metacharacters();
        let escape = self.escape_char();
        let mut chars = segment.chars();
        while let Some(c) = chars.next() {
            if Some(c) == escape {
                _ = chars.next();
            } else if meta.iter().any(|(m, _)| *m == c) {
                return true;
            }
        }
        false
    }

    /// `segment` with escape prefixes removed, for literal lookup.
    fn unescape(&self, segment: &str) -> String {
        let Some(escape) = self.escape_char() else {
            return segment.to_string();
        };
        let mut out = String::with_capacity(segment.len());
        let mut chars = segment.chars();
        while let Some(c) = chars.next() {
            if c == escape
                && let Some(lit) = chars.next()
            {
                out.push(lit);
            } else {
                out.push(c);
            }
        }
        out
    }
}

/// Most distinct expressions a matcher keeps compiled.
const REGEX_CACHE_LIMIT: usize = 256;

/// Compiled-expression cache shared by both strategies. It is emptied
/// when full.
#[derive(Debug, Default)]
struct RegexCache {
    compiled: RefCell<HashMap<String, Option<Regex>>>,
}

impl RegexCache {
    fn is_match(&self, expr: &str, case_sensitive: bool, name: &str) -> bool {
        let mut cache = self.compiled.borrow_mut();
        if cache.len() >= REGEX_CACHE_LIMIT && !cache.contains_key(expr) {
            cache.clear();
        }
        let entry = cache.entry(expr.to_string()).or_insert_with(|| {
            RegexBuilder::new(expr)
                .case_insensitive(!case_sensitive)
                .build()
                .ok()
        });
        entry.as_ref().is_some_and(|re| re.is_match(name))
    }
}

const GLOB_META: &[(char, &str)] = &[('*', ".*"), ('?', "."), ('[', "["), (']', "]")];

const REGEX_META: &[(char, &str)] = &[
    ('.', "."),
    ('*', "*"),
    ('+', "+"),
    ('?', "?"),
    ('[', "["),
    (']', "]"),
    ('(', "("),
    (')', ")"),
    ('{', "{"),
    ('}', "}"),
    ('|', "|"),
    ('^', "^"),
    ('$', "$"),
    ('\\', "\\"),
];

/// Shell-style glob matching.
#[derive(Debug)]
pub struct GlobMatcher {
    escape: char,
    case_sensitive: bool,
    cache: RegexCache,
}

impl Default for GlobMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobMatcher {
    pub fn new() -> Self {
        Self {
            escape: '\\',
            case_sensitive: true,
            cache: RegexCache::default(),
        }
    }

    #[must_use]
    pub fn with_escape(mut self, escape: char) -> Self {
        self.escape = escape;
        self
    }

    #[must_use]
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Translate a glob into an anchored regular expression.
    #[must_use]
    pub fn to_regex(&self, pattern: &str) -> String {
        let mut expr = String::from("^");
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            if c == self.escape {
                match chars.next() {
                    Some(lit) => expr.push_str(&regex::escape(&lit.to_string())),
                    None => expr.push_str(&regex::escape(&c.to_string())),
                }
                continue;
            }
            match c {
                '[' if chars.peek() == Some(&'!') => {
                    _ = chars.next();
                    expr.push_str("[^");
                }
                _ => match GLOB_META.iter().find(|(m, _)| *m == c) {
                    Some((_, frag)) => expr.push_str(frag),
                    None => expr.push_str(&regex::escape(&c.to_string())),
                },
            }
        }
        expr.push('$');
        expr
    }
}

impl WildcardMatcher for GlobMatcher {
    fn metacharacters(&self) -> &'static [(char, &'static str)] {
        GLOB_META
    }

    fn escape_char(&self) -> Option<char> {
        Some(self.escape)
    }

    fn is_match(&self, name: &str, pattern: &str) -> bool {
        self.cache
            .is_match(&self.to_regex(pattern), self.case_sensitive, name)
    }

    fn is_valid_pattern(&self, pattern: &str) -> bool {
        Regex::new(&self.to_regex(pattern)).is_ok()
    }
}

/// Regular-expression matching; the pattern is used as written.
#[derive(Debug)]
pub struct RegexMatcher {
    case_sensitive: bool,
    cache: RegexCache,
}

impl Default for RegexMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RegexMatcher {
    pub fn new() -> Self {
        Self {
            case_sensitive: true,
            cache: RegexCache::default(),
        }
    }

    #[must_use]
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }
}

impl WildcardMatcher for RegexMatcher {
    fn metacharacters(&self) -> &'static [(char, &'static str)] {
        REGEX_META
    }

    fn is_match(&self, name: &str, pattern: &str) -> bool {
        self.cache.is_match(pattern, self.case_sensitive, name)
    }

    fn is_valid_pattern(&self, pattern: &str) -> bool {
        Regex::new(pattern).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_basic() {
        let m = GlobMatcher::new();
        assert!(m.is_match("file1.txt", "file?.txt"));
        assert!(!m.is_match("file10.txt", "file?.txt"));
        assert!(m.is_match("dir1", "dir*"));
        assert!(m.is_match("dir", "dir*"));
        assert!(!m.is_match("adir", "dir*"));
        assert!(m.is_match("b", "[abc]"));
        assert!(!m.is_match("d", "[abc]"));
        assert!(m.is_match("d", "[!abc]"));
    }

    #[test]
    fn test_glob_escapes_regex_syntax() {
        let m = GlobMatcher::new();
        assert!(m.is_match("a.b", "a.b"));
        assert!(!m.is_match("axb", "a.b"));
        assert!(m.is_match("(x)+", "(x)+"));
    }

    #[test]
    fn test_glob_literal_escape() {
        let m = GlobMatcher::new();
        assert!(m.is_match("a*", "a\\*"));
        assert!(!m.is_match("ab", "a\\*"));
        assert!(!m.contains_wildcard("a\\*"));
        assert!(m.contains_wildcard("a*"));
        assert_eq!(m.unescape("a\\*b\\\\"), "a*b\\");

        let m = GlobMatcher::new().with_escape('%');
        assert!(m.is_match("what?", "what%?"));
        assert!(!m.contains_wildcard("what%?"));
    }

    #[test]
    fn test_glob_case() {
        let m = GlobMatcher::new();
        assert!(!m.is_match("README", "read*"));
        let m = GlobMatcher::new().case_sensitive(false);
        assert!(m.is_match("README", "read*"));
    }

    #[test]
    fn test_glob_validity() {
        let m = GlobMatcher::new();
        assert!(m.is_valid_pattern("*.txt"));
        assert!(!m.is_valid_pattern("[abc"));
        assert!(!m.is_match("[abc", "[abc"));
    }

    #[test]
    fn test_regex_verbatim() {
        let m = RegexMatcher::new();
        assert!(m.is_match("file1.txt", "^file\\d\\.txt$"));
        assert!(m.is_match("my-dir1", "dir\\d"));
        assert!(m.contains_wildcard("a+"));
        assert!(!m.contains_wildcard("plain"));
        assert!(!m.is_valid_pattern("(unclosed"));
    }

    #[test]
    fn test_regex_escape_classes_are_patterns() {
        let m = RegexMatcher::new();
        assert!(m.contains_wildcard("\\d"));
        assert!(m.contains_wildcard("\\w"));
        assert_eq!(m.unescape("\\d"), "\\d");
        assert!(m.is_match("7", "^\\d$"));
        assert!(!m.is_match("d", "^\\d$"));
    }

    #[test]
    fn test_regex_cache_is_bounded() {
        let m = GlobMatcher::new();
        for i in 0..REGEX_CACHE_LIMIT * 2 {
            assert!(m.is_match(&format!("f{}", i), &format!("f{}*", i)));
            assert!(m.cache.compiled.borrow().len() <= REGEX_CACHE_LIMIT);
        }
        assert!(m.is_match("f0", "f0*"));
    }
}
