//! Keyword matching over extracted listing text
//!
//! A listing matches when the configured pattern occurs anywhere in its
//! title or body. The hits reported for a listing are the distinct matched
//! fragments, compared case-insensitively, in order of first appearance.

use crate::ConfigError;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Text extracted from one listing detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub url: String,
    pub title: String,
    pub body: String,
}

impl Post {
    /// Title and body joined by a line break, the text the pattern runs on
    pub fn content(&self) -> String {
        format!("{}\n{}", self.title, self.body)
    }
}

/// A listing whose text matched at least once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub url: String,
    pub title: String,
    /// Distinct hits, never empty
    pub hits: Vec<String>,
}

/// Compiled, case-insensitive match pattern
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    /// Compiles `pattern` case-insensitively
    ///
    /// Alternation is leftmost-first, as in Perl-style engines: at a given
    /// position the first branch that matches wins, not the longest one. With
    /// `mario|mario kart` the hit is `mario`; list longer branches first to
    /// prefer them.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;
        Ok(Self { regex })
    }

    /// Collects the distinct hits in `content`
    ///
    /// The pattern runs on one line at a time, so a hit never spans a line
    /// break. Within a line matches are non-overlapping and taken left to
    /// right. A fragment whose lowercase form was already seen on any line is
    /// skipped, so the first spelling wins. Empty matches never count as hits.
    pub fn hits(&self, content: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        content
            .split('\n')
            .flat_map(|line| self.regex.find_iter(line))
            .map(|m| m.as_str())
            .filter(|fragment| !fragment.is_empty())
            .filter(|fragment| seen.insert(fragment.to_lowercase()))
            .map(str::to_string)
            .collect()
    }

    /// Matches a post, returning None when nothing in it matches
    pub fn match_post(&self, post: &Post) -> Option<MatchResult> {
        let hits = self.hits(&post.content());
        if hits.is_empty() {
            return None;
        }

        Some(MatchResult {
            url: post.url.clone(),
            title: post.title.clone(),
            hits,
        })
    }
}
