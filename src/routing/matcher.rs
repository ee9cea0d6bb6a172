//! Path pattern parsing and matching.
//!
//! # Responsibilities
//! - Parse pattern strings such as `chat/` or `rooms/<int:id>/` once, at registration
//! - Match a request path against a parsed pattern (whole path, case-sensitive)
//! - Validate and format parameter values for reverse lookup
//!
//! # Design Decisions
//! - Exact match only: a pattern never matches a prefix of the path
//! - No regex; parameters are matched by character class with backtracking
//! - Captured values are returned in the order the pattern declares them

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error raised when a pattern string cannot be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern {0:?} starts with '/'; request paths are matched without the leading slash")]
    LeadingSlash(String),

    #[error("pattern {pattern:?} has an unterminated '<' at byte {offset}")]
    Unterminated { pattern: String, offset: usize },

    #[error("pattern {pattern:?} has an invalid parameter name {name:?}")]
    InvalidName { pattern: String, name: String },

    #[error("pattern {pattern:?} uses unknown converter {converter:?}")]
    UnknownConverter { pattern: String, converter: String },

    #[error("pattern {pattern:?} declares parameter {name:?} more than once")]
    DuplicateParameter { pattern: String, name: String },
}

/// Rule applied to the text captured by a pattern parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// Any non-empty text without `/`. The default.
    Str,
    /// ASCII digits.
    Int,
    /// ASCII letters, digits, hyphens and underscores.
    Slug,
    /// Lowercase hyphenated UUID.
    Uuid,
    /// Any non-empty text, `/` included.
    Path,
}

impl Converter {
    /// Whether `value` is a complete, valid capture for this converter.
    pub fn accepts(&self, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        match self {
            Converter::Str => !value.contains('/'),
            Converter::Int => value.bytes().all(|b| b.is_ascii_digit()),
            Converter::Slug => value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'),
            Converter::Uuid => is_lowercase_uuid(value),
            Converter::Path => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Converter::Str => "str",
            Converter::Int => "int",
            Converter::Slug => "slug",
            Converter::Uuid => "uuid",
            Converter::Path => "path",
        }
    }
}

impl FromStr for Converter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "str" => Ok(Converter::Str),
            "int" => Ok(Converter::Int),
            "slug" => Ok(Converter::Slug),
            "uuid" => Ok(Converter::Uuid),
            "path" => Ok(Converter::Path),
            _ => Err(()),
        }
    }
}

fn is_lowercase_uuid(value: &str) -> bool {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];
    let mut parts = value.split('-');
    for len in GROUPS {
        match parts.next() {
            Some(p) if p.len() == len => {
                if !p.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)) {
                    return false;
                }
            }
            _ => return false,
        }
    }
    parts.next().is_none()
}

/// One piece of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param { name: String, converter: Converter },
}

/// A parsed path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a pattern string.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        if raw.starts_with('/') {
            return Err(PatternError::LeadingSlash(raw.to_string()));
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = raw;

        while let Some(open) = rest.find('<') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('>').ok_or_else(|| PatternError::Unterminated {
                pattern: raw.to_string(),
                offset: raw.len() - rest.len() + open,
            })?;
            let spec = &after[..close];

            let (converter, name) = match spec.split_once(':') {
                Some((conv, name)) => {
                    let converter = conv.parse::<Converter>().map_err(|_| {
                        PatternError::UnknownConverter {
                            pattern: raw.to_string(),
                            converter: conv.to_string(),
                        }
                    })?;
                    (converter, name)
                }
                None => (Converter::Str, spec),
            };

            if !is_identifier(name) {
                return Err(PatternError::InvalidName {
                    pattern: raw.to_string(),
                    name: name.to_string(),
                });
            }
            let duplicate = segments
                .iter()
                .any(|s| matches!(s, Segment::Param { name: n, .. } if n == name));
            if duplicate {
                return Err(PatternError::DuplicateParameter {
                    pattern: raw.to_string(),
                    name: name.to_string(),
                });
            }

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Param {
                name: name.to_string(),
                converter,
            });
            rest = &after[close + 1..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The pattern as it was written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of the declared parameters, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Whether the pattern has no parameters.
    pub fn is_literal(&self) -> bool {
        self.param_names().next().is_none()
    }

    /// Match the whole of `path` (already stripped of its leading slash).
    ///
    /// Returns the captured parameters, or `None` when the path does not match.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let mut captures = Vec::new();
        if match_from(&self.segments, path, &mut captures) {
            Some(PathParams(captures))
        } else {
            None
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn match_from(segments: &[Segment], path: &str, captures: &mut Vec<(String, String)>) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        return path.is_empty();
    };

    match first {
        Segment::Literal(lit) => match path.strip_prefix(lit.as_str()) {
            Some(remaining) => match_from(rest, remaining, captures),
            None => false,
        },
        Segment::Param { name, converter } => {
            // Longest capture first, then shorter ones until the remainder matches.
            let ends: Vec<usize> = path
                .char_indices()
                .map(|(i, c)| i + c.len_utf8())
                .collect();
            for &end in ends.iter().rev() {
                let value = &path[..end];
                if !converter.accepts(value) {
                    continue;
                }
                captures.push((name.clone(), value.to_string()));
                if match_from(rest, &path[end..], captures) {
                    return true;
                }
                captures.pop();
            }
            false
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parameters captured from a matched path, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    /// Raw captured value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Captured value parsed as `T`.
    pub fn parse<T: FromStr>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
