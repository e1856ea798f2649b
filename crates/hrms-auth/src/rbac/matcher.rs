//! Segment-wise path templates such as `/salary/edit/:id`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A route pattern whose `:name` segments match any single non-empty
/// segment.
///
/// Both the pattern and the candidate path are split on `/` and compared
/// position by position; the segment counts must be equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a pattern. Every string is a valid pattern.
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();

        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns `true` if the template has at least one parameter.
    pub fn is_parameterized(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Param(_)))
    }

    /// Names of the parameters, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Returns `true` if `path` matches the template.
    pub fn matches(&self, path: &str) -> bool {
        let mut candidate = path.split('/');
        for segment in &self.segments {
            let Some(part) = candidate.next() else {
                return false;
            };
            let ok = match segment {
                Segment::Literal(lit) => lit == part,
                Segment::Param(_) => !part.is_empty(),
            };
            if !ok {
                return false;
            }
        }
        candidate.next().is_none()
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for PathTemplate {
    fn from(pattern: &str) -> Self {
        Self::parse(pattern)
    }
}
