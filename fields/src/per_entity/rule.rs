use std::fmt;

use fieldwork_types::{EntityId, FieldError};
use globset::{GlobBuilder, GlobMatcher};

/// Case-sensitive shell-style pattern over entity type names.
///
/// Only `*`, `?` and `[...]` are special. Braces and backslashes match
/// themselves.
#[derive(Clone)]
pub struct TypePattern {
    pattern: String,
    // `None` for the bare wildcard.
    matcher: Option<GlobMatcher>,
}

impl TypePattern {
    pub fn new(pattern: impl Into<String>) -> Result<Self, FieldError> {
        let pattern = pattern.into();
        if pattern == "*" {
            return Ok(Self::wildcard());
        }
        let glob = GlobBuilder::new(&literal_braces(&pattern))
            .case_insensitive(false)
            .literal_separator(false)
            .backslash_escape(false)
            .build()
            .map_err(|e| FieldError::validation(format!("invalid type pattern '{pattern}': {e}")))?;
        Ok(Self {
            matcher: Some(glob.compile_matcher()),
            pattern,
        })
    }

    #[must_use]
    pub fn wildcard() -> Self {
        Self {
            pattern: "*".to_string(),
            matcher: None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn is_match(&self, type_name: &str) -> bool {
        self.matcher
            .as_ref()
            .is_none_or(|matcher| matcher.is_match(type_name))
    }

    /// The bare `*` wildcard, which also sets the global default.
    #[must_use]
    pub fn matches_all(&self) -> bool {
        self.matcher.is_none()
    }
}

/// Wrap `{` and `}` outside character classes in a class of their own, so
/// the glob engine never reads them as alternation.
fn literal_braces(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;
    while let Some(c) = chars.next() {
        match c {
            '[' if !in_class => {
                in_class = true;
                out.push(c);
                // A leading `!` negates, and a `]` right after that is a member.
                if let Some(negate) = chars.next_if_eq(&'!') {
                    out.push(negate);
                }
                if let Some(bracket) = chars.next_if_eq(&']') {
                    out.push(bracket);
                }
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            '{' | '}' if !in_class => {
                out.push('[');
                out.push(c);
                out.push(']');
            }
            _ => out.push(c),
        }
    }
    out
}

impl PartialEq for TypePattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for TypePattern {}

impl fmt::Debug for TypePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypePattern").field(&self.pattern).finish()
    }
}

impl fmt::Display for TypePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// What a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Type(TypePattern),
    Id(EntityId),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Type(pattern) => write!(f, "type '{pattern}'"),
            Selector::Id(id) => write!(f, "id {id}"),
        }
    }
}

/// One override: a selector plus an already-validated value.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule<T> {
    pub selector: Selector,
    pub value: T,
}

impl<T> Rule<T> {
    pub fn for_type(pattern: &str, value: T) -> Result<Self, FieldError> {
        Ok(Self {
            selector: Selector::Type(TypePattern::new(pattern)?),
            value,
        })
    }

    pub fn for_id(id: impl Into<EntityId>, value: T) -> Self {
        Self {
            selector: Selector::Id(id.into()),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_are_case_sensitive_globs() {
        let lst = TypePattern::new("LST*").unwrap();
        assert!(lst.is_match("LST_LST_LSTCam"));
        assert!(!lst.is_match("lst_x"));
        assert!(!lst.is_match("MST_MST_FlashCam"));

        let any_cam = TypePattern::new("*_?ST_*Cam").unwrap();
        assert!(any_cam.is_match("LST_LST_LSTCam"));
        assert!(!any_cam.matches_all());
    }

    #[test]
    fn braces_and_backslashes_are_literal() {
        let braces = TypePattern::new("LST_{X,Y}").unwrap();
        assert!(!braces.is_match("LST_X"));
        assert!(!braces.is_match("LST_Y"));
        assert!(braces.is_match("LST_{X,Y}"));
        assert_eq!(braces.as_str(), "LST_{X,Y}");

        let backslash = TypePattern::new(r"LST\*").unwrap();
        assert!(backslash.is_match(r"LST\LSTCam"));
        assert!(!backslash.is_match("LST*"));

        let in_class = TypePattern::new("[{L]ST_*").unwrap();
        assert!(in_class.is_match("{ST_X"));
        assert!(in_class.is_match("LST_X"));
    }

    #[test]
    fn character_classes_work() {
        let pattern = TypePattern::new("[LM]ST_*").unwrap();
        assert!(pattern.is_match("MST_X"));
        assert!(!pattern.is_match("SST_X"));
    }

    #[test]
    fn invalid_pattern_is_a_validation_error() {
        let err = TypePattern::new("LST[").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("LST["));
    }

    #[test]
    fn equality_uses_pattern_text() {
        assert_eq!(TypePattern::new("*").unwrap(), TypePattern::new("*").unwrap());
        assert_eq!(
            Rule::for_type("*", 1.0).unwrap().selector.to_string(),
            "type '*'"
        );
        assert_eq!(Rule::for_id(3u32, 1.0).selector.to_string(), "id 3");
    }
}
