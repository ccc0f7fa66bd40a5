//! Environment variable expansion for configuration strings.
//!
//! Supports `$NAME` and `${NAME}`. References to variables that are not set
//! are left in place verbatim, so a literal `$` in a path survives.

use std::borrow::Cow;
use std::env;
use std::sync::OnceLock;

use regex::{Captures, Regex};

fn var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$(?:\{([^}]+)\}|([A-Za-z_][A-Za-z0-9_]*))")
            .expect("env var pattern is a valid regex")
    })
}

#[must_use]
pub fn expand_env_vars(value: &str) -> Cow<'_, str> {
    if !value.contains('$') {
        return Cow::Borrowed(value);
    }
    var_pattern().replace_all(value, |caps: &Captures<'_>| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str());
        match env::var(name) {
            Ok(replacement) => replacement,
            Err(_) => caps[0].to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::expand_env_vars;

    #[test]
    fn expands_both_forms() {
        let path = std::env::var("PATH").expect("PATH is set in test environments");
        assert_eq!(expand_env_vars("$PATH"), path);
        assert_eq!(expand_env_vars("x/${PATH}/y"), format!("x/{path}/y"));
    }

    #[test]
    fn leaves_unset_references_untouched() {
        let raw = "/data/$FIELDWORK_SURELY_UNSET_VAR_1234/${ALSO_UNSET_4321}";
        assert_eq!(expand_env_vars(raw), raw);
    }

    #[test]
    fn plain_strings_are_borrowed() {
        assert!(matches!(
            expand_env_vars("/plain/path"),
            std::borrow::Cow::Borrowed(_)
        ));
    }
}
