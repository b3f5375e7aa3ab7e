//! Callback parameter inspection and chat input naming rules
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use regex::Regex;
use std::sync::OnceLock;

use super::callback::CommandCallback;
use crate::core::{CloudyError, Logger};

/// Leading parameters every callback declares that are not slash options
/// (the droplet).
pub const IMPLICIT_PARAMETERS: usize = 1;

/// Discord's chat input naming rule, see
/// <https://discord.com/developers/docs/interactions/application-commands#application-command-object-application-command-naming>
const CHAT_INPUT_PATTERN: &str = r"^[-_\p{L}\p{N}\p{Devanagari}\p{Thai}]{1,32}$";

static CHAT_INPUT_NAME: OnceLock<Option<Regex>> = OnceLock::new();

fn chat_input_regex() -> Option<&'static Regex> {
    CHAT_INPUT_NAME
        .get_or_init(|| Regex::new(CHAT_INPUT_PATTERN).ok())
        .as_ref()
}

/// Parameter names after the implicit context, in declaration order
pub fn inspect(callback: &dyn CommandCallback, logger: &Logger) -> Result<Vec<String>, CloudyError> {
    let mut declared = callback.parameters();
    if declared.len() < IMPLICIT_PARAMETERS {
        return Err(CloudyError::schema(
            callback.identifier(),
            declared.len(),
            IMPLICIT_PARAMETERS,
            logger,
        ));
    }
    Ok(declared.split_off(IMPLICIT_PARAMETERS))
}

pub fn matches_chat_input(name: &str) -> bool {
    chat_input_regex().is_some_and(|re| re.is_match(name))
}

/// True when the name has cased characters and all of them are uppercase
pub fn is_uppercase(name: &str) -> bool {
    let mut cased = false;
    for c in name.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Whether Discord accepts `name` for a command or option
pub fn is_valid_name(name: &str) -> bool {
    !is_uppercase(name) && matches_chat_input(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::callback::callback;

    #[test]
    fn test_pattern_compiles() {
        assert!(chat_input_regex().is_some());
    }

    #[test]
    fn test_inspect_drops_context() {
        let cb = callback("hello", &["droplet", "name", "age"], |_, _| async { Ok(()) });
        let params = inspect(cb.as_ref(), &Logger::default()).unwrap();
        assert_eq!(params, vec!["name", "age"]);
    }

    #[test]
    fn test_inspect_context_only() {
        let cb = callback("ping", &["droplet"], |_, _| async { Ok(()) });
        assert!(inspect(cb.as_ref(), &Logger::default()).unwrap().is_empty());
    }

    #[test]
    fn test_inspect_missing_context_fails() {
        let cb = callback("broken", &[], |_, _| async { Ok(()) });
        let err = inspect(cb.as_ref(), &Logger::default()).unwrap_err();
        assert!(matches!(
            err,
            CloudyError::Schema { declared: 0, implicit: 1, .. }
        ));
    }

    #[test]
    fn test_valid_names() {
        for name in ["name", "user_id", "max-length", "a", "Name", "v2", "名前", "नमस्ते", "สวัสดี"] {
            assert!(is_valid_name(name), "{name} should be valid");
        }
        assert!(is_valid_name(&"a".repeat(32)));
    }

    #[test]
    fn test_uppercase_rejected() {
        assert!(is_uppercase("NAME"));
        assert!(is_uppercase("USER_ID2"));
        assert!(!is_uppercase("Name"));
        assert!(!is_uppercase("123"));
        assert!(!is_valid_name("NAME"));
    }

    #[test]
    fn test_bad_characters_rejected() {
        for name in ["", "has space", "dot.name", "emoji☁", "slash/name"] {
            assert!(!is_valid_name(name), "{name:?} should be invalid");
        }
    }

    #[test]
    fn test_length_counts_code_points() {
        assert!(!is_valid_name(&"a".repeat(33)));
        // 32 three-byte characters is still within the limit
        assert!(is_valid_name(&"名".repeat(32)));
        assert!(!is_valid_name(&"名".repeat(33)));
    }
}
