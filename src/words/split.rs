//! Identifier splitting
//!
//! Python function names are expected in snake_case, Java method names in
//! camelCase. Names that do not follow their language's convention are
//! skipped.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source language of an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Java,
}

impl Language {
    /// Name of the per-language counter field on a word document
    pub fn counter_field(&self) -> &'static str {
        match self {
            Language::Python => "python_value",
            Language::Java => "java_value",
        }
    }

    pub fn all() -> [Language; 2] {
        [Language::Python, Language::Java]
    }

    /// Split `identifier` into lowercase words, or `None` if it does not
    /// follow this language's naming convention
    pub fn split(&self, identifier: &str) -> Option<Vec<String>> {
        match self {
            Language::Python if is_snake_case(identifier) => Some(snake_case_split(identifier)),
            Language::Java if is_camel_case(identifier) => Some(camel_case_split(identifier)),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Python => write!(f, "python"),
            Language::Java => write!(f, "java"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            other => Err(format!("unsupported language: {}", other)),
        }
    }
}

/// Lowercase letters (any script, so `café_au_lait` qualifies), digits and
/// underscores only
pub fn is_snake_case(identifier: &str) -> bool {
    !identifier.is_empty()
        && identifier
            .chars()
            .all(|c| c.is_lowercase() || c.is_ascii_digit() || c == '_')
}

/// No underscores and a lowercase (or non-letter) first character
pub fn is_camel_case(identifier: &str) -> bool {
    let mut chars = identifier.chars();
    match chars.next() {
        Some(first) if !first.is_ascii_uppercase() => {
            first != '_' && chars.all(|c| c.is_ascii_alphanumeric() || c == '$')
        }
        _ => false,
    }
}

pub fn snake_case_split(identifier: &str) -> Vec<String> {
    identifier
        .split('_')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Split at lower→Upper transitions, and before the last capital of an
/// acronym that is followed by a lowercase letter (`parseHTTPResponse` →
/// `parse`, `http`, `response`)
pub fn camel_case_split(identifier: &str) -> Vec<String> {
    let chars: Vec<char> = identifier.chars().collect();
    let mut words = Vec::new();
    let mut start = 0;

    for i in 1..chars.len() {
        let prev = chars[i - 1];
        let cur = chars[i];
        let lower_to_upper = prev.is_ascii_lowercase() && cur.is_ascii_uppercase();
        let acronym_end = prev.is_ascii_uppercase()
            && cur.is_ascii_uppercase()
            && chars.get(i + 1).is_some_and(|next| next.is_ascii_lowercase());

        if lower_to_upper || acronym_end {
            words.push(chars[start..i].iter().collect::<String>().to_lowercase());
            start = i;
        }
    }

    if start < chars.len() {
        words.push(chars[start..].iter().collect::<String>().to_lowercase());
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case_detection() {
        assert!(is_snake_case("get_user_name"));
        assert!(is_snake_case("__init__"));
        assert!(is_snake_case("parse2"));
        assert!(!is_snake_case("getUserName"));
        assert!(!is_snake_case("Get_user"));
        assert!(!is_snake_case(""));
    }

    #[test]
    fn test_snake_case_accepts_non_ascii_lowercase() {
        assert!(is_snake_case("café_au_lait"));
        assert!(is_snake_case("größe_2"));
        assert!(!is_snake_case("Café_au_lait"));
        assert_eq!(
            Language::Python.split("café_au_lait"),
            Some(vec!["café".to_string(), "au".to_string(), "lait".to_string()])
        );
    }

    #[test]
    fn test_camel_case_detection() {
        assert!(is_camel_case("getUserName"));
        assert!(is_camel_case("run"));
        assert!(is_camel_case("toURL"));
        assert!(!is_camel_case("GetUserName"));
        assert!(!is_camel_case("get_user"));
        assert!(!is_camel_case(""));
    }

    #[test]
    fn test_snake_case_split() {
        assert_eq!(snake_case_split("get_user_name"), vec!["get", "user", "name"]);
        assert_eq!(snake_case_split("__init__"), vec!["init"]);
    }

    #[test]
    fn test_camel_case_split() {
        assert_eq!(camel_case_split("getUserName"), vec!["get", "user", "name"]);
        assert_eq!(
            camel_case_split("parseHTTPResponse"),
            vec!["parse", "http", "response"]
        );
        assert_eq!(camel_case_split("toURL"), vec!["to", "url"]);
        assert_eq!(camel_case_split("get2D"), vec!["get2d"]);
        assert_eq!(camel_case_split("run"), vec!["run"]);
    }

    #[test]
    fn test_language_split_respects_convention() {
        assert_eq!(
            Language::Python.split("load_config"),
            Some(vec!["load".to_string(), "config".to_string()])
        );
        assert_eq!(Language::Python.split("loadConfig"), None);
        assert_eq!(
            Language::Java.split("loadConfig"),
            Some(vec!["load".to_string(), "config".to_string()])
        );
        assert_eq!(Language::Java.split("load_config"), None);
    }

    #[test]
    fn test_language_parse_and_fields() {
        assert_eq!("Python".parse::<Language>().unwrap(), Language::Python);
        assert_eq!("java".parse::<Language>().unwrap(), Language::Java);
        assert!("rust".parse::<Language>().is_err());
        assert_eq!(Language::Java.counter_field(), "java_value");
        assert_eq!(Language::Python.to_string(), "python");
    }
}
