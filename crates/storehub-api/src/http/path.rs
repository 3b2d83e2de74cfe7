//! Path pattern matching.

use regex::Regex;

use crate::error::{ApiError, Result};
use crate::http::request::PathParams;

/// A compiled path pattern for matching URLs.
///
/// Pattern syntax:
/// - `/api/stores` - Literal path
/// - `/api/stores/{id}` - Path with a parameter matching one segment
#[derive(Debug, Clone)]
pub struct PathPattern {
    pattern: String,
    regex: Regex,
    param_names: Vec<String>,
}

impl PathPattern {
    /// Compiles a path pattern.
    ///
    /// ```
    /// use storehub_api::http::PathPattern;
    ///
    /// let pattern = PathPattern::new("/api/menu-items/{id}").unwrap();
    /// let params = pattern.match_path("/api/menu-items/12").unwrap();
    /// assert_eq!(params.get("id"), Some("12"));
    /// ```
    pub fn new(pattern: &str) -> Result<Self> {
        let mut param_names = Vec::new();
        let mut regex_str = String::from("^");

        for part in pattern.split('/').filter(|s| !s.is_empty()) {
            regex_str.push('/');

            if let Some(param) = part.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                if param.is_empty() || param.contains(['{', '}', '/']) {
                    return Err(ApiError::InvalidPattern(pattern.to_string()));
                }
                param_names.push(param.to_string());
                regex_str.push_str("([^/]+)");
            } else {
                regex_str.push_str(&regex::escape(part));
            }
        }

        regex_str.push_str("/?$");

        let regex = Regex::new(&regex_str)
            .map_err(|err| ApiError::InvalidPattern(format!("{pattern}: {err}")))?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            param_names,
        })
    }

    /// Attempts to match a path against this pattern.
    ///
    /// Returns extracted parameters if the path matches.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let caps = self.regex.captures(path)?;

        let mut params = PathParams::new();
        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(value) = caps.get(i + 1) {
                params.insert(name.clone(), value.as_str());
            }
        }

        Some(params)
    }

    /// Returns the original pattern string.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_path() {
        let pattern = PathPattern::new("/api/stores").unwrap();
        assert!(pattern.match_path("/api/stores").is_some());
        assert!(pattern.match_path("/api/stores/").is_some());
        assert!(pattern.match_path("/api/stores/1").is_none());
        assert!(pattern.match_path("/api/menu-items").is_none());
    }

    #[test]
    fn test_single_param() {
        let pattern = PathPattern::new("/api/fare-rates/{id}").unwrap();
        let params = pattern.match_path("/api/fare-rates/1").unwrap();
        assert_eq!(params.get("id"), Some("1"));
        assert!(pattern.match_path("/api/fare-rates/1/extra").is_none());
    }

    #[test]
    fn test_literal_is_escaped() {
        let pattern = PathPattern::new("/api/v1.0").unwrap();
        assert!(pattern.match_path("/api/v1x0").is_none());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            PathPattern::new("/api/{}"),
            Err(ApiError::InvalidPattern(_))
        ));
    }
}
