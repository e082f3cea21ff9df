//! Permission tokens: `domain:action` or the `*` wildcard.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const WILDCARD: &str = "*";

/// Structural form of a permission token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PermissionToken {
    Wildcard,
    Scoped { domain: String, action: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionTokenError {
    #[error("Permission token is empty")]
    Empty,
    #[error("Permission token '{0}' must have the form domain:action")]
    MissingSeparator(String),
    #[error("Permission token '{0}' contains invalid characters")]
    InvalidSegment(String),
}

fn valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

impl FromStr for PermissionToken {
    type Err = PermissionTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PermissionTokenError::Empty);
        }
        if s == WILDCARD {
            return Ok(PermissionToken::Wildcard);
        }

        let (domain, action) = s
            .split_once(':')
            .ok_or_else(|| PermissionTokenError::MissingSeparator(s.to_string()))?;

        if !valid_segment(domain) || !valid_segment(action) {
            return Err(PermissionTokenError::InvalidSegment(s.to_string()));
        }

        Ok(PermissionToken::Scoped {
            domain: domain.to_string(),
            action: action.to_string(),
        })
    }
}

impl fmt::Display for PermissionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionToken::Wildcard => f.write_str(WILDCARD),
            PermissionToken::Scoped { domain, action } => write!(f, "{}:{}", domain, action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scoped_token() {
        let token: PermissionToken = "finance:approve".parse().unwrap();
        assert_eq!(
            token,
            PermissionToken::Scoped {
                domain: "finance".to_string(),
                action: "approve".to_string()
            }
        );
        assert_eq!(token.to_string(), "finance:approve");
    }

    #[test]
    fn parses_wildcard() {
        assert_eq!("*".parse::<PermissionToken>(), Ok(PermissionToken::Wildcard));
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert_eq!("".parse::<PermissionToken>(), Err(PermissionTokenError::Empty));
        assert!(matches!(
            "finance".parse::<PermissionToken>(),
            Err(PermissionTokenError::MissingSeparator(_))
        ));
        assert!(matches!(
            "finance:".parse::<PermissionToken>(),
            Err(PermissionTokenError::InvalidSegment(_))
        ));
        assert!(matches!(
            "Finance:Approve".parse::<PermissionToken>(),
            Err(PermissionTokenError::InvalidSegment(_))
        ));
        assert!(matches!(
            "cases:read:all".parse::<PermissionToken>(),
            Err(PermissionTokenError::InvalidSegment(_))
        ));
    }
}
