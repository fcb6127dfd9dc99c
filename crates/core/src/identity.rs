// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Username to role classification from configured rules.

use crate::ports::IdentityResolver;
use registrar_domain::RoleTag;
use serde::{Deserialize, Serialize};

/// How a rule recognizes a username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UsernameMatcher {
    /// One of the listed usernames, ignoring case.
    Exact { usernames: Vec<String> },
    /// Starts with the value, ignoring case.
    Prefix { value: String },
    /// Contains the value, ignoring case.
    Contains { value: String },
    /// A numeric username carrying `code` at a fixed character offset.
    PositionCode { offset: usize, code: String },
}

impl UsernameMatcher {
    #[must_use]
    pub fn matches(&self, username: &str) -> bool {
        let username: String = username.trim().to_lowercase();
        if username.is_empty() {
            return false;
        }
        match self {
            Self::Exact { usernames } => usernames
                .iter()
                .any(|candidate| candidate.trim().to_lowercase() == username),
            Self::Prefix { value } => {
                !value.is_empty() && username.starts_with(&value.to_lowercase())
            }
            Self::Contains { value } => {
                !value.is_empty() && username.contains(&value.to_lowercase())
            }
            Self::PositionCode { offset, code } => {
                username.chars().all(|c| c.is_ascii_digit())
                    && !code.is_empty()
                    && username
                        .get(*offset..offset.saturating_add(code.len()))
                        .is_some_and(|slice| slice == code)
            }
        }
    }
}

/// Maps matching usernames to a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRule {
    pub role: RoleTag,
    pub matcher: UsernameMatcher,
}

/// Resolves roles by evaluating every rule.
///
/// A username matched by rules for different roles is ambiguous and stays
/// unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleBasedResolver {
    rules: Vec<RoleRule>,
}

impl RuleBasedResolver {
    #[must_use]
    pub const fn new(rules: Vec<RoleRule>) -> Self {
        Self { rules }
    }

    #[must_use]
    pub fn rules(&self) -> &[RoleRule] {
        &self.rules
    }
}

impl IdentityResolver for RuleBasedResolver {
    fn classify_role(&self, username: &str) -> Option<RoleTag> {
        let mut matched: Option<RoleTag> = None;
        for rule in self.rules.iter().filter(|rule| rule.matcher.matches(username)) {
            match matched {
                None => matched = Some(rule.role),
                Some(role) if role == rule.role => {}
                Some(_) => return None,
            }
        }
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> RuleBasedResolver {
        RuleBasedResolver::new(vec![
            RoleRule {
                role: RoleTag::Wadir1,
                matcher: UsernameMatcher::Exact {
                    usernames: vec![String::from("wadir1")],
                },
            },
            RoleRule {
                role: RoleTag::Prodi,
                matcher: UsernameMatcher::Prefix {
                    value: String::from("kaprodi"),
                },
            },
            RoleRule {
                role: RoleTag::Prodi,
                matcher: UsernameMatcher::PositionCode {
                    offset: 4,
                    code: String::from("21"),
                },
            },
            RoleRule {
                role: RoleTag::Direktur,
                matcher: UsernameMatcher::Contains {
                    value: String::from("direktur"),
                },
            },
        ])
    }

    #[test]
    fn test_classify_known_usernames() {
        let resolver: RuleBasedResolver = resolver();
        assert_eq!(resolver.classify_role("WADIR1"), Some(RoleTag::Wadir1));
        assert_eq!(resolver.classify_role("kaprodi.ti"), Some(RoleTag::Prodi));
        assert_eq!(resolver.classify_role("19852101"), Some(RoleTag::Prodi));
        assert_eq!(resolver.classify_role("pa.direktur"), Some(RoleTag::Direktur));
    }

    #[test]
    fn test_unknown_username_is_unresolved() {
        let resolver: RuleBasedResolver = resolver();
        assert_eq!(resolver.classify_role("student01"), None);
        assert_eq!(resolver.classify_role("   "), None);
        // Not numeric, so the position rule does not apply.
        assert_eq!(resolver.classify_role("abcd21xx"), None);
    }

    #[test]
    fn test_ambiguous_username_is_unresolved() {
        let resolver: RuleBasedResolver = resolver();
        assert_eq!(resolver.classify_role("kaprodi.direktur"), None);
    }
}
