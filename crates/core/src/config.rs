// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Registrar configuration.
//!
//! Loaded once at startup from a JSON file and immutable afterwards.

use crate::identity::{RoleRule, RuleBasedResolver};
use registrar_domain::{ApprovalPolicy, DEFAULT_ORGANIZATION, DomainError, PolicyTable};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid approval policy: {0}")]
    Policy(#[from] DomainError),
}

fn default_organization() -> String {
    DEFAULT_ORGANIZATION.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrarConfig {
    /// Organization code rendered into identifiers.
    #[serde(default = "default_organization")]
    pub organization_code: String,
    /// Replaces the standard policy table when present.
    #[serde(default)]
    pub policies: Option<Vec<ApprovalPolicy>>,
    #[serde(default)]
    pub identity_rules: Vec<RoleRule>,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            organization_code: default_organization(),
            policies: None,
            identity_rules: Vec::new(),
        }
    }
}

impl RegistrarConfig {
    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw: String = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parses configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Builds the policy table.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured policies are inconsistent.
    pub fn policy_table(&self) -> Result<PolicyTable, ConfigError> {
        let table: PolicyTable = match &self.policies {
            Some(policies) => PolicyTable::new(self.organization_code.clone(), policies.clone())?,
            None => PolicyTable::standard(self.organization_code.clone())?,
        };
        Ok(table)
    }

    #[must_use]
    pub fn identity_resolver(&self) -> RuleBasedResolver {
        RuleBasedResolver::new(self.identity_rules.clone())
    }
}
