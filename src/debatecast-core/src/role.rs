//! Role/persona registry for the scripted debate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::RoleConfig;
use crate::error::DebateError;

/// Role id of the moderator.
pub const MODERATOR: &str = "MOD";
/// Role id of the first debater.
pub const DEBATER_A: &str = "A";
/// Role id of the second debater.
pub const DEBATER_B: &str = "B";

/// A static speaking role. Immutable for the life of a debate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub display_name: String,
    pub persona: String,
    /// Provider binding that answers for this role.
    pub provider: String,
}

/// Read-only lookup of roles by id.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    roles: BTreeMap<String, Role>,
}

impl RoleRegistry {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }

    /// Build the registry from the `[roles]` table of a config file.
    pub fn from_config(roles: &BTreeMap<String, RoleConfig>) -> Self {
        Self::new(roles.iter().map(|(id, cfg)| Role {
            id: id.clone(),
            display_name: cfg.display_name.clone().unwrap_or_else(|| id.clone()),
            persona: cfg.persona.clone(),
            provider: cfg.provider.clone(),
        }))
    }

    pub fn get(&self, id: &str) -> Result<&Role, DebateError> {
        self.roles
            .get(id)
            .ok_or_else(|| DebateError::UnknownRole(id.to_string()))
    }

    /// Roles ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: &str, provider: &str) -> Role {
        Role {
            id: id.to_string(),
            display_name: format!("Role {id}"),
            persona: format!("You are {id}."),
            provider: provider.to_string(),
        }
    }

    #[test]
    fn test_get_known_role() {
        let registry = RoleRegistry::new([role(MODERATOR, "openai"), role(DEBATER_B, "gemini")]);
        let b = registry.get(DEBATER_B).unwrap();
        assert_eq!(b.provider, "gemini");
        assert_eq!(b.persona, "You are B.");
    }

    #[test]
    fn test_get_unknown_role() {
        let registry = RoleRegistry::new([role(MODERATOR, "openai")]);
        let err = registry.get("C").unwrap_err();
        assert!(matches!(err, DebateError::UnknownRole(ref id) if id == "C"));
    }

    #[test]
    fn test_from_config_defaults_display_name_to_id() {
        let mut roles = BTreeMap::new();
        roles.insert(
            "A".to_string(),
            RoleConfig {
                display_name: None,
                persona: "Argue for.".to_string(),
                provider: "openai".to_string(),
            },
        );
        let registry = RoleRegistry::from_config(&roles);
        assert_eq!(registry.get("A").unwrap().display_name, "A");
        let ids: Vec<&str> = registry.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["A"]);
    }
}
