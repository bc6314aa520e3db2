//! Debate participant definitions.
//!
//! A [`Participant`] is supplied per request by the service surface. Both
//! participants and registry roles are reduced to a [`Speaker`] before
//! scheduling, which is all the run loop needs to know about who is talking.

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Someone who can be given a turn: a name, persona text and the provider
/// binding that answers for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    /// Label used in prompts, history lines and transcript entries.
    pub name: String,
    /// Persona instructions, embedded verbatim into prompts.
    pub persona: String,
    /// Provider binding, e.g. "gpt" or "gemini".
    pub provider: String,
}

impl Speaker {
    pub fn new(
        name: impl Into<String>,
        persona: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            persona: persona.into(),
            provider: provider.into(),
        }
    }
}

/// A participant in a uniform-round debate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    /// Display name for this participant.
    pub name: String,
    /// Free-form persona description.
    pub persona: String,
    /// Which provider answers for this participant.
    pub provider: String,
}

impl Participant {
    /// Create a new participant with the given name, persona and provider binding.
    pub fn new(
        name: impl Into<String>,
        persona: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            persona: persona.into(),
            provider: provider.into(),
        }
    }

    pub fn as_speaker(&self) -> Speaker {
        Speaker::new(&self.name, &self.persona, &self.provider)
    }
}

impl From<&Role> for Speaker {
    /// Roles speak under their id ("MOD", "A", ...), which is also the label
    /// other roles see in the shared history.
    fn from(role: &Role) -> Self {
        Speaker::new(&role.id, &role.persona, &role.provider)
    }
}
