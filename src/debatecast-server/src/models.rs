//! Request and response bodies of the debate API.

use debatecast_core::{Participant, Transcript, TranscriptBody};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ROUNDS: u32 = 3;
pub const MIN_ROUNDS: u32 = 1;
pub const MAX_ROUNDS: u32 = 10;

fn default_rounds() -> u32 {
    DEFAULT_ROUNDS
}

/// One debater as sent by the client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParticipantPayload {
    pub name: String,
    pub persona: String,
    /// Provider binding, e.g. "gpt" or "gemini".
    #[serde(alias = "provider")]
    pub model: String,
}

impl From<&ParticipantPayload> for Participant {
    fn from(payload: &ParticipantPayload) -> Self {
        Participant::new(&payload.name, &payload.persona, &payload.model)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DebateRequest {
    pub topic: String,
    #[serde(default = "default_rounds", alias = "round_count")]
    pub rounds: u32,
    #[serde(default, alias = "extra_directive")]
    pub extra_prompt: Option<String>,
    pub participants: Vec<ParticipantPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EntryPayload {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RoundPayload {
    pub round: u32,
    pub entries: Vec<EntryPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DebateResponse {
    pub topic: String,
    pub rounds: Vec<RoundPayload>,
}

impl From<Transcript> for DebateResponse {
    fn from(transcript: Transcript) -> Self {
        let rounds = match transcript.body {
            TranscriptBody::Rounds(rounds) => rounds
                .into_iter()
                .map(|round| RoundPayload {
                    round: round.number,
                    entries: round
                        .entries
                        .into_iter()
                        .map(|e| EntryPayload {
                            name: e.speaker,
                            text: e.text,
                        })
                        .collect(),
                })
                .collect(),
            // Ungrouped transcripts come back as a single round.
            TranscriptBody::Segments(segments) => vec![RoundPayload {
                round: 1,
                entries: segments
                    .into_iter()
                    .map(|e| EntryPayload {
                        name: e.speaker,
                        text: e.text,
                    })
                    .collect(),
            }],
        };

        Self {
            topic: transcript.topic,
            rounds,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}
