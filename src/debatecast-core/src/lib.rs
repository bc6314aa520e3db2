//! DebateCast Core Library
//!
//! Turn orchestration and prompt composition for scripted, multi-participant
//! spoken debates generated by external text-generation providers.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod participant;
pub mod prompt;
pub mod provider;
pub mod role;
pub mod schedule;
pub mod sink;
pub mod transcript;

pub use config::{Config, ProviderSettings};
pub use error::DebateError;
pub use orchestrator::{DebateCallback, DebateConfig, DebateEvent, DebateOrchestrator};
pub use participant::{Participant, Speaker};
pub use prompt::{PromptComposer, PromptInput, SpeechLimits};
pub use provider::{GenerationRequest, ProviderFailure, ProviderRegistry, TextGenerator};
pub use role::{Role, RoleRegistry};
pub use schedule::{
    ContextPolicy, ScriptedSchedule, Strategy, Turn, TurnScheduler, UniformRoundSchedule,
};
pub use sink::{FileSink, TranscriptSink};
pub use transcript::{Entry, Round, Transcript, TranscriptAccumulator, TranscriptBody};
