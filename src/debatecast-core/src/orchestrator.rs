//! Debate orchestration logic.
//!
//! Drives a [`TurnScheduler`] to completion: compose a prompt, make exactly one
//! provider call, record the entry, then advance. Any failure aborts the run.

use tracing::{debug, info, warn};

use crate::error::DebateError;
use crate::prompt::{PromptComposer, PromptInput};
use crate::provider::{GenerationRequest, ProviderRegistry};
use crate::schedule::{ContextPolicy, Strategy, Turn, TurnScheduler};
use crate::transcript::{Entry, Transcript, TranscriptAccumulator, TranscriptBody};

/// Default output language of every speaker.
pub const DEFAULT_LANGUAGE: &str = "Turkish";

/// Configuration for running a debate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebateConfig {
    /// The topic being debated.
    pub topic: String,
    /// Number of rounds; at least 1.
    pub round_count: u32,
    /// Extra rule applied to every speaker.
    pub extra_directive: Option<String>,
    /// Language every speaker must answer in.
    pub language: String,
}

impl DebateConfig {
    pub fn new(topic: impl Into<String>, round_count: u32) -> Self {
        Self {
            topic: topic.into(),
            round_count,
            extra_directive: None,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Set the debate-wide extra directive. Blank directives are ignored.
    pub fn with_extra_directive(mut self, directive: impl Into<String>) -> Self {
        let directive = directive.into();
        self.extra_directive = (!directive.trim().is_empty()).then_some(directive);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn validate(&self) -> Result<(), DebateError> {
        if self.round_count < 1 {
            return Err(DebateError::Validation(
                "round count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Callback for debate events.
pub type DebateCallback = Box<dyn Fn(DebateEvent) + Send + Sync>;

/// Events emitted during a debate.
#[derive(Debug, Clone)]
pub enum DebateEvent {
    /// A speaker is about to be asked for a turn.
    TurnStart { label: String, speaker: String },
    /// A turn finished and its entry was recorded.
    TurnComplete {
        label: String,
        speaker: String,
        text: String,
    },
    /// The debate has concluded.
    DebateEnd,
}

/// Runs one debate from a scheduler to a finished transcript.
pub struct DebateOrchestrator<'a> {
    config: DebateConfig,
    schedule: Box<dyn TurnScheduler + 'a>,
    providers: &'a ProviderRegistry,
    composer: PromptComposer,
    transcript: TranscriptAccumulator,
    current_round: Option<u32>,
    callback: Option<DebateCallback>,
}

impl<'a> DebateOrchestrator<'a> {
    /// Create a new orchestrator for the given schedule.
    pub fn new(
        config: DebateConfig,
        schedule: Box<dyn TurnScheduler + 'a>,
        providers: &'a ProviderRegistry,
    ) -> Result<Self, DebateError> {
        config.validate()?;
        let composer = PromptComposer::new(&config.language, schedule.speech_limits());

        Ok(Self {
            config,
            schedule,
            providers,
            composer,
            transcript: TranscriptAccumulator::new(),
            current_round: None,
            callback: None,
        })
    }

    /// Set a callback for debate events.
    pub fn with_callback(mut self, callback: DebateCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Run the full debate.
    ///
    /// On success the accumulated entries are handed off in the returned
    /// transcript. On failure nothing is returned; entries recorded before the
    /// failing turn stay visible through [`entries`](Self::entries).
    pub async fn run(&mut self) -> Result<Transcript, DebateError> {
        for speaker in self.schedule.speakers() {
            self.providers
                .ensure_supported(&speaker.provider, &speaker.name)?;
        }

        let strategy = self.schedule.strategy();
        let context = self.schedule.context_policy();
        info!(
            topic = %self.config.topic,
            %strategy,
            rounds = self.config.round_count,
            turns = self.schedule.total_turns(),
            "debate started"
        );

        while let Some(turn) = self.schedule.next() {
            self.run_turn(turn, context).await?;
        }

        self.emit_event(DebateEvent::DebateEnd);
        info!(entries = self.transcript.len(), "debate finished");

        let accumulated = std::mem::take(&mut self.transcript);
        let body = match strategy {
            Strategy::UniformRound => TranscriptBody::Rounds(accumulated.into_rounds()),
            Strategy::ScriptedSegments => TranscriptBody::Segments(accumulated.into_segments()),
        };

        Ok(Transcript {
            topic: self.config.topic.clone(),
            body,
        })
    }

    /// Run a single turn and record its entry.
    async fn run_turn(&mut self, turn: Turn, context: ContextPolicy) -> Result<(), DebateError> {
        if self.current_round != Some(turn.round_index) {
            self.current_round = Some(turn.round_index);
            self.transcript.begin_round();
        }

        self.emit_event(DebateEvent::TurnStart {
            label: turn.label.clone(),
            speaker: turn.speaker.name.clone(),
        });

        let history = match context {
            ContextPolicy::Isolated => None,
            ContextPolicy::Window(n) => Some(self.transcript.window(n)),
        };

        let prompt = self.composer.compose(&PromptInput {
            speaker: &turn.speaker,
            topic: &self.config.topic,
            history,
            round_index: turn.round_index,
            total_rounds: turn.total_rounds,
            extra_directive: self.config.extra_directive.as_deref(),
            directive: turn.directive.as_deref(),
        });

        debug!(
            speaker = %turn.speaker.name,
            round = turn.round_index + 1,
            prompt_chars = prompt.len(),
            "requesting turn"
        );

        let request = GenerationRequest {
            system_text: turn.system_text,
            prompt,
            max_tokens: Some(self.composer.limits().max_tokens),
        };
        let text = self
            .providers
            .generate(&turn.speaker.provider, &turn.speaker.name, &request)
            .await?;

        if text.is_empty() {
            warn!(speaker = %turn.speaker.name, label = %turn.label, "provider returned empty text");
        }
        info!(
            speaker = %turn.speaker.name,
            label = %turn.label,
            chars = text.len(),
            "turn complete"
        );

        self.transcript
            .append(Entry::new(turn.speaker.name.clone(), text.clone()));

        self.emit_event(DebateEvent::TurnComplete {
            label: turn.label,
            speaker: turn.speaker.name,
            text,
        });

        Ok(())
    }

    /// Emit an event if a callback is registered.
    fn emit_event(&self, event: DebateEvent) {
        if let Some(ref callback) = self.callback {
            callback(event);
        }
    }

    /// Entries recorded so far in this run.
    pub fn entries(&self) -> &[Entry] {
        self.transcript.all()
    }
}
