//! Turn scheduling strategies.
//!
//! A scheduler is a lazy, finite, non-restartable sequence of [`Turn`]s. The
//! orchestrator pulls one turn, runs it to completion, records the entry and
//! only then pulls the next one.

use std::fmt;

use crate::error::DebateError;
use crate::orchestrator::DebateConfig;
use crate::participant::{Participant, Speaker};
use crate::prompt::SpeechLimits;
use crate::role::{DEBATER_A, DEBATER_B, MODERATOR, RoleRegistry};

/// Uniform debates need at least this many participants.
pub const MIN_PARTICIPANTS: usize = 2;

/// Number of most recent entries scripted speakers get to see.
pub const HISTORY_WINDOW: usize = 8;

/// System instruction for uniform-round participants.
pub const PANEL_SYSTEM_TEXT: &str = "You are a debate show participant who follows the given \
rules to the letter and speaks briefly and to the point.";

/// One scheduled opportunity for a single speaker to produce text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    /// Human-readable title, e.g. "A – Round 2".
    pub label: String,
    /// Zero-based.
    pub round_index: u32,
    pub total_rounds: u32,
    pub directive: Option<String>,
    pub system_text: String,
}

/// Which orchestration strategy a scheduler implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    UniformRound,
    ScriptedSegments,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::UniformRound => write!(f, "uniform-round"),
            Strategy::ScriptedSegments => write!(f, "scripted-segments"),
        }
    }
}

/// How much prior conversation a speaker sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextPolicy {
    /// No prior entries; each turn stands alone.
    Isolated,
    /// The most recent `n` entries of the whole debate.
    Window(usize),
}

/// Trait for turn scheduling strategies.
pub trait TurnScheduler: Iterator<Item = Turn> + Send {
    fn strategy(&self) -> Strategy;

    fn context_policy(&self) -> ContextPolicy;

    fn speech_limits(&self) -> SpeechLimits;

    /// Every speaker that will be scheduled, in declaration order.
    fn speakers(&self) -> &[Speaker];

    /// Total number of turns the full schedule contains.
    fn total_turns(&self) -> usize;
}

/// Every participant speaks once per round, in declaration order. Rounds are
/// independent takes: no history is shared between them.
#[derive(Debug, Clone)]
pub struct UniformRoundSchedule {
    speakers: Vec<Speaker>,
    total_rounds: u32,
    round: u32,
    seat: usize,
}

impl UniformRoundSchedule {
    pub fn new(config: &DebateConfig, participants: &[Participant]) -> Result<Self, DebateError> {
        config.validate()?;
        if participants.len() < MIN_PARTICIPANTS {
            return Err(DebateError::Validation(format!(
                "at least {} participants are required, got {}",
                MIN_PARTICIPANTS,
                participants.len()
            )));
        }

        Ok(Self {
            speakers: participants.iter().map(Participant::as_speaker).collect(),
            total_rounds: config.round_count,
            round: 0,
            seat: 0,
        })
    }
}

impl Iterator for UniformRoundSchedule {
    type Item = Turn;

    fn next(&mut self) -> Option<Turn> {
        if self.round >= self.total_rounds {
            return None;
        }

        let speaker = self.speakers[self.seat].clone();
        let turn = Turn {
            label: format!("{} – Round {}", speaker.name, self.round + 1),
            speaker,
            round_index: self.round,
            total_rounds: self.total_rounds,
            directive: None,
            system_text: PANEL_SYSTEM_TEXT.to_string(),
        };

        self.seat += 1;
        if self.seat == self.speakers.len() {
            self.seat = 0;
            self.round += 1;
        }

        Some(turn)
    }
}

impl TurnScheduler for UniformRoundSchedule {
    fn strategy(&self) -> Strategy {
        Strategy::UniformRound
    }

    fn context_policy(&self) -> ContextPolicy {
        ContextPolicy::Isolated
    }

    fn speech_limits(&self) -> SpeechLimits {
        SpeechLimits::ROUND
    }

    fn speakers(&self) -> &[Speaker] {
        &self.speakers
    }

    fn total_turns(&self) -> usize {
        self.total_rounds as usize * self.speakers.len()
    }
}

/// Position in the scripted debate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    ModeratorOpening,
    OpeningA,
    OpeningB,
    /// Rebuttal rounds are one-based.
    Question(u32),
    AnswerA(u32),
    AnswerB(u32),
    Closing,
    Done,
}

impl ScriptStep {
    fn successor(self, rounds: u32) -> ScriptStep {
        match self {
            ScriptStep::ModeratorOpening => ScriptStep::OpeningA,
            ScriptStep::OpeningA => ScriptStep::OpeningB,
            ScriptStep::OpeningB => ScriptStep::Question(1),
            ScriptStep::Question(r) => ScriptStep::AnswerA(r),
            ScriptStep::AnswerA(r) => ScriptStep::AnswerB(r),
            ScriptStep::AnswerB(r) if r < rounds => ScriptStep::Question(r + 1),
            ScriptStep::AnswerB(_) => ScriptStep::Closing,
            ScriptStep::Closing | ScriptStep::Done => ScriptStep::Done,
        }
    }

    fn role_id(self) -> &'static str {
        match self {
            ScriptStep::ModeratorOpening | ScriptStep::Question(_) | ScriptStep::Closing => {
                MODERATOR
            }
            ScriptStep::OpeningA | ScriptStep::AnswerA(_) => DEBATER_A,
            ScriptStep::OpeningB | ScriptStep::AnswerB(_) => DEBATER_B,
            ScriptStep::Done => "",
        }
    }

    /// What the speaker should accomplish in this step.
    pub fn directive(self) -> Option<&'static str> {
        match self {
            ScriptStep::ModeratorOpening => Some(
                "Introduce the topic and explain the format. Keep it short, then hand the floor to A.",
            ),
            ScriptStep::OpeningA => Some("Give your own opening statement in 3 to 5 sentences."),
            ScriptStep::OpeningB => Some("Respond to A's opening statement in 3 to 5 sentences."),
            ScriptStep::Question(_) => {
                Some("Ask one short, clear question. A answers first.")
            }
            ScriptStep::AnswerA(_) => Some(
                "Answer the moderator's question and logically challenge B's previous argument.",
            ),
            ScriptStep::AnswerB(_) => Some(
                "Answer both the moderator's question and A's claim, backing your position with sound reasoning.",
            ),
            ScriptStep::Closing => {
                Some("Summarize the debate neutrally and briefly, with a light touch of humor.")
            }
            ScriptStep::Done => None,
        }
    }

    fn label(self) -> String {
        match self {
            ScriptStep::ModeratorOpening => format!("{} – Opening", MODERATOR),
            ScriptStep::OpeningA => format!("{} – Opening", DEBATER_A),
            ScriptStep::OpeningB => format!("{} – Opening", DEBATER_B),
            ScriptStep::Question(r) => format!("{} – Round {} Question", MODERATOR, r),
            ScriptStep::AnswerA(r) => format!("{} – Round {}", DEBATER_A, r),
            ScriptStep::AnswerB(r) => format!("{} – Round {}", DEBATER_B, r),
            ScriptStep::Closing => format!("{} – Closing", MODERATOR),
            ScriptStep::Done => String::new(),
        }
    }

    /// Zero-based round the step belongs to; openings fall in the first
    /// round and the closing in the last.
    fn round_index(self, rounds: u32) -> u32 {
        match self {
            ScriptStep::Question(r) | ScriptStep::AnswerA(r) | ScriptStep::AnswerB(r) => r - 1,
            ScriptStep::Closing | ScriptStep::Done => rounds - 1,
            _ => 0,
        }
    }
}

/// Fixed moderator + two debater script with a shared, windowed history:
/// openings, `round_count` question/answer rounds, then a closing.
#[derive(Debug, Clone)]
pub struct ScriptedSchedule {
    /// Moderator, A, B.
    speakers: Vec<Speaker>,
    total_rounds: u32,
    step: ScriptStep,
}

impl ScriptedSchedule {
    pub fn new(config: &DebateConfig, roles: &RoleRegistry) -> Result<Self, DebateError> {
        config.validate()?;
        let speakers = [MODERATOR, DEBATER_A, DEBATER_B]
            .into_iter()
            .map(|id| roles.get(id).map(Speaker::from))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            speakers,
            total_rounds: config.round_count,
            step: ScriptStep::ModeratorOpening,
        })
    }

    /// The step the next call to `next()` will produce.
    pub fn current_step(&self) -> ScriptStep {
        self.step
    }

    fn speaker_for(&self, step: ScriptStep) -> Option<&Speaker> {
        let id = step.role_id();
        self.speakers.iter().find(|s| s.name == id)
    }
}

impl Iterator for ScriptedSchedule {
    type Item = Turn;

    fn next(&mut self) -> Option<Turn> {
        let step = self.step;
        let speaker = self.speaker_for(step)?.clone();
        self.step = step.successor(self.total_rounds);

        Some(Turn {
            system_text: speaker.persona.clone(),
            speaker,
            label: step.label(),
            round_index: step.round_index(self.total_rounds),
            total_rounds: self.total_rounds,
            directive: step.directive().map(str::to_string),
        })
    }
}

impl TurnScheduler for ScriptedSchedule {
    fn strategy(&self) -> Strategy {
        Strategy::ScriptedSegments
    }

    fn context_policy(&self) -> ContextPolicy {
        ContextPolicy::Window(HISTORY_WINDOW)
    }

    fn speech_limits(&self) -> SpeechLimits {
        SpeechLimits::SEGMENT
    }

    fn speakers(&self) -> &[Speaker] {
        &self.speakers
    }

    fn total_turns(&self) -> usize {
        4 + 3 * self.total_rounds as usize
    }
}
