//! Transcript records and the append-only accumulator that builds them.

use serde::{Deserialize, Serialize};

/// One spoken turn. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub speaker: String,
    pub text: String,
}

impl Entry {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

/// Entries produced within one uniform round, in participant order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// One-based.
    #[serde(rename = "round")]
    pub number: u32,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptBody {
    Rounds(Vec<Round>),
    Segments(Vec<Entry>),
}

/// The finished debate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub topic: String,
    #[serde(flatten)]
    pub body: TranscriptBody,
}

impl Transcript {
    /// All entries in speaking order, regardless of grouping.
    pub fn entries(&self) -> Vec<&Entry> {
        match &self.body {
            TranscriptBody::Rounds(rounds) => rounds.iter().flat_map(|r| &r.entries).collect(),
            TranscriptBody::Segments(segments) => segments.iter().collect(),
        }
    }

    pub fn rounds(&self) -> Option<&[Round]> {
        match &self.body {
            TranscriptBody::Rounds(rounds) => Some(rounds),
            TranscriptBody::Segments(_) => None,
        }
    }

    pub fn segments(&self) -> Option<&[Entry]> {
        match &self.body {
            TranscriptBody::Rounds(_) => None,
            TranscriptBody::Segments(segments) => Some(segments),
        }
    }
}

/// Append-only, ordered record of a single debate run.
///
/// Also serves the bounded context window fed back into prompts. Owned by
/// exactly one run; not shared across tasks.
#[derive(Debug, Default)]
pub struct TranscriptAccumulator {
    entries: Vec<Entry>,
    /// Index into `entries` where each round begins.
    round_starts: Vec<usize>,
}

impl TranscriptAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of a new round; following appends belong to it.
    pub fn begin_round(&mut self) {
        self.round_starts.push(self.entries.len());
    }

    pub fn append(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// The last `n` entries, oldest first.
    pub fn window(&self, n: usize) -> &[Entry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn all(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Group entries by the recorded round boundaries.
    pub fn into_rounds(self) -> Vec<Round> {
        let total = self.entries.len();
        let mut entries = self.entries.into_iter();

        self.round_starts
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let end = self.round_starts.get(i + 1).copied().unwrap_or(total);
                Round {
                    number: i as u32 + 1,
                    entries: entries.by_ref().take(end - start).collect(),
                }
            })
            .collect()
    }

    pub fn into_segments(self) -> Vec<Entry> {
        self.entries
    }
}
