//! Transcript persistence.
//!
//! Writes a finished transcript as `transcript.json` (structured record) and
//! `transcript.md` (numbered, human-readable rendering).

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::DebateError;
use crate::transcript::{Entry, Transcript, TranscriptBody};

pub const JSON_FILE: &str = "transcript.json";
pub const MARKDOWN_FILE: &str = "transcript.md";

/// Destination for finished transcripts.
pub trait TranscriptSink {
    fn write(&self, transcript: &Transcript) -> Result<(), DebateError>;
}

/// Writes both artifacts into one output directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct FileSink {
    out_dir: PathBuf,
}

impl FileSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn markdown_path(&self) -> PathBuf {
        self.out_dir.join(MARKDOWN_FILE)
    }

    pub fn json_path(&self) -> PathBuf {
        self.out_dir.join(JSON_FILE)
    }
}

fn io_error(path: &Path, e: std::io::Error) -> DebateError {
    DebateError::Output(format!("{}: {}", path.display(), e))
}

impl TranscriptSink for FileSink {
    fn write(&self, transcript: &Transcript) -> Result<(), DebateError> {
        fs::create_dir_all(&self.out_dir).map_err(|e| io_error(&self.out_dir, e))?;

        let json = serde_json::to_string_pretty(transcript)
            .map_err(|e| DebateError::Output(format!("Failed to serialize transcript: {}", e)))?;
        let json_path = self.json_path();
        fs::write(&json_path, json).map_err(|e| io_error(&json_path, e))?;

        let markdown_path = self.markdown_path();
        fs::write(&markdown_path, render_markdown(transcript))
            .map_err(|e| io_error(&markdown_path, e))?;

        Ok(())
    }
}

fn render_entries<'e>(entries: impl Iterator<Item = &'e Entry>, start: usize) -> Vec<String> {
    entries
        .enumerate()
        .map(|(i, entry)| format!("### {} [{}]\n{}\n", start + i, entry.speaker, entry.text))
        .collect()
}

/// Render each entry as a numbered block; uniform transcripts also get a
/// heading per round. Numbering runs across the whole debate.
pub fn render_markdown(transcript: &Transcript) -> String {
    let blocks = match &transcript.body {
        TranscriptBody::Segments(segments) => render_entries(segments.iter(), 1),
        TranscriptBody::Rounds(rounds) => {
            let mut blocks = Vec::new();
            let mut next = 1;
            for round in rounds {
                blocks.push(format!("## Round {}\n", round.number));
                blocks.extend(render_entries(round.entries.iter(), next));
                next += round.entries.len();
            }
            blocks
        }
    };
    blocks.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Round;

    fn segments() -> Transcript {
        Transcript {
            topic: "Yapay zeka".to_string(),
            body: TranscriptBody::Segments(vec![
                Entry::new("MOD", "Hoş geldiniz."),
                Entry::new("A", "Bence evet."),
            ]),
        }
    }

    #[test]
    fn test_markdown_segments() {
        assert_eq!(
            render_markdown(&segments()),
            "### 1 [MOD]\nHoş geldiniz.\n\n### 2 [A]\nBence evet.\n"
        );
    }

    #[test]
    fn test_markdown_rounds_number_continuously() {
        let transcript = Transcript {
            topic: "X".to_string(),
            body: TranscriptBody::Rounds(vec![
                Round {
                    number: 1,
                    entries: vec![Entry::new("Alice", "a1"), Entry::new("Bob", "b1")],
                },
                Round {
                    number: 2,
                    entries: vec![Entry::new("Alice", "a2"), Entry::new("Bob", "b2")],
                },
            ]),
        };
        let markdown = render_markdown(&transcript);
        assert!(markdown.starts_with("## Round 1\n"));
        assert!(markdown.contains("## Round 2\n\n### 3 [Alice]\na2\n"));
        assert!(markdown.ends_with("### 4 [Bob]\nb2\n"));
    }

    #[test]
    fn test_file_sink_writes_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("episodes").join("one"));
        sink.write(&segments()).unwrap();

        let json = fs::read_to_string(sink.json_path()).unwrap();
        assert!(json.contains("Hoş geldiniz."), "non-ASCII text is kept as-is");
        let parsed: Transcript = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, segments());

        let markdown = fs::read_to_string(sink.markdown_path()).unwrap();
        assert!(markdown.starts_with("### 1 [MOD]\n"));
    }

    #[test]
    fn test_file_sink_reports_unwritable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "not a directory").unwrap();

        let err = FileSink::new(blocker.join("out")).write(&segments()).unwrap_err();
        assert!(matches!(err, DebateError::Output(_)));
    }
}
