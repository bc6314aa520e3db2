//! Prompt composition.
//!
//! Renders the full instruction text for one turn. Composition is a pure
//! function of its inputs: the same speaker, topic, history window, round
//! position and directives always produce byte-identical output.

use std::fmt::Write;

use crate::participant::Speaker;
use crate::transcript::Entry;

/// Length ceilings given to speakers, plus the matching output-token budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeechLimits {
    pub min_sentences: u32,
    pub max_sentences: u32,
    pub max_words: Option<u32>,
    pub max_tokens: u32,
}

impl SpeechLimits {
    /// Short, punchy takes for uniform rounds.
    pub const ROUND: SpeechLimits = SpeechLimits {
        min_sentences: 1,
        max_sentences: 4,
        max_words: Some(80),
        max_tokens: 220,
    };

    /// Scripted segments.
    pub const SEGMENT: SpeechLimits = SpeechLimits {
        min_sentences: 2,
        max_sentences: 6,
        max_words: None,
        max_tokens: 400,
    };
}

/// Everything that varies from one turn to the next.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub speaker: &'a Speaker,
    pub topic: &'a str,
    /// `None` when the strategy passes no history at all; `Some(&[])` renders
    /// an empty conversation.
    pub history: Option<&'a [Entry]>,
    /// Zero-based.
    pub round_index: u32,
    pub total_rounds: u32,
    /// Debate-wide extra rule.
    pub extra_directive: Option<&'a str>,
    /// What this particular turn should accomplish.
    pub directive: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptComposer {
    language: String,
    limits: SpeechLimits,
}

impl PromptComposer {
    pub fn new(language: impl Into<String>, limits: SpeechLimits) -> Self {
        Self {
            language: language.into(),
            limits,
        }
    }

    pub fn limits(&self) -> SpeechLimits {
        self.limits
    }

    /// The fixed rules every prompt carries, one per line.
    pub fn rule_block(&self) -> String {
        let mut rules = String::new();
        let _ = writeln!(rules, "- Respond only in {}.", self.language);
        rules.push_str("- Speak in the style of a televised debate show.\n");
        rules.push_str(
            "- Speak only for yourself; never speak on behalf of or impersonate another participant.\n",
        );
        let _ = writeln!(
            rules,
            "- Keep your answer between {} and {} sentences.",
            self.limits.min_sentences, self.limits.max_sentences
        );
        if let Some(words) = self.limits.max_words {
            let _ = writeln!(rules, "- Do not exceed {} words. Keep it short and punchy.", words);
        }
        rules.push_str(
            "- Do not write headings or labels such as \"Round X:\" or speaker names; give only the spoken text.\n",
        );
        rules
    }

    pub fn compose(&self, input: &PromptInput<'_>) -> String {
        let name = &input.speaker.name;
        let mut prompt = String::new();

        prompt.push_str("You are a participant speaking on a televised debate show.\n\n");
        let _ = writeln!(prompt, "Participant name: {}", name);
        let _ = writeln!(prompt, "Persona / role:\n{}\n", input.speaker.persona);
        let _ = writeln!(prompt, "Debate topic: {}\n", input.topic);
        let _ = writeln!(
            prompt,
            "You are now in round {} of {}. You speak only once in this turn.\n",
            input.round_index + 1,
            input.total_rounds
        );

        if let Some(history) = input.history {
            prompt.push_str("Recent conversation:\n");
            if history.is_empty() {
                prompt.push_str("(nobody has spoken yet)\n");
            }
            for entry in history {
                let _ = writeln!(prompt, "{}: {}", entry.speaker, entry.text);
            }
            prompt.push('\n');
        }

        prompt.push_str("Rules:\n");
        prompt.push_str(&self.rule_block());
        if let Some(extra) = input.extra_directive {
            let _ = writeln!(prompt, "- Additional rule: {}", extra);
        }
        prompt.push('\n');

        if let Some(directive) = input.directive {
            let _ = writeln!(prompt, "Your task for this turn: {}\n", directive);
        }

        let _ = writeln!(prompt, "Now, as {}, give a single speech:", name);
        prompt.push_str("- Address the audience and the other participants directly, in a natural voice.\n");
        prompt.push_str("- Write only your own words; do not repeat the question.\n");
        prompt.push_str("- Output only the speech, with no explanations or headings.\n");
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speaker() -> Speaker {
        Speaker::new("Alice", "A sharp economist.\nSpeaks with data.", "gpt")
    }

    fn input<'a>(speaker: &'a Speaker, history: Option<&'a [Entry]>) -> PromptInput<'a> {
        PromptInput {
            speaker,
            topic: "Remote work",
            history,
            round_index: 1,
            total_rounds: 3,
            extra_directive: None,
            directive: None,
        }
    }

    #[test]
    fn test_compose_is_deterministic() {
        let composer = PromptComposer::new("Turkish", SpeechLimits::ROUND);
        let speaker = speaker();
        let history = vec![Entry::new("MOD", "Welcome.")];
        let mut input = input(&speaker, Some(history.as_slice()));
        input.extra_directive = Some("Be funny.");
        input.directive = Some("Open the debate.");

        assert_eq!(composer.compose(&input), composer.compose(&input));
    }

    #[test]
    fn test_rule_block_always_present() {
        let composer = PromptComposer::new("Turkish", SpeechLimits::ROUND);
        let speaker = speaker();
        let prompt = composer.compose(&input(&speaker, None));

        let rules = composer.rule_block();
        assert!(prompt.contains(&rules));
        assert!(rules.contains("Respond only in Turkish."));
        assert!(rules.contains("between 1 and 4 sentences"));
        assert!(rules.contains("Do not exceed 80 words"));
        assert!(rules.contains("impersonate"));
        assert!(rules.contains("\"Round X:\""));
    }

    #[test]
    fn test_segment_limits_have_no_word_ceiling() {
        let rules = PromptComposer::new("English", SpeechLimits::SEGMENT).rule_block();
        assert!(rules.contains("between 2 and 6 sentences"));
        assert!(!rules.contains("words"));
    }

    #[test]
    fn test_extra_directive_is_a_rule() {
        let composer = PromptComposer::new("English", SpeechLimits::ROUND);
        let speaker = speaker();
        let mut input = input(&speaker, None);
        input.extra_directive = Some("Alice is scientific, Bob is emotional.");

        let prompt = composer.compose(&input);
        let rules_at = prompt.find("Rules:\n").unwrap();
        let extra_at = prompt
            .find("- Additional rule: Alice is scientific, Bob is emotional.\n")
            .unwrap();
        assert!(extra_at > rules_at);
    }

    #[test]
    fn test_identity_and_position() {
        let composer = PromptComposer::new("English", SpeechLimits::ROUND);
        let speaker = speaker();
        let prompt = composer.compose(&input(&speaker, None));

        assert!(prompt.contains("Participant name: Alice\n"));
        assert!(prompt.contains("A sharp economist.\nSpeaks with data.\n"));
        assert!(prompt.contains("Debate topic: Remote work\n"));
        assert!(prompt.contains("round 2 of 3"));
        assert!(prompt.contains("Now, as Alice, give a single speech:"));
    }

    #[test]
    fn test_isolated_turn_has_no_history_section() {
        let composer = PromptComposer::new("English", SpeechLimits::ROUND);
        let speaker = speaker();
        let prompt = composer.compose(&input(&speaker, None));
        assert!(!prompt.contains("Recent conversation:"));
        assert!(!prompt.contains("Your task for this turn:"));
    }

    #[test]
    fn test_history_oldest_first() {
        let composer = PromptComposer::new("English", SpeechLimits::SEGMENT);
        let speaker = speaker();
        let history = vec![
            Entry::new("MOD", "Welcome to the show."),
            Entry::new("A", "I am in favor."),
            Entry::new("B", "I am against."),
        ];
        let mut input = input(&speaker, Some(history.as_slice()));
        input.directive = Some("Ask a short question; A answers first.");
        let prompt = composer.compose(&input);

        let block = "Recent conversation:\nMOD: Welcome to the show.\nA: I am in favor.\nB: I am against.\n";
        assert!(prompt.contains(block));
        assert!(prompt.contains("Your task for this turn: Ask a short question; A answers first.\n"));
    }

    #[test]
    fn test_empty_history_is_rendered() {
        let composer = PromptComposer::new("English", SpeechLimits::SEGMENT);
        let speaker = speaker();
        let prompt = composer.compose(&input(&speaker, Some(&[][..])));
        assert!(prompt.contains("Recent conversation:\n(nobody has spoken yet)\n"));
    }
}
