//! Context window assembly.
//!
//! The prompt for one completion request is the persona text plus the last
//! K transcript messages, rendered one per line. Assembly is pure and
//! deterministic: identical inputs always produce identical output — no
//! random or time-dependent logic.

use chatling_core::{PersonaConfig, Transcript};

/// Renders the bounded prompt for a completion request.
/// Stateless apart from its configuration — create one and reuse it.
#[derive(Debug, Clone)]
pub struct WindowBuilder {
    persona: PersonaConfig,
    window_size: usize,
}

impl WindowBuilder {
    pub fn new(persona: PersonaConfig, window_size: usize) -> Self {
        Self {
            persona,
            window_size,
        }
    }

    /// The persona this builder renders with.
    pub fn persona(&self) -> &PersonaConfig {
        &self.persona
    }

    /// Build the prompt: the persona text, a blank line, then the last
    /// `window_size` messages as `"{label}: {content}"` lines joined by
    /// newlines. Message content is never truncated. An empty transcript
    /// yields the persona text alone.
    pub fn build(&self, transcript: &Transcript) -> String {
        let lines: Vec<String> = transcript
            .last_n(self.window_size)
            .iter()
            .map(|m| format!("{}: {}", self.persona.label_for(m.role), m.content))
            .collect();

        if lines.is_empty() {
            self.persona.system_prompt.clone()
        } else {
            format!("{}\n\n{}", self.persona.system_prompt, lines.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatling_core::Message;

    fn persona() -> PersonaConfig {
        PersonaConfig {
            system_prompt: "You are a test persona.".into(),
            ..PersonaConfig::default()
        }
    }

    fn transcript_of(contents: &[(&str, bool)]) -> Transcript {
        Transcript::from_history(
            contents
                .iter()
                .map(|(content, from_user)| {
                    if *from_user {
                        Message::user(*content)
                    } else {
                        Message::assistant(*content)
                    }
                })
                .collect(),
        )
    }

    #[test]
    fn empty_transcript_is_persona_only() {
        let builder = WindowBuilder::new(persona(), 10);
        let prompt = builder.build(&Transcript::new());
        assert_eq!(prompt, "You are a test persona.");
    }

    #[test]
    fn window_renders_roles_and_content() {
        let builder = WindowBuilder::new(persona(), 10);
        let transcript = transcript_of(&[("안녕", true), ("안녕! 반가워", false)]);
        let prompt = builder.build(&transcript);
        assert_eq!(
            prompt,
            "You are a test persona.\n\nuser: 안녕\nassistant: 안녕! 반가워"
        );
    }

    #[test]
    fn window_takes_exactly_min_k_messages() {
        let builder = WindowBuilder::new(persona(), 3);
        let transcript = transcript_of(&[
            ("one", true),
            ("two", false),
            ("three", true),
            ("four", false),
            ("five", true),
        ]);
        let prompt = builder.build(&transcript);
        // Only the last 3, in original order
        assert!(!prompt.contains("one"));
        assert!(!prompt.contains("two"));
        let three = prompt.find("three").unwrap();
        let four = prompt.find("four").unwrap();
        let five = prompt.find("five").unwrap();
        assert!(three < four && four < five);
    }

    #[test]
    fn short_transcript_keeps_everything() {
        let builder = WindowBuilder::new(persona(), 10);
        let transcript = transcript_of(&[("only", true)]);
        let prompt = builder.build(&transcript);
        assert!(prompt.ends_with("user: only"));
    }

    #[test]
    fn content_is_never_truncated() {
        let long = "a".repeat(5000);
        let builder = WindowBuilder::new(persona(), 5);
        let transcript = transcript_of(&[(long.as_str(), true)]);
        let prompt = builder.build(&transcript);
        assert!(prompt.contains(&long));
    }

    #[test]
    fn build_is_deterministic() {
        let builder = WindowBuilder::new(persona(), 5);
        let transcript = transcript_of(&[("hi", true), ("hello", false)]);
        assert_eq!(builder.build(&transcript), builder.build(&transcript));
    }

    #[test]
    fn custom_labels_are_used() {
        let mut p = persona();
        p.user_label = "사용자".into();
        p.assistant_label = "루아".into();
        let builder = WindowBuilder::new(p, 10);
        let transcript = transcript_of(&[("밥 먹었어?", true), ("응! 너는?", false)]);
        let prompt = builder.build(&transcript);
        assert!(prompt.contains("사용자: 밥 먹었어?"));
        assert!(prompt.contains("루아: 응! 너는?"));
    }
}
