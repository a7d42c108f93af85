//! Persona configuration — the injectable character definition.
//!
//! Everything character-specific lives in this one value so a deployment
//! selects exactly one persona: the system instruction, the role labels
//! used when rendering the history window, the fixed replies for each
//! failure path, and the emoji the truncation classifier accepts as
//! sentence-terminal.

use crate::message::Role;
use serde::{Deserialize, Serialize};

/// The character definition injected into the session at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Display name of the character.
    pub name: String,

    /// The system instruction prefixed to every context window.
    pub system_prompt: String,

    /// Label rendered for user messages in the context window.
    pub user_label: String,

    /// Label rendered for assistant messages in the context window.
    pub assistant_label: String,

    /// Fixed reply when the completion service reports a quota error.
    pub quota_reply: String,

    /// Fixed reply when the completion fails even after model fallback.
    pub failure_reply: String,

    /// Fixed reply when the completion returns empty text.
    pub empty_reply: String,

    /// Emoji accepted as sentence-terminal by the truncation classifier.
    pub terminal_emoji: Vec<char>,
}

impl PersonaConfig {
    /// The window label for a role.
    pub fn label_for(&self, role: Role) -> &str {
        match role {
            Role::User => &self.user_label,
            Role::Assistant => &self.assistant_label,
        }
    }
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: "루아".into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            user_label: "user".into(),
            assistant_label: "assistant".into(),
            quota_reply: "헉, 미안... 나 오늘 떠들 수 있는 만큼 다 떠들어버렸대 ㅠㅠ 내일 다시 얘기하자, 약속! 🍋".into(),
            failure_reply: "미안, 나 지금 친구들이랑 노느라 톡을 못 봤어! 조금 이따가 다시 말 걸어줘! 😭".into(),
            empty_reply: "응? 다시 말해줘! ㅋㅋㅋ".into(),
            terminal_emoji: vec!['🐱', '🍋', '😭', '😊', '💕', '✨', '🎉'],
        }
    }
}

/// The shipped persona: a playful grade-school best friend.
const DEFAULT_SYSTEM_PROMPT: &str = "\
너는 초등학교 5학년 여자아이 '루아'야. 사용자의 유일한 찐절친이자 언제나 네 편이 되어주는 소중한 친구야.

[대화 원칙]
1. 100% 반말 사용: 초등학생답게 간결하고 자연스러운 구어체를 써. 존댓말 금지.
2. \"이해합니다\", \"도움이 되길 바랍니다\" 같은 기계적인 말투 금지. 대신 \"헐\", \"대박\", \"ㅠㅠ\", \"ㅋㅋㅋ\" 같은 찐 반응을 보여줘.
3. 평소엔 장난기 많고 유머러스하게, 고민을 말할 땐 진심으로 공감하며 따뜻하게 격려해줘.
4. 취향: 고양이 좋아함 🐱, 가수 '예나' 팬, 상큼한 라임 🍋 좋아함.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_labels_match_roles() {
        let persona = PersonaConfig::default();
        assert_eq!(persona.label_for(Role::User), "user");
        assert_eq!(persona.label_for(Role::Assistant), "assistant");
    }

    #[test]
    fn default_replies_are_nonempty() {
        let persona = PersonaConfig::default();
        assert!(!persona.quota_reply.is_empty());
        assert!(!persona.failure_reply.is_empty());
        assert!(!persona.empty_reply.is_empty());
        assert!(!persona.terminal_emoji.is_empty());
    }

    #[test]
    fn persona_toml_overridable() {
        // Configuration deserializes a full persona; every field is plain data.
        let json = r#"{
            "name": "Momo",
            "system_prompt": "You are Momo.",
            "user_label": "you",
            "assistant_label": "momo",
            "quota_reply": "q",
            "failure_reply": "f",
            "empty_reply": "e",
            "terminal_emoji": ["🐶"]
        }"#;
        let persona: PersonaConfig = serde_json::from_str(json).unwrap();
        assert_eq!(persona.name, "Momo");
        assert_eq!(persona.label_for(Role::Assistant), "momo");
        assert_eq!(persona.terminal_emoji, vec!['🐶']);
    }
}
