//! Truncation repair — detect and mend replies that stop mid-sentence.
//!
//! Tight output budgets cut replies off mid-sentence. The heuristic: if a
//! reply does not end with a terminal character, ask the model once to
//! finish the sentence and concatenate the two parts verbatim. The repair runs at most once per
//! turn; a result that still looks unfinished is accepted as-is.

use chatling_core::{GenerationParams, PersonaConfig};
use chatling_providers::ModelFallback;
use tracing::{debug, warn};

/// Characters that end a complete reply. Korean chat shorthand counts:
/// trailing laughter (ㅋ, ㅎ) or crying (ㅠ) is a finished thought.
const TERMINAL_CHARS: [char; 7] = ['!', '?', '.', '~', 'ㅋ', 'ㅠ', 'ㅎ'];

/// The continuation instruction appended after the partial text.
const CONTINUE_INSTRUCTION: &str =
    "위 문장이 중간에 끊겼어. 앞 문장을 한 문장으로 자연스럽게 끝맺어줘.";

/// Whether a reply looks finished: it ends with a terminal character or
/// with one of the persona's accepted emoji.
///
/// Empty text counts as complete — the empty-response path upstream has
/// already replaced it, so there is nothing to continue.
pub fn looks_complete(text: &str, terminal_emoji: &[char]) -> bool {
    match text.trim_end().chars().last() {
        None => true,
        Some(last) => TERMINAL_CHARS.contains(&last) || terminal_emoji.contains(&last),
    }
}

/// The one-shot repair pass over a raw completion.
pub struct Repairer {
    budget: u32,
}

impl Repairer {
    /// `budget` is the output-token cap for the continuation call — smaller
    /// than the normal generation budget, since it only finishes a sentence.
    pub fn new(budget: u32) -> Self {
        Self { budget }
    }

    /// Return `text` unchanged when it looks complete; otherwise issue
    /// exactly one continuation call and concatenate partial + continuation
    /// with no separator. A failed continuation keeps the partial text.
    pub async fn repair(
        &self,
        client: &ModelFallback,
        persona: &PersonaConfig,
        params: &GenerationParams,
        text: String,
    ) -> String {
        if looks_complete(&text, &persona.terminal_emoji) {
            return text;
        }

        debug!("Reply looks cut off, issuing one continuation call");
        let prompt = format!("{}\n\n{}", text, CONTINUE_INSTRUCTION);
        let repair_params = params.with_output_budget(self.budget);

        match client.generate(&prompt, &repair_params).await {
            Ok(continuation) => {
                let mut repaired = text;
                repaired.push_str(&continuation);
                repaired
            }
            Err(e) => {
                warn!(error = %e, "Continuation call failed, keeping partial reply");
                text
            }
        }
    }
}
