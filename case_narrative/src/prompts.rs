//! Prompt assembly - builds role-tagged requests from run state.
//!
//! Every request that needs the story so far replays the cards as
//! `User("{Kind} Card:")` / `Assistant(text)` pairs, in run order, using
//! the currently displayed text.

use case_rules::{Card, CardKind, Run, THEORY_COUNT};

use crate::collaborator::{ChatMessage, GenerationRequest, Purpose};

const CARD_RULES: &str = "You are assisting an interactive mystery game. Players insert slides to discover clues.
Write short, essential narrative content in English, at most 2-3 sentences.
Only add new information that bears directly on the mystery, and keep all clues logically consistent.";

const OPENING_RULES: &str = "You are a mystery game writer. Create a short, logical murder mystery.
- Keep it simple and solvable, with clear motives, few characters and one or two scenes.
- Write a single paragraph of 50-100 words ending with a one-sentence riddle.
- No meta commentary.";

const RATING_RULES: &str = "You judge logical connections between clues in a mystery game.
Rate how strongly the NEW card changes the meaning of the EARLIER card, from 0.0 to 1.0.
Reply exactly `NO_CONNECTION` if there is no strong connection.
Otherwise reply `RATING: <decimal> | REASON: <one sentence>`.";

const REGENERATION_RULES: &str = "You are updating a card in a mystery game with a new insight.
- Start with \"New insight:\".
- Reveal one new interpretation of the original card in light of the later discovery.
- At most 1-2 sentences, direct and clear.";

const SCENE_RULES: &str = "Describe the visual scene of this mystery card for an illustrator.
One or two plain English sentences, objects and setting only, no names, no violence, under 300 characters.";

/// Instructions per investigable kind.
fn kind_rules(kind: CardKind) -> &'static str {
    match kind {
        CardKind::Evidence => "For this Evidence slide: describe one physical clue in 1-2 sentences. Be factual; say what is observed, not what it means.",
        CardKind::Character => "For this Character slide: introduce one person in 1-2 sentences with name, role and one brief statement.",
        CardKind::Location => "For this Location slide: describe one place in 1-2 sentences with one distinctive detail.",
        CardKind::Action => "For this Action slide: describe one investigation step in 1-2 sentences and what it reveals.",
        CardKind::Reveal => "For this Reveal slide: write exactly 5 one-sentence theories numbered Theory #1 to Theory #5. Four are true, one is false but plausible. End with: 'Which theory is false?'",
        CardKind::Mystery | CardKind::Conclusion => "",
    }
}

/// The card history as alternating user/assistant turns.
pub fn history(run: &Run) -> Vec<ChatMessage> {
    run.cards()
        .iter()
        .flat_map(|card| {
            [
                ChatMessage::user(format!("{} Card:", card.kind())),
                ChatMessage::assistant(card.current_text()),
            ]
        })
        .collect()
}

/// Request for the Mystery card, steering away from earlier mysteries.
pub fn opening(previous_mysteries: &[String]) -> GenerationRequest {
    let mut system = OPENING_RULES.to_string();
    if !previous_mysteries.is_empty() {
        system.push_str("\n\nAvoid these previous themes: ");
        system.push_str(&previous_mysteries.join(", "));
    }

    GenerationRequest::new(
        Purpose::Opening,
        vec![
            ChatMessage::system(system),
            ChatMessage::user(
                "Create a short, concise murder mystery puzzle. End with a clear one-sentence statement of the core mystery to solve.",
            ),
        ],
    )
}

/// Request for an investigable card.
pub fn card(run: &Run, kind: CardKind) -> GenerationRequest {
    let mut messages = vec![ChatMessage::system(format!(
        "{CARD_RULES}\n\n{}",
        kind_rules(kind)
    ))];
    messages.extend(history(run));
    messages.push(ChatMessage::user(format!(
        "Generate a {kind} card for this mystery."
    )));
    GenerationRequest::new(Purpose::CardContent(kind), messages)
}

/// Request for the five theories of the Reveal card.
pub fn theories(run: &Run) -> GenerationRequest {
    let mut messages = vec![ChatMessage::system(format!(
        "{CARD_RULES}\n\n{}",
        kind_rules(CardKind::Reveal)
    ))];
    messages.extend(history(run));
    messages.push(ChatMessage::user("Generate a Reveal card for this mystery."));
    messages.push(ChatMessage::system(format!(
        "Remember: exactly {THEORY_COUNT} theories, four true and one false, numbered Theory #1 to Theory #{THEORY_COUNT}."
    )));
    GenerationRequest::new(Purpose::Theories, messages)
}

/// Follow-up asking which theory in `theories_text` is false.
pub fn false_theory(
    theories_request: &GenerationRequest,
    theories_text: &str,
) -> GenerationRequest {
    let mut messages = theories_request.messages.clone();
    messages.push(ChatMessage::assistant(theories_text));
    messages.push(ChatMessage::user(format!(
        "Which theory number contains a false statement? Reply with just one number 1-{THEORY_COUNT}."
    )));
    GenerationRequest::new(Purpose::FalseTheory, messages)
}

/// Rate the connection between an earlier card and the new one.
pub fn rating(earlier_text: &str, new_text: &str) -> GenerationRequest {
    GenerationRequest::new(
        Purpose::Rating,
        vec![
            ChatMessage::system(RATING_RULES),
            ChatMessage::user(format!(
                "EARLIER card: {earlier_text}\n\nNEW card: {new_text}"
            )),
        ],
    )
}

/// Re-derive `target` from its original text and the discovery on `source`.
pub fn regeneration(target: &Card, source: &Card, reason: &str) -> GenerationRequest {
    GenerationRequest::new(
        Purpose::Regeneration,
        vec![
            ChatMessage::system(REGENERATION_RULES),
            ChatMessage::user(format!(
                "Original {} content: {}",
                target.kind(),
                target.original_text()
            )),
            ChatMessage::user(format!(
                "Later discovery ({} Card): {}\nConnection: {reason}",
                source.kind(),
                source.current_text()
            )),
            ChatMessage::user(format!(
                "Update this {} card based on the new discovery. Keep it very brief (1-2 sentences).",
                target.kind()
            )),
        ],
    )
}

/// Closing narrative for a theory guess.
pub fn conclusion(run: &Run, chosen: u8, correct: u8) -> GenerationRequest {
    let outcome = if chosen == correct {
        "They correctly identified the false theory. Give a concise solution in 2-3 sentences."
            .to_string()
    } else {
        format!(
            "They thought Theory #{chosen} was false, but Theory #{correct} was. Give a brief flawed conclusion."
        )
    };

    let mut messages = vec![ChatMessage::system(format!(
        "Write a brief conclusion for the mystery based on the player's guess.\n\n{outcome}\n\nKeep it under 100 words."
    ))];
    messages.extend(history(run));
    messages.push(ChatMessage::user(if chosen == correct {
        format!("I think Theory #{chosen} is false.")
    } else {
        format!("I think Theory #{chosen} is false (but actually Theory #{correct} is false).")
    }));
    GenerationRequest::new(Purpose::Conclusion, messages)
}

/// Ask for a short visual description of a card, for the image prompt.
pub fn scene_summary(card_text: &str) -> GenerationRequest {
    GenerationRequest::new(
        Purpose::SceneSummary,
        vec![ChatMessage::system(SCENE_RULES), ChatMessage::user(card_text)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::Role;
    use case_rules::GameConfig;

    fn sample_run() -> Run {
        let mut run = Run::new(GameConfig::default());
        run.commit_card(CardKind::Mystery, "The chef is dead.").unwrap();
        run.commit_card(CardKind::Evidence, "A torn glove.").unwrap();
        run
    }

    #[test]
    fn test_history_pairs() {
        let messages = history(&sample_run());
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], ChatMessage::user("Mystery Card:"));
        assert_eq!(messages[1], ChatMessage::assistant("The chef is dead."));
        assert_eq!(messages[2], ChatMessage::user("Evidence Card:"));
    }

    #[test]
    fn test_card_request_shape() {
        let request = card(&sample_run(), CardKind::Location);
        assert_eq!(request.purpose, Purpose::CardContent(CardKind::Location));
        assert_eq!(request.messages.first().unwrap().role, Role::System);
        assert_eq!(
            request.last_user_message(),
            Some("Generate a Location card for this mystery.")
        );
    }

    #[test]
    fn test_opening_lists_previous_mysteries() {
        let request = opening(&["A chef is found dead.".to_string()]);
        assert!(request.messages[0].content.contains("A chef is found dead."));

        let fresh = opening(&[]);
        assert!(!fresh.messages[0].content.contains("Avoid"));
    }

    #[test]
    fn test_regeneration_uses_original_text() {
        let mut run = sample_run();
        run.commit_card(CardKind::Action, "Measure the glove.").unwrap();
        run.apply_regeneration(1, Some("Rewritten.".to_string()));

        let target = run.card(1).unwrap();
        let source = run.card(2).unwrap();
        let request = regeneration(target, source, "Size matches.");
        let joined: String = request
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect();

        assert!(joined.contains("A torn glove."));
        assert!(!joined.contains("Rewritten."));
        assert!(joined.contains("Measure the glove."));
        assert!(joined.contains("Size matches."));
    }

    #[test]
    fn test_false_theory_follow_up() {
        let base = theories(&sample_run());
        let follow_up = false_theory(&base, "Theory #1: ...");
        assert_eq!(follow_up.purpose, Purpose::FalseTheory);
        assert_eq!(follow_up.messages.len(), base.messages.len() + 2);
        assert_eq!(
            follow_up.messages[base.messages.len()],
            ChatMessage::assistant("Theory #1: ...")
        );
    }

    #[test]
    fn test_conclusion_mentions_correct_theory_when_wrong() {
        let request = conclusion(&sample_run(), 2, 4);
        assert!(request.messages[0].content.contains("Theory #4"));
        assert!(request.last_user_message().unwrap().contains("Theory #2"));
    }
}
