use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

/// The correct choice of a question, if the question has one.
#[derive(Debug, Clone, Copy)]
pub struct AnswerKey {
    pub question_id: Uuid,
    pub correct_choice_id: Option<Uuid>,
}

/// Number of answered questions whose chosen choice is the correct one.
pub fn score_answers(answers: &HashMap<Uuid, Uuid>, keys: &[AnswerKey]) -> i32 {
    keys.iter()
        .filter(|key| {
            matches!(
                (answers.get(&key.question_id), key.correct_choice_id),
                (Some(chosen), Some(correct)) if *chosen == correct
            )
        })
        .count() as i32
}

/// Immediate feedback shown after a choice is picked.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct Feedback {
    pub correct: bool,
    pub title: String,
    pub text: String,
}

impl Feedback {
    /// A correct choice is explained by the question, a wrong one by the
    /// choice itself. Blank explanations fall back to a generic text.
    pub fn new(correct: bool, question_explanation: &str, choice_explanation: &str) -> Self {
        let (title, explanation, fallback) = if correct {
            ("¡Así es!", question_explanation, "Respuesta correcta.")
        } else {
            ("No exactamente", choice_explanation, "Respuesta incorrecta.")
        };
        let text = match explanation.trim() {
            "" => fallback,
            text => text,
        };

        Self {
            correct,
            title: title.to_string(),
            text: text.to_string(),
        }
    }
}
