use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::model::entity::{Choice, PresencialSession, Question, TrainingModule};

use super::quiz::ChoicePayload;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PresencialQuestion {
    pub id: Uuid,
    pub order: i32,
    pub text: String,
    pub choices: Vec<ChoicePayload>,
}

impl PresencialQuestion {
    /// Groups `choices` (ordered by question) under their questions.
    pub fn group(questions: &[Question], choices: &[Choice]) -> Vec<Self> {
        questions
            .iter()
            .map(|q| Self {
                id: q.id(),
                order: q.order(),
                text: q.text().to_string(),
                choices: choices
                    .iter()
                    .filter(|c| c.question_id() == q.id())
                    .map(ChoicePayload::from)
                    .collect(),
            })
            .collect()
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PresencialQuiz {
    pub module: TrainingModule,
    pub pass_score: i32,
    pub questions: Vec<PresencialQuestion>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct PresencialSubmitBody {
    /// Question id to chosen choice id
    #[serde(default)]
    #[schema(value_type = Object)]
    pub answers: HashMap<Uuid, Uuid>,
    #[serde(default)]
    pub session_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub location: String,
    #[serde(default)]
    #[validate(range(min = 0, max = 10000))]
    pub participants_count: i32,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct QuestionDetail {
    pub question_id: Uuid,
    pub order: i32,
    pub text: String,
    pub chosen_choice_id: Option<Uuid>,
    pub correct_choice_id: Option<Uuid>,
    pub correct: bool,
    pub explanation: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PresencialResult {
    pub session: PresencialSession,
    pub score: i32,
    pub total: i32,
    pub pass_score: i32,
    pub passed: bool,
    pub details: Vec<QuestionDetail>,
}

/// Per-question outcome of a classroom quiz.
pub fn grade(
    questions: &[Question],
    choices: &[Choice],
    answers: &HashMap<Uuid, Uuid>,
) -> Vec<QuestionDetail> {
    questions
        .iter()
        .map(|q| {
            let chosen = answers.get(&q.id()).copied();
            let correct_choice = choices
                .iter()
                .find(|c| c.question_id() == q.id() && c.is_correct());
            let correct_choice_id = correct_choice.map(Choice::id);

            QuestionDetail {
                question_id: q.id(),
                order: q.order(),
                text: q.text().to_string(),
                chosen_choice_id: chosen,
                correct_choice_id,
                correct: chosen.is_some() && chosen == correct_choice_id,
                explanation: q.explanation().to_string(),
            }
        })
        .collect()
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PlanillaQuery {
    /// Session date, `YYYY-MM-DD`; today when missing
    pub date: Option<NaiveDate>,
    /// Number of blank rows
    pub rows: Option<usize>,
}
