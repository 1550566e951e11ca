use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    model::entity::{Choice, Question, QuizAttempt, QuizState},
    quiz::{Feedback, QuizPolicy},
};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ChoicePayload {
    pub id: Uuid,
    pub label: String,
    pub text: String,
}

impl From<&Choice> for ChoicePayload {
    fn from(choice: &Choice) -> Self {
        Self {
            id: choice.id(),
            label: choice.label().to_string(),
            text: choice.text().to_string(),
        }
    }
}

/// A question as shown while answering; correctness stays server-side.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct QuestionPayload {
    pub id: Uuid,
    pub order: i32,
    pub total: i32,
    pub text: String,
    pub choices: Vec<ChoicePayload>,
}

impl QuestionPayload {
    pub fn new(question: &Question, total: i32, choices: &[Choice]) -> Self {
        Self {
            id: question.id(),
            order: question.order(),
            total,
            text: question.text().to_string(),
            choices: choices.iter().map(ChoicePayload::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StartResponse {
    pub attempt: QuizAttempt,
    pub question: QuestionPayload,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AnswerBody {
    pub attempt_id: Option<Uuid>,
    pub question_id: Option<Uuid>,
    pub choice_id: Option<Uuid>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AnswerResponse {
    #[serde(flatten)]
    pub feedback: Feedback,
    /// Always `order + 1`; `done` tells whether it exists.
    pub next_order: i32,
    pub done: bool,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SubmitBody {
    pub attempt_id: Option<Uuid>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct QuizStateView {
    pub attempts_used: i32,
    pub lockout_until: Option<DateTime<Utc>>,
    pub retake_available_at: Option<DateTime<Utc>>,
    pub last_completed_at: Option<DateTime<Utc>>,
    pub last_passed: Option<bool>,
}

impl From<&QuizState> for QuizStateView {
    fn from(state: &QuizState) -> Self {
        Self {
            attempts_used: state.attempts_used(),
            lockout_until: state.lockout_until(),
            retake_available_at: state.retake_available_at(),
            last_completed_at: state.last_completed_at(),
            last_passed: state.last_passed(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct QuizResult {
    pub attempt: QuizAttempt,
    pub state: QuizStateView,
    pub locked_now: bool,
    pub attempts_left: i32,
    pub pass_score: i32,
    pub total_questions: i32,
    pub certificate_id: Option<Uuid>,
}

impl QuizResult {
    pub fn new(
        attempt: QuizAttempt,
        state: &QuizState,
        locked_now: bool,
        policy: &QuizPolicy,
        certificate_id: Option<Uuid>,
    ) -> Self {
        Self {
            attempt,
            state: QuizStateView::from(state),
            locked_now,
            attempts_left: state.attempts_left(policy),
            pass_score: policy.pass_score(),
            total_questions: policy.total_questions(),
            certificate_id,
        }
    }
}
