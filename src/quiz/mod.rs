mod policy;
pub use policy::QuizPolicy;

mod rules;

mod scoring;
pub use scoring::{AnswerKey, Feedback, score_answers};
