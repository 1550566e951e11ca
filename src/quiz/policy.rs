use chrono::Duration;
use serde::Deserialize;

/// Business rules for online quizzes.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizPolicy {
    #[serde(default = "default_total_questions")]
    total_questions: i32,
    #[serde(default = "default_pass_score")]
    pass_score: i32,
    #[serde(default = "default_max_attempts")]
    max_attempts: i32,
    #[serde(default = "default_lock_hours")]
    lock_hours: i64,
}

fn default_total_questions() -> i32 {
    10
}

fn default_pass_score() -> i32 {
    8
}

fn default_max_attempts() -> i32 {
    3
}

fn default_lock_hours() -> i64 {
    24
}

impl Default for QuizPolicy {
    fn default() -> Self {
        Self {
            total_questions: default_total_questions(),
            pass_score: default_pass_score(),
            max_attempts: default_max_attempts(),
            lock_hours: default_lock_hours(),
        }
    }
}

impl QuizPolicy {
    pub fn new(total_questions: i32, pass_score: i32, max_attempts: i32, lock_hours: i64) -> Self {
        Self {
            total_questions,
            pass_score,
            max_attempts,
            lock_hours,
        }
    }

    #[inline]
    pub fn total_questions(&self) -> i32 {
        self.total_questions
    }

    #[inline]
    pub fn pass_score(&self) -> i32 {
        self.pass_score
    }

    #[inline]
    pub fn max_attempts(&self) -> i32 {
        self.max_attempts
    }

    #[inline]
    pub fn lock_hours(&self) -> i64 {
        self.lock_hours
    }

    pub fn lock_duration(&self) -> Duration {
        Duration::hours(self.lock_hours)
    }

    pub fn is_passing(&self, score: i32) -> bool {
        score >= self.pass_score
    }

    pub fn contains_order(&self, order: i32) -> bool {
        (1..=self.total_questions).contains(&order)
    }
}
