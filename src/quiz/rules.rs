//! Attempt and lockout rules for a user's quiz on one module.
//!
//! Failing `max_attempts` times in a row locks the quiz for `lock_hours`.
//! Passing also closes the quiz for `lock_hours` before a retake is allowed.
//! All functions take `now` explicitly; persistence lives in
//! [`QuizState`](crate::model::entity::QuizState).

use chrono::{DateTime, Utc};

use crate::{model::entity::QuizState, quiz::QuizPolicy};

impl QuizState {
    /// Clears expired lockouts and cool-offs. Returns `true` if anything changed.
    pub fn reset_if_unlocked(&mut self, now: DateTime<Utc>) -> bool {
        let mut changed = false;

        if let Some(lockout_until) = self.lockout_until {
            if now >= lockout_until {
                self.lockout_until = None;
                self.attempts_used = 0;
                // the retake window was synchronised with the lockout
                if self.retake_available_at.is_some_and(|at| now >= at) {
                    self.retake_available_at = None;
                }
                changed = true;
            }
        }

        if self.last_passed == Some(true) {
            if let Some(retake_at) = self.retake_available_at {
                if now >= retake_at {
                    self.retake_available_at = None;
                    changed = true;
                }
            }
        }

        changed
    }

    /// Whether a new attempt may NOT be started at `now`.
    pub fn is_locked(&mut self, now: DateTime<Utc>) -> bool {
        self.reset_if_unlocked(now);

        if self.lockout_until.is_some_and(|until| now < until) {
            return true;
        }

        self.last_passed == Some(true) && self.retake_available_at.is_some_and(|at| now < at)
    }

    /// Records a finished attempt and returns whether it passed.
    pub fn apply_submit(&mut self, policy: &QuizPolicy, score: i32, now: DateTime<Utc>) -> bool {
        let passed = policy.is_passing(score);

        self.last_completed_at = Some(now);
        self.last_passed = Some(passed);

        if passed {
            self.retake_available_at = Some(now + policy.lock_duration());
            return true;
        }

        self.attempts_used += 1;
        if self.attempts_used >= policy.max_attempts() {
            let until = now + policy.lock_duration();
            self.lockout_until = Some(until);
            self.retake_available_at = Some(until);
        }

        false
    }

    /// Opens a fresh attempt window. Callers check [`QuizState::is_locked`] first.
    pub fn reset_for_retake(&mut self) {
        self.attempts_used = 0;
        self.lockout_until = None;
        self.retake_available_at = None;
        self.last_passed = None;
    }

    pub fn attempts_left(&self, policy: &QuizPolicy) -> i32 {
        (policy.max_attempts() - self.attempts_used).max(0)
    }
}

#[cfg(test)]
mod test {
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn fresh() -> QuizState {
        QuizState::new(Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn fresh_state_is_unlocked() {
        let mut state = fresh();
        assert!(!state.is_locked(now()));
        assert_eq!(state.attempts_left(&QuizPolicy::default()), 3);
    }

    #[test]
    fn passing_opens_cool_off() {
        let policy = QuizPolicy::default();
        let mut state = fresh();

        assert!(state.apply_submit(&policy, 8, now()));
        assert_eq!(state.last_passed, Some(true));
        assert_eq!(state.attempts_used, 0);
        assert_eq!(state.retake_available_at, Some(now() + Duration::hours(24)));
        assert!(state.is_locked(now() + Duration::hours(23)));
    }

    #[test]
    fn cool_off_expires() {
        let policy = QuizPolicy::default();
        let mut state = fresh();
        state.apply_submit(&policy, 10, now());

        let later = now() + Duration::hours(24);
        assert!(!state.is_locked(later));
        assert!(state.retake_available_at.is_none());
    }

    #[test]
    fn failing_below_max_attempts_does_not_lock() {
        let policy = QuizPolicy::default();
        let mut state = fresh();

        assert!(!state.apply_submit(&policy, 7, now()));
        assert!(!state.apply_submit(&policy, 2, now()));
        assert_eq!(state.attempts_used, 2);
        assert_eq!(state.attempts_left(&policy), 1);
        assert!(!state.is_locked(now()));
        assert!(state.lockout_until.is_none());
    }

    #[test]
    fn third_failure_locks_for_a_day() {
        let policy = QuizPolicy::default();
        let mut state = fresh();

        for _ in 0..3 {
            state.apply_submit(&policy, 0, now());
        }

        let until = now() + Duration::hours(24);
        assert_eq!(state.lockout_until, Some(until));
        assert_eq!(state.retake_available_at, Some(until));
        assert_eq!(state.attempts_left(&policy), 0);
        assert!(state.is_locked(now() + Duration::minutes(1)));
    }

    #[test]
    fn expired_lockout_resets_attempts() {
        let policy = QuizPolicy::default();
        let mut state = fresh();
        for _ in 0..3 {
            state.apply_submit(&policy, 0, now());
        }

        let later = now() + Duration::hours(24) + Duration::seconds(1);
        assert!(state.reset_if_unlocked(later));
        assert_eq!(state.attempts_used, 0);
        assert!(state.lockout_until.is_none());
        assert!(state.retake_available_at.is_none());
        assert!(!state.is_locked(later));
    }

    #[test]
    fn reset_if_unlocked_is_a_no_op_while_locked() {
        let policy = QuizPolicy::default();
        let mut state = fresh();
        for _ in 0..3 {
            state.apply_submit(&policy, 1, now());
        }

        assert!(!state.reset_if_unlocked(now() + Duration::hours(1)));
        assert_eq!(state.attempts_used, 3);
    }

    #[test]
    fn retake_resets_everything_but_history() {
        let policy = QuizPolicy::default();
        let mut state = fresh();
        state.apply_submit(&policy, 3, now());
        state.apply_submit(&policy, 9, now());

        state.reset_for_retake();
        assert_eq!(state.attempts_used, 0);
        assert!(state.lockout_until.is_none());
        assert!(state.retake_available_at.is_none());
        assert!(state.last_passed.is_none());
        assert_eq!(state.last_completed_at, Some(now()));
    }

    #[test]
    fn custom_policy_is_honoured() {
        let policy = QuizPolicy::new(5, 4, 1, 2);
        let mut state = fresh();

        assert!(!state.apply_submit(&policy, 3, now()));
        assert_eq!(state.lockout_until, Some(now() + Duration::hours(2)));
        assert!(!state.is_locked(now() + Duration::hours(2)));
    }
}
