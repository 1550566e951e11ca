//! Online quiz: one attempt at a time, answered question by question.
//!
//! Start, submit and retake run in a transaction holding the user's
//! `quiz_states` row lock, so two tabs cannot both start or both submit.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    certificates,
    model::{
        DatabaseError, ResourceTyped,
        entity::{Certificate, Choice, Question, QuizAttempt, QuizState, TrainingModule},
    },
    quiz::{Feedback, score_answers},
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::quiz::{AnswerBody, AnswerResponse, QuestionPayload, QuizResult, StartResponse, SubmitBody},
        error::ErrorResponse,
        middlewares,
    },
};

use super::training::active_module;

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{slug}/start", post(quiz_start_handler))
        .route("/{slug}/question/{order}", get(quiz_question_handler))
        .route("/{slug}/answer", post(quiz_answer_handler))
        .route("/{slug}/submit", post(quiz_submit_handler))
        .route("/{slug}/result/{attempt_id}", get(quiz_result_handler))
        .route("/{slug}/retake", post(quiz_retake_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn state_error(e: impl Into<DatabaseError>) -> WebError {
    WebError::resource_fetch_error(QuizState::get_resource_type(), e.into())
}

fn attempt_error(e: impl Into<DatabaseError>) -> WebError {
    WebError::resource_fetch_error(QuizAttempt::get_resource_type(), e.into())
}

fn required(field: &str) -> WebError {
    WebError::validation(field, "This field is required.")
}

async fn question_payload(
    state: &AppState,
    module: &TrainingModule,
    order: i32,
) -> WebResult<QuestionPayload> {
    let policy = state.config().quiz();
    if !policy.contains_order(order) {
        return Err(WebError::quiz_question_out_of_range(order));
    }

    let question = Question::find_by_order(state.pool(), module.id(), order)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Question::get_resource_type()))?;
    let choices = Choice::list_for_question(state.pool(), question.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Choice::get_resource_type(), e))?;

    Ok(QuestionPayload::new(
        &question,
        policy.total_questions(),
        &choices,
    ))
}

/// Opens a new attempt with its first question unless the quiz is locked.
/// `retake` also clears the attempt counter and the last result. Nothing is
/// committed when the module has no first question.
async fn open_attempt(
    state: &AppState,
    user: &AuthenticatedUser,
    module: &TrainingModule,
    retake: bool,
) -> WebResult<StartResponse> {
    let now = Utc::now();
    let mut tx = state.pool().begin().await.map_err(state_error)?;

    let mut quiz_state = QuizState::lock(&mut tx, user.user_id(), module.id())
        .await
        .map_err(state_error)?;

    if quiz_state.reset_if_unlocked(now) {
        quiz_state.save(&mut tx).await.map_err(state_error)?;
    }

    if quiz_state.is_locked(now) {
        tx.commit().await.map_err(state_error)?;
        tracing::debug!("quiz {} is locked for {}", module.slug(), user.user_id());
        return Err(WebError::quiz_locked(&quiz_state));
    }

    if retake {
        quiz_state.reset_for_retake();
        quiz_state.save(&mut tx).await.map_err(state_error)?;
    }

    let attempt = QuizAttempt::create(&mut *tx, user.user_id(), module.id())
        .await
        .map_err(attempt_error)?;
    let question = question_payload(state, module, 1).await?;
    tx.commit().await.map_err(attempt_error)?;

    tracing::info!(
        "attempt {} started on {} by {}",
        attempt.id(),
        module.slug(),
        user.user_id()
    );
    Ok(StartResponse { attempt, question })
}

async fn build_result(
    state: &AppState,
    user: &AuthenticatedUser,
    attempt: QuizAttempt,
) -> WebResult<QuizResult> {
    let policy = state.config().quiz();
    let quiz_state = QuizState::find(state.pool(), user.user_id(), attempt.module_id())
        .await
        .map_err(state_error)?
        .unwrap_or_else(|| QuizState::new(user.user_id(), attempt.module_id()));
    let locked_now = quiz_state.clone().is_locked(Utc::now());

    let certificate = Certificate::find_by_attempt(state.pool(), attempt.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Certificate::get_resource_type(), e))?;

    Ok(QuizResult::new(
        attempt,
        &quiz_state,
        locked_now,
        policy,
        certificate.map(|c| c.id()),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/quiz/{slug}/start",
    description = "Starts a new attempt and returns its first question",
    params(("slug" = String, Path, description = "Module slug")),
    responses(
        (status = 200, description = "Attempt started", body = StartResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Quiz is locked, see `lock`", body = ErrorResponse),
        (status = 404, description = "No active module with that slug", body = ErrorResponse),
    ),
    tag = "quiz",
    security(
        ("cookie" = [])
    )
)]
async fn quiz_start_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let module = active_module(&state, &slug).await?;

    let started = open_attempt(&state, user, &module, false).await?;
    Ok((StatusCode::OK, Json(started)))
}

#[utoipa::path(
    get,
    path = "/api/v1/quiz/{slug}/question/{order}",
    description = "Question by its order, without the correct answer",
    params(
        ("slug" = String, Path, description = "Module slug"),
        ("order" = i32, Path, description = "Question order, from 1"),
    ),
    responses(
        (status = 200, description = "Question", body = QuestionPayload),
        (status = 400, description = "Order out of range", body = ErrorResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 404, description = "Module or question not found", body = ErrorResponse),
    ),
    tag = "quiz",
    security(
        ("cookie" = [])
    )
)]
async fn quiz_question_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((slug, order)): Path<(String, i32)>,
) -> WebResult<impl IntoResponse> {
    ctx.user()?;
    let module = active_module(&state, &slug).await?;
    let question = question_payload(&state, &module, order).await?;

    Ok((StatusCode::OK, Json(question)))
}

#[utoipa::path(
    post,
    path = "/api/v1/quiz/{slug}/answer",
    description = "Saves the choice for a question and returns immediate feedback",
    params(("slug" = String, Path, description = "Module slug")),
    request_body = AnswerBody,
    responses(
        (status = 200, description = "Answer saved", body = AnswerResponse),
        (status = 400, description = "Missing fields or attempt already submitted", body = ErrorResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 404, description = "Attempt, question or choice not found", body = ErrorResponse),
    ),
    tag = "quiz",
    security(
        ("cookie" = [])
    )
)]
async fn quiz_answer_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<AnswerBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let attempt_id = payload.attempt_id.ok_or_else(|| required("attempt_id"))?;
    let question_id = payload.question_id.ok_or_else(|| required("question_id"))?;
    let choice_id = payload.choice_id.ok_or_else(|| required("choice_id"))?;

    let module = active_module(&state, &slug).await?;

    let attempt = QuizAttempt::find_owned(state.pool(), attempt_id, user.user_id(), module.id())
        .await
        .map_err(attempt_error)?
        .ok_or(WebError::resource_not_found(QuizAttempt::get_resource_type()))?;
    if attempt.is_submitted() {
        return Err(WebError::quiz_attempt_submitted());
    }

    let question = Question::find_in_module(state.pool(), module.id(), question_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Question::get_resource_type()))?;
    let choice = Choice::find_for_question(state.pool(), question.id(), choice_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Choice::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Choice::get_resource_type()))?;

    let recorded = QuizAttempt::record_answer(state.pool(), attempt.id(), question.id(), choice.id())
        .await
        .map_err(attempt_error)?;
    if !recorded {
        return Err(WebError::quiz_attempt_submitted());
    }

    let feedback = Feedback::new(
        choice.is_correct(),
        question.explanation(),
        choice.explanation_if_chosen(),
    );

    let next_order = question.order() + 1;
    Ok((
        StatusCode::OK,
        Json(AnswerResponse {
            feedback,
            next_order,
            done: !state.config().quiz().contains_order(next_order),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/quiz/{slug}/submit",
    description = "Grades the attempt and updates the lockout state. A passed attempt issues \
        a certificate. Submitting twice returns the stored result",
    params(("slug" = String, Path, description = "Module slug")),
    request_body = SubmitBody,
    responses(
        (status = 200, description = "Attempt graded", body = QuizResult),
        (status = 400, description = "Missing attempt id", body = ErrorResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 404, description = "Attempt not found", body = ErrorResponse),
    ),
    tag = "quiz",
    security(
        ("cookie" = [])
    )
)]
async fn quiz_submit_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<SubmitBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let attempt_id = payload.attempt_id.ok_or_else(|| required("attempt_id"))?;
    let module = active_module(&state, &slug).await?;
    let policy = state.config().quiz();
    let now = Utc::now();

    let mut tx = state.pool().begin().await.map_err(attempt_error)?;
    let attempt = QuizAttempt::lock_owned(&mut *tx, attempt_id, user.user_id(), module.id())
        .await
        .map_err(attempt_error)?
        .ok_or(WebError::resource_not_found(QuizAttempt::get_resource_type()))?;

    if attempt.is_submitted() {
        tx.rollback().await.map_err(attempt_error)?;
        let result = build_result(&state, user, attempt).await?;
        return Ok((StatusCode::OK, Json(result)));
    }

    let keys = Question::answer_keys(&mut *tx, module.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;
    let score = score_answers(attempt.answers(), &keys);

    let mut quiz_state = QuizState::lock(&mut tx, user.user_id(), module.id())
        .await
        .map_err(state_error)?;
    quiz_state.reset_if_unlocked(now);
    let passed = quiz_state.apply_submit(policy, score, now);
    quiz_state.save(&mut tx).await.map_err(state_error)?;

    let attempt = attempt
        .mark_submitted(&mut *tx, score, passed, now)
        .await
        .map_err(attempt_error)?;
    tx.commit().await.map_err(attempt_error)?;

    tracing::info!(
        score,
        passed,
        "attempt {} on {} submitted by {}",
        attempt.id(),
        module.slug(),
        user.user_id()
    );

    if passed {
        if let Err(e) =
            certificates::issue_for_attempt(state.pool(), state.mailer(), state.config(), &attempt)
                .await
        {
            tracing::error!("certificate for attempt {} failed: {e}", attempt.id());
        }
    }

    let result = build_result(&state, user, attempt).await?;
    Ok((StatusCode::OK, Json(result)))
}

#[utoipa::path(
    get,
    path = "/api/v1/quiz/{slug}/result/{attempt_id}",
    description = "Result of an attempt with the current lockout state",
    params(
        ("slug" = String, Path, description = "Module slug"),
        ("attempt_id" = Uuid, Path, description = "Attempt id"),
    ),
    responses(
        (status = 200, description = "Attempt result", body = QuizResult),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 404, description = "Attempt not found", body = ErrorResponse),
    ),
    tag = "quiz",
    security(
        ("cookie" = [])
    )
)]
async fn quiz_result_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((slug, attempt_id)): Path<(String, Uuid)>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let module = active_module(&state, &slug).await?;

    let attempt = QuizAttempt::find_owned(state.pool(), attempt_id, user.user_id(), module.id())
        .await
        .map_err(attempt_error)?
        .ok_or(WebError::resource_not_found(QuizAttempt::get_resource_type()))?;

    let result = build_result(&state, user, attempt).await?;
    Ok((StatusCode::OK, Json(result)))
}

#[utoipa::path(
    post,
    path = "/api/v1/quiz/{slug}/retake",
    description = "Resets the attempt counter and starts a new attempt, unless locked",
    params(("slug" = String, Path, description = "Module slug")),
    responses(
        (status = 200, description = "Attempt started", body = StartResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Quiz is locked, see `lock`", body = ErrorResponse),
        (status = 404, description = "No active module with that slug", body = ErrorResponse),
    ),
    tag = "quiz",
    security(
        ("cookie" = [])
    )
)]
async fn quiz_retake_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let module = active_module(&state, &slug).await?;

    let started = open_attempt(&state, user, &module, true).await?;
    Ok((StatusCode::OK, Json(started)))
}
