use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use validator::Validate;

use crate::{
    documents::{self, PlanillaDocument},
    model::{
        CrudRepository, ResourceTyped,
        entity::{
            Choice, PresencialSession, PresencialSessionCreate, PresencialSessionRow, Question,
            UserEntity,
        },
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::presencial::{
            PlanillaQuery, PresencialQuestion, PresencialQuiz, PresencialResult,
            PresencialSubmitBody, grade,
        },
        error::ErrorResponse,
        middlewares,
    },
};

use super::{certificates::pdf_response, training::active_module};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/historial", get(presencial_history_handler))
        .route("/{slug}", get(presencial_module_handler))
        .route("/{slug}/quiz", get(presencial_quiz_handler))
        .route("/{slug}/quiz/submit", post(presencial_submit_handler))
        .route("/{slug}/planilla", get(presencial_planilla_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/presencial/historial",
    description = "Own classroom sessions, newest first",
    responses(
        (status = 200, description = "Sessions", body = Vec<PresencialSessionRow>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only professionals run classroom sessions", body = ErrorResponse),
    ),
    tag = "presencial",
    security(
        ("cookie" = [])
    )
)]
async fn presencial_history_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.professional()?;
    let rows = PresencialSession::history(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(PresencialSession::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(rows)))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/presencial/{slug}",
    description = "Module content for classroom use",
    params(("slug" = String, Path, description = "Module slug")),
    responses(
        (status = 200, description = "Module", body = crate::model::entity::TrainingModule),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only professionals run classroom sessions", body = ErrorResponse),
        (status = 404, description = "No active module with that slug", body = ErrorResponse),
    ),
    tag = "presencial",
    security(
        ("cookie" = [])
    )
)]
async fn presencial_module_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> WebResult<impl IntoResponse> {
    ctx.professional()?;
    let module = active_module(&state, &slug).await?;
    Ok((StatusCode::OK, Json(module)))
}

async fn module_questions(
    state: &AppState,
    module_id: uuid::Uuid,
) -> WebResult<(Vec<Question>, Vec<Choice>)> {
    let questions = Question::list_for_module(state.pool(), module_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;
    let choices = Choice::list_for_module(state.pool(), module_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Choice::get_resource_type(), e))?;
    Ok((questions, choices))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/presencial/{slug}/quiz",
    description = "Every question of the module with its choices, without the answers",
    params(("slug" = String, Path, description = "Module slug")),
    responses(
        (status = 200, description = "Quiz", body = PresencialQuiz),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only professionals run classroom sessions", body = ErrorResponse),
        (status = 404, description = "No active module with that slug", body = ErrorResponse),
    ),
    tag = "presencial",
    security(
        ("cookie" = [])
    )
)]
async fn presencial_quiz_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> WebResult<impl IntoResponse> {
    ctx.professional()?;
    let module = active_module(&state, &slug).await?;
    let (questions, choices) = module_questions(&state, module.id()).await?;

    Ok((
        StatusCode::OK,
        Json(PresencialQuiz {
            pass_score: state.config().quiz().pass_score(),
            questions: PresencialQuestion::group(&questions, &choices),
            module,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/dashboard/presencial/{slug}/quiz/submit",
    description = "Grades a classroom quiz and records the session. \
        No attempts, lockouts or certificates are involved",
    params(("slug" = String, Path, description = "Module slug")),
    request_body = PresencialSubmitBody,
    responses(
        (status = 201, description = "Session recorded", body = PresencialResult),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only professionals run classroom sessions", body = ErrorResponse),
        (status = 404, description = "No active module with that slug", body = ErrorResponse),
    ),
    tag = "presencial",
    security(
        ("cookie" = [])
    )
)]
async fn presencial_submit_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<PresencialSubmitBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.professional()?;
    payload.validate()?;
    let module = active_module(&state, &slug).await?;
    let (questions, choices) = module_questions(&state, module.id()).await?;

    let details = grade(&questions, &choices, &payload.answers);
    let score = details.iter().filter(|d| d.correct).count() as i32;
    let policy = state.config().quiz();
    let passed = policy.is_passing(score);

    let data = PresencialSessionCreate {
        module_id: module.id(),
        session_date: payload
            .session_date
            .unwrap_or_else(|| Utc::now().date_naive()),
        location: payload.location,
        participants_count: payload.participants_count,
        quiz_score: Some(score),
        quiz_passed: Some(passed),
        notes: payload.notes,
    };
    let session = PresencialSession::create(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(PresencialSession::get_resource_type(), e))?;
    tracing::info!(
        "presencial session {} for {}: {score}/{}",
        session.id(),
        module.slug(),
        questions.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(PresencialResult {
            session,
            score,
            total: questions.len() as i32,
            pass_score: policy.pass_score(),
            passed,
            details,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/presencial/{slug}/planilla",
    description = "Attendance sheet PDF for a classroom session",
    params(
        ("slug" = String, Path, description = "Module slug"),
        PlanillaQuery,
    ),
    responses(
        (status = 200, description = "PDF file", content_type = "application/pdf"),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only professionals run classroom sessions", body = ErrorResponse),
        (status = 404, description = "No active module with that slug", body = ErrorResponse),
    ),
    tag = "presencial",
    security(
        ("cookie" = [])
    )
)]
async fn presencial_planilla_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PlanillaQuery>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.professional()?;
    let module = active_module(&state, &slug).await?;
    let professional = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(UserEntity::get_resource_type()))?;

    let now = Utc::now();
    let session_date = query.date.unwrap_or_else(|| now.date_naive());
    let professional_name = professional.display_name();
    let document = PlanillaDocument {
        module_title: module.title(),
        professional_name: &professional_name,
        profession: professional.profession(),
        license_number: professional.license_number(),
        session_date,
        rows: query.rows.unwrap_or(documents::DEFAULT_ROWS),
        generated_at: now,
    };
    let bytes = documents::planilla_pdf(&document).map_err(WebError::server_document_error)?;

    let filename = format!(
        "planilla_{}_{}.pdf",
        module.slug(),
        session_date.format("%Y%m%d")
    );
    Ok(pdf_response(&filename, "attachment", bytes))
}
