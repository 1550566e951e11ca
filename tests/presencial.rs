mod common;
use axum::http::StatusCode;
use serde_json::{Map, Value, json};

use crate::common::{
    Action, Flow, FlowContext, professional_register_action, seed_module, setup_server,
    setup_test_db, trainee_signup_actions,
};

const SLUG: &str = "ergonomia";
const TOTAL: usize = 10;

/// Maps every question of the saved quiz to its choice labelled `label`.
fn answers_with(ctx: &FlowContext, label: &str) -> Value {
    let quiz = ctx.get("quiz");
    let mut answers = Map::new();
    for question in quiz["questions"].as_array().expect("questions") {
        let choice = question["choices"]
            .as_array()
            .and_then(|choices| choices.iter().find(|c| c["label"] == label))
            .expect("choice with label");
        let id = question["id"].as_str().expect("question id").to_string();
        answers.insert(id, choice["id"].clone());
    }
    Value::Object(answers)
}

#[tokio::test]
async fn route_presencial_session_test() {
    let pool = setup_test_db().await;
    seed_module(&pool, SLUG, TOTAL).await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(professional_register_action("lperez", "laura@ergo.com"))
        .step(
            Action::new("presencial_module", "GET", &format!("/api/v1/dashboard/presencial/{SLUG}"))
                .assert_body(|body| assert!(body.contains(SLUG))),
        )
        .step(
            Action::new(
                "presencial_quiz",
                "GET",
                &format!("/api/v1/dashboard/presencial/{SLUG}/quiz"),
            )
            .with_save_as("quiz")
            .assert_body(|body| {
                let body: Value = serde_json::from_str(body).unwrap();
                assert_eq!(body["pass_score"], 8);
                assert_eq!(body["questions"].as_array().unwrap().len(), TOTAL);
                assert_eq!(body["questions"][0]["choices"].as_array().unwrap().len(), 2);
            }),
        )
        .step(
            Action::new(
                "presencial_submit_pass",
                "POST",
                &format!("/api/v1/dashboard/presencial/{SLUG}/quiz/submit"),
            )
            .with_dyn_body(|ctx| {
                json!({
                    "answers": answers_with(ctx, "A"),
                    "session_date": "2026-03-05",
                    "location": "Planta Avellaneda",
                    "participants_count": 14,
                })
            })
            .with_expect(StatusCode::CREATED)
            .assert_body(|body| {
                let body: Value = serde_json::from_str(body).unwrap();
                assert_eq!(body["score"], TOTAL);
                assert_eq!(body["total"], TOTAL);
                assert_eq!(body["passed"], true);
                assert_eq!(body["session"]["session_date"], "2026-03-05");
                assert_eq!(body["session"]["participants_count"], 14);
            }),
        )
        // unanswered questions count as wrong
        .step(
            Action::new(
                "presencial_submit_fail",
                "POST",
                &format!("/api/v1/dashboard/presencial/{SLUG}/quiz/submit"),
            )
            .with_body(json!({"answers": {}}))
            .with_expect(StatusCode::CREATED)
            .assert_body(|body| {
                let body: Value = serde_json::from_str(body).unwrap();
                assert_eq!(body["score"], 0);
                assert_eq!(body["passed"], false);
                let details = body["details"].as_array().unwrap();
                assert_eq!(details.len(), TOTAL);
                assert!(details.iter().all(|d| d["chosen_choice_id"].is_null()));
                assert!(details.iter().all(|d| !d["correct_choice_id"].is_null()));
            }),
        )
        .step(
            Action::new(
                "presencial_submit_invalid",
                "POST",
                &format!("/api/v1/dashboard/presencial/{SLUG}/quiz/submit"),
            )
            .with_body(json!({"answers": {}, "participants_count": -1}))
            .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("presencial_history", "GET", "/api/v1/dashboard/presencial/historial")
                .assert_body(|body| {
                    let body: Value = serde_json::from_str(body).unwrap();
                    let sessions = body.as_array().unwrap();
                    assert_eq!(sessions.len(), 2);
                    assert!(sessions.iter().all(|s| s["module_slug"] == SLUG));
                }),
        )
        .step(
            Action::new(
                "presencial_planilla",
                "GET",
                &format!("/api/v1/dashboard/presencial/{SLUG}/planilla"),
            )
            .with_param("date", "2026-03-05")
            .with_param("rows", "20")
            .assert_header("content-type", |value| assert_eq!(value, "application/pdf"))
            .assert_header("content-disposition", |value| {
                assert_eq!(value, "attachment; filename=\"planilla_ergonomia_20260305.pdf\"")
            })
            .assert_bytes(|bytes| assert!(bytes.starts_with(b"%PDF"))),
        )
        .step(
            Action::new("presencial_unknown", "GET", "/api/v1/dashboard/presencial/no-existe/quiz")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_presencial_professional_only_test() {
    let pool = setup_test_db().await;
    seed_module(&pool, SLUG, 3).await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            Action::new("presencial_anonymous", "GET", "/api/v1/dashboard/presencial/historial")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .steps(trainee_signup_actions("20123456783", "juan@mail.com"))
        .step(
            Action::new(
                "presencial_trainee",
                "GET",
                &format!("/api/v1/dashboard/presencial/{SLUG}/quiz"),
            )
            .with_expect(StatusCode::FORBIDDEN),
        )
        .run(&mut server, pool)
        .await;
}
