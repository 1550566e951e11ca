mod common;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::common::{
    Action, Flow, answer_all_actions, quiz_start_action, quiz_submit_action, seed_empty_module,
    seed_module, setup_server, setup_server_with_mailer, setup_test_db, trainee_confirm_action,
    trainee_register_action, trainee_signup_actions,
};

const SLUG: &str = "ergonomia";
const TOTAL: usize = 10;

/// Answers the question found at `pointer` inside the body stored as
/// `question_key`, on the attempt stored as `attempt_key`.
fn answer_action(
    attempt_key: &'static str,
    question_key: &'static str,
    pointer: &'static str,
    label: &'static str,
) -> Action {
    Action::new("quiz_answer", "POST", &format!("/api/v1/quiz/{SLUG}/answer")).with_dyn_body(
        move |ctx| {
            let question = ctx
                .get(question_key)
                .pointer(pointer)
                .expect("stored question");
            let choice = question["choices"]
                .as_array()
                .and_then(|choices| choices.iter().find(|c| c["label"] == label))
                .expect("choice with label");
            json!({
                "attempt_id": ctx.str_at(attempt_key, "/attempt/id"),
                "question_id": question["id"],
                "choice_id": choice["id"],
            })
        },
    )
}

fn result_action(attempt_key: &'static str) -> Action {
    Action::new("quiz_result", "GET", "").with_dyn_path(move |ctx| {
        format!(
            "/api/v1/quiz/{SLUG}/result/{}",
            ctx.str_at(attempt_key, "/attempt/id")
        )
    })
}

#[tokio::test]
async fn route_quiz_requires_login_test() {
    let pool = setup_test_db().await;
    seed_module(&pool, SLUG, TOTAL).await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(quiz_start_action(SLUG).with_expect(StatusCode::UNAUTHORIZED))
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_quiz_pass_issues_certificate_test() {
    let pool = setup_test_db().await;
    seed_module(&pool, SLUG, TOTAL).await;
    let (mut server, mailer) = setup_server_with_mailer(&pool).await;

    Flow::new()
        .steps(trainee_signup_actions("20123456783", "juan@mail.com"))
        .step(quiz_start_action(SLUG).with_save_as("start").assert_body(|body| {
            let body: Value = serde_json::from_str(body).unwrap();
            assert_eq!(body["question"]["order"], 1);
            assert_eq!(body["question"]["total"], 10);
            // correctness never leaves the server before answering
            assert!(!body.to_string().contains("is_correct"));
        }))
        .steps(answer_all_actions(SLUG, "start", TOTAL, "A"))
        .step(quiz_submit_action(SLUG, "start").assert_body(|body| {
            let body: Value = serde_json::from_str(body).unwrap();
            assert_eq!(body["attempt"]["score"], 10);
            assert_eq!(body["attempt"]["passed"], true);
            // a pass opens the cool-off before a new attempt
            assert_eq!(body["locked_now"], true);
            assert_eq!(body["attempts_left"], 3);
            assert!(body["state"]["retake_available_at"].is_string());
            assert!(body["certificate_id"].is_string());
        }))
        // submitting again returns the stored result
        .step(quiz_submit_action(SLUG, "start").assert_body(|body| {
            let body: Value = serde_json::from_str(body).unwrap();
            assert_eq!(body["attempt"]["score"], 10);
        }))
        .step(
            Action::new("certificates", "GET", "/api/v1/certificates/")
                .with_save_as("certificates")
                .assert_body(|body| {
                    let body: Value = serde_json::from_str(body).unwrap();
                    let items = body.as_array().unwrap();
                    assert_eq!(items.len(), 1);
                    assert_eq!(items[0]["is_valid"], true);
                }),
        )
        .step(
            Action::new("certificate_download", "GET", "")
                .with_dyn_path(|ctx| {
                    format!(
                        "/api/v1/certificates/{}/download",
                        ctx.str_at("certificates", "/0/id")
                    )
                })
                .assert_header("content-type", |value| assert_eq!(value, "application/pdf"))
                .assert_header("content-disposition", |value| {
                    assert!(value.starts_with("attachment;"));
                })
                .assert_bytes(|bytes| assert!(bytes.starts_with(b"%PDF"))),
        )
        .step(
            quiz_start_action(SLUG)
                .with_expect(StatusCode::FORBIDDEN)
                .assert_body(|body| {
                    let body: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(body["lock"]["locked"], true);
                    assert_eq!(body["lock"]["last_passed"], true);
                    assert!(body["lock"]["lockout_until"].is_null());
                    assert!(body["lock"]["retake_available_at"].is_string());
                }),
        )
        .run(&mut server, pool)
        .await;

    let sent = mailer.sent();
    let holder_mail = sent
        .iter()
        .find(|m| m.to == vec![String::from("juan@mail.com")])
        .expect("certificate mail to the holder");
    assert!(holder_mail.cc.contains(&String::from("rrhh@metalurgica.com")));
    assert_eq!(holder_mail.attachments.len(), 1);
}

#[tokio::test]
async fn route_quiz_lockout_test() {
    let pool = setup_test_db().await;
    seed_module(&pool, SLUG, TOTAL).await;
    let mut server = setup_server(&pool).await;

    let mut flow = Flow::new().steps(trainee_signup_actions("20123456783", "juan@mail.com"));
    for attempt in 1..=3 {
        flow = flow
            .step(quiz_start_action(SLUG).with_save_as("start"))
            .steps(answer_all_actions(SLUG, "start", TOTAL, "B"))
            .step(quiz_submit_action(SLUG, "start").assert_body(move |body| {
                let body: Value = serde_json::from_str(body).unwrap();
                assert_eq!(body["attempt"]["passed"], false);
                assert_eq!(body["state"]["attempts_used"], attempt);
                assert_eq!(body["attempts_left"], 3 - attempt);
                assert_eq!(body["locked_now"], attempt == 3);
            }));
    }

    flow.step(result_action("start").assert_body(|body| {
        let body: Value = serde_json::from_str(body).unwrap();
        assert!(body["attempt"]["submitted_at"].is_string());
        assert_eq!(body["attempts_left"], 0);
        assert_eq!(body["locked_now"], true);
        assert_eq!(body["pass_score"], 8);
        assert_eq!(body["total_questions"], 10);
        assert!(body["certificate_id"].is_null());
    }))
    .step(
        quiz_start_action(SLUG)
            .with_expect(StatusCode::FORBIDDEN)
            .assert_body(|body| {
                let body: Value = serde_json::from_str(body).unwrap();
                assert_eq!(body["lock"]["locked"], true);
                assert!(body["lock"]["lockout_until"].is_string());
            }),
    )
    .step(
        Action::new("retake", "POST", &format!("/api/v1/quiz/{SLUG}/retake"))
            .with_expect(StatusCode::FORBIDDEN),
    )
    .run(&mut server, pool)
    .await;
}

#[tokio::test]
async fn route_quiz_answer_validation_test() {
    let pool = setup_test_db().await;
    seed_module(&pool, SLUG, TOTAL).await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .steps(trainee_signup_actions("20123456783", "juan@mail.com"))
        .step(quiz_start_action(SLUG).with_save_as("start"))
        .step(
            Action::new("answer_missing_choice", "POST", &format!("/api/v1/quiz/{SLUG}/answer"))
                .with_dyn_body(|ctx| {
                    serde_json::json!({
                        "attempt_id": ctx.str_at("start", "/attempt/id"),
                        "question_id": ctx.str_at("start", "/question/id"),
                    })
                })
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("question_out_of_range", "GET", &format!("/api/v1/quiz/{SLUG}/question/11"))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("unknown_module", "POST", "/api/v1/quiz/no-existe/start")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_quiz_answer_feedback_test() {
    let pool = setup_test_db().await;
    seed_module(&pool, SLUG, TOTAL).await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .steps(trainee_signup_actions("20123456783", "juan@mail.com"))
        .step(quiz_start_action(SLUG).with_save_as("start"))
        .step(answer_action("start", "start", "/question", "A").assert_body(|body| {
            let body: Value = serde_json::from_str(body).unwrap();
            assert_eq!(body["correct"], true);
            assert_eq!(body["title"], "¡Así es!");
            assert_eq!(body["text"], "Correcto");
            assert_eq!(body["next_order"], 2);
            assert_eq!(body["done"], false);
        }))
        // changing the answer explains the wrong choice, not the question
        .step(answer_action("start", "start", "/question", "B").assert_body(|body| {
            let body: Value = serde_json::from_str(body).unwrap();
            assert_eq!(body["correct"], false);
            assert_eq!(body["title"], "No exactamente");
            assert_eq!(body["text"], "Revisá el video");
        }))
        .step(
            Action::new("quiz_question", "GET", &format!("/api/v1/quiz/{SLUG}/question/{TOTAL}"))
                .with_save_as("last"),
        )
        .step(answer_action("start", "last", "", "C").assert_body(|body| {
            let body: Value = serde_json::from_str(body).unwrap();
            assert_eq!(body["correct"], false);
            assert_eq!(body["text"], "Respuesta incorrecta.");
            assert_eq!(body["next_order"], 11);
            assert_eq!(body["done"], true);
        }))
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_quiz_answer_ownership_test() {
    let pool = setup_test_db().await;
    seed_module(&pool, SLUG, TOTAL).await;
    seed_module(&pool, "ruido", 2).await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .steps(trainee_signup_actions("20123456783", "juan@mail.com"))
        .step(quiz_start_action(SLUG).with_save_as("start"))
        .step(
            Action::new("other_module_question", "GET", "/api/v1/quiz/ruido/question/1")
                .with_save_as("other_module"),
        )
        .step(
            Action::new("second_question", "GET", &format!("/api/v1/quiz/{SLUG}/question/2"))
                .with_save_as("second"),
        )
        .step(
            answer_action("start", "other_module", "", "A").with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("choice_of_other_question", "POST", &format!("/api/v1/quiz/{SLUG}/answer"))
                .with_dyn_body(|ctx| {
                    json!({
                        "attempt_id": ctx.str_at("start", "/attempt/id"),
                        "question_id": ctx.str_at("start", "/question/id"),
                        "choice_id": ctx.str_at("second", "/choices/0/id"),
                    })
                })
                .with_expect(StatusCode::NOT_FOUND),
        )
        // a second trainee cannot touch the first one's attempt
        .step(trainee_register_action("27301234561", "ana@mail.com").with_clear_cookies(true))
        .step(trainee_confirm_action())
        .step(answer_action("start", "start", "/question", "A").with_expect(StatusCode::NOT_FOUND))
        .step(result_action("start").with_expect(StatusCode::NOT_FOUND))
        .step(quiz_submit_action(SLUG, "start").with_expect(StatusCode::NOT_FOUND))
        // answering after submitting is rejected
        .step(quiz_start_action(SLUG).with_save_as("own"))
        .step(quiz_submit_action(SLUG, "own").assert_body(|body| {
            let body: Value = serde_json::from_str(body).unwrap();
            assert_eq!(body["attempt"]["score"], 0);
        }))
        .step(
            answer_action("own", "own", "/question", "A")
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert!(body.contains("already submitted"))),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_quiz_retake_after_lockout_test() {
    let pool = setup_test_db().await;
    seed_module(&pool, SLUG, TOTAL).await;
    let mut server = setup_server(&pool).await;

    let mut flow = Flow::new().steps(trainee_signup_actions("20123456783", "juan@mail.com"));
    for _ in 0..3 {
        flow = flow
            .step(quiz_start_action(SLUG).with_save_as("start"))
            .step(quiz_submit_action(SLUG, "start"));
    }
    flow.step(
        Action::new("retake_locked", "POST", &format!("/api/v1/quiz/{SLUG}/retake"))
            .with_expect(StatusCode::FORBIDDEN),
    )
    .play(&mut server)
    .await;

    pool.expire_quiz_waits().await;

    Flow::new()
        .step(
            Action::new("retake", "POST", &format!("/api/v1/quiz/{SLUG}/retake"))
                .with_save_as("retake")
                .assert_body(|body| {
                    let body: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(body["question"]["order"], 1);
                    assert!(body["attempt"]["submitted_at"].is_null());
                }),
        )
        .step(result_action("retake").assert_body(|body| {
            let body: Value = serde_json::from_str(body).unwrap();
            assert_eq!(body["state"]["attempts_used"], 0);
            assert_eq!(body["attempts_left"], 3);
            assert_eq!(body["locked_now"], false);
            assert!(body["state"]["lockout_until"].is_null());
        }))
        .steps(answer_all_actions(SLUG, "retake", TOTAL, "A"))
        .step(quiz_submit_action(SLUG, "retake").assert_body(|body| {
            let body: Value = serde_json::from_str(body).unwrap();
            assert_eq!(body["attempt"]["passed"], true);
        }))
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_quiz_start_without_questions_test() {
    let pool = setup_test_db().await;
    seed_empty_module(&pool, "vacio").await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .steps(trainee_signup_actions("20123456783", "juan@mail.com"))
        .step(quiz_start_action("vacio").with_expect(StatusCode::NOT_FOUND))
        .step(
            Action::new("retake", "POST", "/api/v1/quiz/vacio/retake")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .play(&mut server)
        .await;

    assert_eq!(pool.count_rows("quiz_attempts").await, 0);
    assert_eq!(pool.count_rows("quiz_states").await, 0);
}
