mod common;
use axum::http::StatusCode;
use ergo::web::middlewares::{AUTH_TOKEN, PENDING_TOKEN};
use serde_json::Value;
use tower_cookies::cookie::SameSite;

use crate::common::{
    Action, Flow, professional_login_action, professional_register_action, setup_server,
    setup_test_db, trainee_confirm_action, trainee_login_action, trainee_register_action,
};

#[tokio::test]
async fn route_professional_register_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            professional_register_action("lperez", "Laura@Ergo.com")
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
                    assert_eq!(cookie.path(), Some("/"));
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    let body: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(body["redirect"], "/dashboard/");
                    assert_eq!(body["user"]["email"], "laura@ergo.com");
                }),
        )
        .step(Action::new("me", "GET", "/api/v1/account/me").assert_body(|body| {
            assert!(body.contains("lperez"));
        }))
        // same e-mail, different case
        .step(
            professional_register_action("otro", "LAURA@ergo.com")
                .with_save_cookies(false)
                .with_expect(StatusCode::CONFLICT),
        )
        .step(
            professional_register_action("lperez", "otra@ergo.com")
                .with_save_cookies(false)
                .with_expect(StatusCode::CONFLICT),
        )
        .step(
            Action::new("logout", "POST", "/api/v1/professional/logout")
                .with_expect(StatusCode::NO_CONTENT),
        )
        .step(
            Action::new("me", "GET", "/api/v1/account/me")
                .with_clear_cookies(true)
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_professional_register_validation_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            Action::new("register", "POST", "/api/v1/professional/register")
                .with_body(serde_json::json!({
                    "first_name": "Laura",
                    "last_name": "Pérez",
                    "dni": "30.123.456",
                    "email": "laura@ergo.com",
                    "profession": "Ingeniera",
                    "username": "lp",
                    "password1": "segura-123",
                    "password2": "distinta-123",
                }))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| {
                    let body: Value = serde_json::from_str(body).unwrap();
                    let fields: Vec<&str> = body["errors"]
                        .as_array()
                        .unwrap()
                        .iter()
                        .filter_map(|e| e["field"].as_str())
                        .collect();
                    assert!(fields.contains(&"dni"));
                    assert!(fields.contains(&"username"));
                    assert!(fields.contains(&"password1"));
                }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_professional_login_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(professional_register_action("lperez", "laura@ergo.com").with_save_cookies(false))
        .step(
            professional_login_action("lperez", "incorrecta")
                .with_clear_cookies(true)
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(
            professional_login_action("nadie", "segura-123")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        // e-mail works as login too
        .step(
            professional_login_action("Laura@Ergo.com", "segura-123")
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    let body: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(body["redirect"], "/dashboard/");
                }),
        )
        .step(
            Action::new("login_next", "POST", "/api/v1/professional/login")
                .with_body(serde_json::json!({
                    "login": "lperez",
                    "password": "segura-123",
                    "next": "/certificados/",
                }))
                .assert_body(|body| {
                    let body: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(body["redirect"], "/certificados/");
                }),
        )
        .step(
            Action::new("login_external_next", "POST", "/api/v1/professional/login")
                .with_body(serde_json::json!({
                    "login": "lperez",
                    "password": "segura-123",
                    "next": "//evil.example.com/",
                }))
                .assert_body(|body| {
                    let body: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(body["redirect"], "/dashboard/");
                }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_trainee_registration_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(Action::new("nothing_pending", "GET", "/api/v1/trainee/confirm").with_expect(StatusCode::NOT_FOUND))
        .step(
            trainee_register_action("20-12345678-3", "Juan@Mail.com")
                .assert_cookie(PENDING_TOKEN, |cookie| {
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    let body: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(body["cuil"], "20123456783");
                    assert_eq!(body["email"], "juan@mail.com");
                }),
        )
        .step(Action::new("pending", "GET", "/api/v1/trainee/confirm").assert_body(|body| {
            assert!(body.contains("Metalúrgica Sur"));
        }))
        .step(trainee_confirm_action().assert_body(|body| {
            let body: Value = serde_json::from_str(body).unwrap();
            assert_eq!(body["redirect"], "/capacitacion/");
        }))
        // the pending registration is consumed
        .step(trainee_confirm_action().with_expect(StatusCode::NOT_FOUND))
        .step(
            trainee_register_action("20.12345678.3", "otro@mail.com")
                .with_expect(StatusCode::CONFLICT),
        )
        .step(
            trainee_register_action("27-87654321-4", "JUAN@mail.com")
                .with_expect(StatusCode::CONFLICT),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_trainee_confirm_conflict_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(trainee_register_action("20123456783", "compartido@mail.com"))
        // the e-mail is taken while the registration waits for confirmation
        .step(
            professional_register_action("lperez", "compartido@mail.com").with_save_cookies(false),
        )
        .step(
            trainee_confirm_action()
                .with_expect(StatusCode::CONFLICT)
                .assert_body(|body| {
                    assert!(body.contains("email is already registered"));
                }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_trainee_login_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(trainee_register_action("20123456783", "juan@mail.com"))
        .step(trainee_confirm_action())
        .step(
            trainee_login_action("20-12345678-3", "otro@mail.com")
                .with_clear_cookies(true)
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(
            trainee_login_action("abc", "juan@mail.com").with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(
            trainee_login_action("20-12345678-3", " Juan@Mail.com ").assert_cookie(
                AUTH_TOKEN,
                |cookie| {
                    assert_eq!(cookie.path(), Some("/"));
                },
            ),
        )
        // trainees have no dashboard
        .step(Action::new("dashboard", "GET", "/api/v1/dashboard/").with_expect(StatusCode::FORBIDDEN))
        .run(&mut server, pool)
        .await;
}
