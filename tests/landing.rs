mod common;
use axum::http::StatusCode;

use crate::common::{
    Action, Flow, professional_register_action, setup_server, setup_test_db,
    trainee_signup_actions,
};

#[tokio::test]
async fn route_landing_redirect_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            Action::new("health", "GET", "/health/")
                .assert_bytes(|bytes| assert_eq!(bytes, b"OK")),
        )
        .step(
            Action::new("landing_anonymous", "GET", "/")
                .with_expect(StatusCode::SEE_OTHER)
                .assert_header("location", |value| assert_eq!(value, "/acceso/")),
        )
        .steps(trainee_signup_actions("20123456783", "juan@mail.com"))
        .step(
            Action::new("landing_trainee", "GET", "/")
                .with_expect(StatusCode::SEE_OTHER)
                .assert_header("location", |value| assert_eq!(value, "/capacitacion/")),
        )
        .step(professional_register_action("lperez", "laura@ergo.com").with_clear_cookies(true))
        .step(
            Action::new("landing_professional", "GET", "/")
                .with_expect(StatusCode::SEE_OTHER)
                .assert_header("location", |value| assert_eq!(value, "/dashboard/")),
        )
        .run(&mut server, pool)
        .await;
}
