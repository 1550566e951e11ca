use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::web::middlewares::AUTH_TOKEN;

pub struct CookieAuthModifier;

impl Modify for CookieAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    AUTH_TOKEN,
                    "JWT token for current user",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::landing::landing_handler,
        crate::web::routes::landing::health_handler,
        crate::web::routes::accounts::account_me_handler,
        crate::web::routes::accounts::trainee_register_handler,
        crate::web::routes::accounts::trainee_pending_handler,
        crate::web::routes::accounts::trainee_confirm_handler,
        crate::web::routes::accounts::trainee_login_handler,
        crate::web::routes::accounts::professional_register_handler,
        crate::web::routes::accounts::professional_login_handler,
        crate::web::routes::accounts::logout_handler,
        crate::web::routes::training::training_home_handler,
        crate::web::routes::training::training_list_handler,
        crate::web::routes::training::training_detail_handler,
        crate::web::routes::training::public_link_handler,
        crate::web::routes::quiz::quiz_start_handler,
        crate::web::routes::quiz::quiz_question_handler,
        crate::web::routes::quiz::quiz_answer_handler,
        crate::web::routes::quiz::quiz_submit_handler,
        crate::web::routes::quiz::quiz_result_handler,
        crate::web::routes::quiz::quiz_retake_handler,
        crate::web::routes::certificates::certificates_list_handler,
        crate::web::routes::certificates::certificate_download_handler,
        crate::web::routes::certificates::certificate_view_handler,
        crate::web::routes::dashboard::dashboard_home_handler,
        crate::web::routes::dashboard::dashboard_profile_handler,
        crate::web::routes::dashboard::capacitaciones_menu_handler,
        crate::web::routes::dashboard::modality_selector_handler,
        crate::web::routes::dashboard::links_list_handler,
        crate::web::routes::dashboard::link_create_handler,
        crate::web::routes::dashboard::link_share_handler,
        crate::web::routes::dashboard::link_deactivate_handler,
        crate::web::routes::presencial::presencial_history_handler,
        crate::web::routes::presencial::presencial_module_handler,
        crate::web::routes::presencial::presencial_quiz_handler,
        crate::web::routes::presencial::presencial_submit_handler,
        crate::web::routes::presencial::presencial_planilla_handler,
        crate::web::routes::admin::admin_users_handler,
        crate::web::routes::admin::admin_user_staff_handler,
        crate::web::routes::admin::admin_quiz_reset_handler,
        crate::web::routes::admin::admin_modules_handler,
        crate::web::routes::admin::admin_module_create_handler,
        crate::web::routes::admin::admin_module_update_handler,
        crate::web::routes::admin::admin_module_delete_handler,
        crate::web::routes::admin::admin_certificates_handler,
    ),
    modifiers(&CookieAuthModifier),
    tags(
        (name = "landing", description = "Entry redirect and health check"),
        (name = "account", description = "Current user and logout"),
        (name = "trainee", description = "Trainee registration and login"),
        (name = "professional", description = "Professional registration and login"),
        (name = "training", description = "Training modules and share-link entry"),
        (name = "quiz", description = "Online quiz with attempts and lockouts"),
        (name = "certificates", description = "Issued certificates"),
        (name = "dashboard", description = "Professional dashboard and share links"),
        (name = "presencial", description = "Classroom sessions"),
        (name = "admin", description = "Staff administration"),
    ),
)]
pub struct ApiDoc;
