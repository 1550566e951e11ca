//! Cookies kept by the service: the session, the pending trainee
//! registration and the share-link markers.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tower_cookies::{Cookie, Cookies, cookie::SameSite};
use uuid::Uuid;

use crate::{
    auth::{self, session_claims},
    web::{WebError, WebResult},
};

pub static AUTH_TOKEN: &str = "SID";
pub static PENDING_TOKEN: &str = "PENDING";
pub static TARGET_MODULE: &str = "target_module";
pub static CAPACITACION_REF: &str = "capacitacion_ref";

const PENDING_MINUTES: i64 = 30;

#[derive(Serialize, Deserialize)]
struct Expiring<T> {
    data: T,
    exp: i64,
}

fn cookie(name: &'static str, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie
}

fn remove(cookies: &Cookies, name: &'static str) {
    let mut cookie = Cookie::from(name);
    cookie.set_path("/");
    cookies.remove(cookie);
}

pub fn start_session(cookies: &Cookies, user_id: Uuid, jwt: &str) -> WebResult<()> {
    let token = auth::generate_token(&session_claims(user_id), jwt)
        .map_err(|e| WebError::server_crypt_error(e.into()))?;
    cookies.add(cookie(AUTH_TOKEN, token));
    Ok(())
}

pub fn end_session(cookies: &Cookies) {
    remove(cookies, AUTH_TOKEN);
}

/// Stores `data` in a signed cookie that expires after half an hour.
pub fn set_pending<T: Serialize>(cookies: &Cookies, data: T, jwt: &str) -> WebResult<()> {
    let claims = Expiring {
        data,
        exp: (Utc::now() + Duration::minutes(PENDING_MINUTES)).timestamp(),
    };
    let token = auth::generate_token(&claims, jwt)
        .map_err(|e| WebError::server_crypt_error(e.into()))?;
    cookies.add(cookie(PENDING_TOKEN, token));
    Ok(())
}

/// `None` when the cookie is missing, expired or was not signed by us.
pub fn pending<T: DeserializeOwned>(cookies: &Cookies, jwt: &str) -> Option<T> {
    let token = cookies.get(PENDING_TOKEN)?;
    match auth::process_token::<Expiring<T>, _>(token.value(), jwt) {
        Ok(data) => Some(data.claims.data),
        Err(e) => {
            tracing::debug!("ignoring pending registration cookie: {e}");
            None
        }
    }
}

pub fn clear_pending(cookies: &Cookies) {
    remove(cookies, PENDING_TOKEN);
}

pub fn remember_target(cookies: &Cookies, module_slug: &str, link_id: Option<Uuid>) {
    cookies.add(cookie(TARGET_MODULE, module_slug.to_string()));
    if let Some(link_id) = link_id {
        cookies.add(cookie(CAPACITACION_REF, link_id.to_string()));
    }
}

pub fn target_module(cookies: &Cookies) -> Option<String> {
    cookies
        .get(TARGET_MODULE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

pub fn clear_target(cookies: &Cookies) {
    remove(cookies, TARGET_MODULE);
    remove(cookies, CAPACITACION_REF);
}
