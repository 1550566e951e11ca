use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub exp: i64,
}

/// Claims for a one-day session of `user_id`.
pub fn session_claims(user_id: Uuid) -> UserClaims {
    UserClaims {
        sub: user_id.to_string(),
        exp: (Utc::now() + Duration::days(1)).timestamp(),
    }
}

pub fn generate_token<C: Serialize, K: AsRef<[u8]>>(
    claims: &C,
    key: K,
) -> jsonwebtoken::errors::Result<String> {
    let header = Header::default();
    let key = EncodingKey::from_secret(key.as_ref());

    let token = jsonwebtoken::encode(&header, claims, &key)?;
    Ok(token)
}

pub fn process_token<C: DeserializeOwned, K: AsRef<[u8]>>(
    token: &str,
    key: K,
) -> jsonwebtoken::errors::Result<TokenData<C>> {
    let validation = Validation::default();
    let key = DecodingKey::from_secret(key.as_ref());

    let claims = jsonwebtoken::decode::<C>(token, &key, &validation)?;
    Ok(claims)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn session_token_roundtrip() {
        let id = Uuid::new_v4();
        let token = generate_token(&session_claims(id), "secret").unwrap();
        let data = process_token::<UserClaims, _>(&token, "secret").unwrap();
        assert_eq!(data.claims.sub, id.to_string());
    }

    #[test]
    fn wrong_key_is_rejected() {
        let token = generate_token(&session_claims(Uuid::new_v4()), "secret").unwrap();
        assert!(process_token::<UserClaims, _>(&token, "other").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = UserClaims {
            sub: Uuid::new_v4().to_string(),
            exp: (Utc::now() - Duration::hours(2)).timestamp(),
        };
        let token = generate_token(&claims, "secret").unwrap();
        assert!(process_token::<UserClaims, _>(&token, "secret").is_err());
    }
}
