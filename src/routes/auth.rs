use std::net::SocketAddr;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::Agent;
use crate::entities::{activity, user, user_meta};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, StatusMsg, UserInfo};
use crate::routes::{db_err, validation_err, ErrorResponse};
use crate::state::AppState;
use crate::token;

// ─── JWT Claims ───

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user_id
    pub name: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

// ─── Routes ───

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ErrorResponse> {
    let name = req.name.trim().to_string();
    let email = req.email.trim().to_lowercase();
    let password = req.password;

    if name.len() < 4 {
        return Err(validation_err("The name must be at least 4 characters."));
    }
    if !valid_email(&email) {
        return Err(validation_err("The email must be a valid email address."));
    }
    if password.len() < 6 {
        return Err(validation_err("The password must be at least 6 characters."));
    }

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await
        .map_err(db_err)?;
    if existing.is_some() {
        return Err((
            StatusCode::CONFLICT,
            Json(StatusMsg::warning("The email has already been taken.")),
        ));
    }

    let password_hash = hash_password(&password)?;

    // First account on a fresh install becomes the admin
    let user_count = user::Entity::find().count(&state.db).await.map_err(db_err)?;
    let role = if user_count == 0 { "admin" } else { "user" };

    let user_id = Uuid::new_v4().to_string();
    let now = token::now_string();

    let created = user::ActiveModel {
        id: Set(user_id.clone()),
        name: Set(name),
        email: Set(email),
        password_hash: Set(password_hash),
        role: Set(role.to_string()),
        status: Set("active".to_string()),
        mobile: Set(None),
        date_of_birth: Set(None),
        nationality: Set(None),
        wallet_type: Set(None),
        wallet_address: Set(None),
        referral: Set(token::generate_referral_code()),
        referral_info: Set(req.referral.filter(|r| !r.is_empty())),
        last_login: Set(None),
        created_at: Set(now),
    }
    .insert(&state.db)
    .await
    .map_err(db_err)?;

    user_meta::ActiveModel {
        user_id: Set(user_id),
        notify_admin: Set(0),
        newsletter: Set(0),
        unusual: Set(0),
        save_activity: Set(1),
        pwd_chng: Set(1),
        pwd_temp: Set(None),
        email_token: Set(None),
        email_expire: Set(None),
    }
    .insert(&state.db)
    .await
    .map_err(db_err)?;

    let jwt = create_jwt(&state.jwt_secret, &created)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: jwt,
            user: created.into(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ErrorResponse> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(validation_err("The email field is required."));
    }
    if !valid_email(&email) {
        return Err(validation_err("The email must be a valid email address."));
    }
    if req.password.is_empty() {
        return Err(validation_err("The password field is required."));
    }

    let ip = client_ip(&headers, addr);
    let throttle_key = format!("{email}|{ip}");

    if state.login_throttle.too_many_attempts(&throttle_key) {
        let known_user = user::Entity::find()
            .filter(user::Column::Email.eq(&email))
            .one(&state.db)
            .await
            .map_err(db_err)?;

        // Warn the account owner on the first lockout only. The delivery
        // outcome never blocks the lockout response.
        if let Some(known) = &known_user {
            if state.login_throttle.attempts(&throttle_key) < 4 {
                let meta = user_meta::Entity::find_by_id(&known.id)
                    .one(&state.db)
                    .await
                    .map_err(db_err)?;
                if meta.map(|m| m.unusual == 1).unwrap_or(false) {
                    let outcome = state.notifier.unusual_login(&known.id, &known.email).await;
                    tracing::info!("Unusual login alert for {}: {:?}", known.email, outcome);
                    state.login_throttle.hit(&throttle_key);
                }
            }
        }

        let wait = lockout_wait(state.login_throttle.available_in(&throttle_key));
        return Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(StatusMsg::danger(format!(
                "Too many login attempts. Please try again in {wait}"
            ))),
        ));
    }

    let failed = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(StatusMsg::danger(
                "These credentials do not match our records.",
            )),
        )
    };

    let Some(found) = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await
        .map_err(db_err)?
    else {
        state.login_throttle.hit(&throttle_key);
        return Err(failed());
    };

    let parsed_hash = PasswordHash::new(&found.password_hash).map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StatusMsg::danger("Hash parse error")),
        )
    })?;
    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        state.login_throttle.hit(&throttle_key);
        return Err(failed());
    }

    if found.status != "active" {
        return Err((
            StatusCode::FORBIDDEN,
            Json(StatusMsg::danger(
                "Your account is inactive. Please contact support.",
            )),
        ));
    }

    state.login_throttle.clear(&throttle_key);

    let now = token::now_string();
    let mut active: user::ActiveModel = found.clone().into();
    active.last_login = Set(Some(now.clone()));
    let logged_in = active.update(&state.db).await.map_err(db_err)?;

    let meta = user_meta::Entity::find_by_id(&logged_in.id)
        .one(&state.db)
        .await
        .map_err(db_err)?;
    if meta.map(|m| m.save_activity == 1).unwrap_or(false) {
        let ua = headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let agent = Agent::parse(ua);
        activity::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(logged_in.id.clone()),
            browser: Set(agent.browser_label()),
            device: Set(agent.device_label()),
            ip: Set(ip),
            created_at: Set(now),
        }
        .insert(&state.db)
        .await
        .ok();
    }

    let jwt = create_jwt(&state.jwt_secret, &logged_in)?;
    Ok(Json(AuthResponse {
        token: jwt,
        user: logged_in.into(),
    }))
}

/// Tokens are stateless; the client just discards its copy.
pub async fn logout() -> Json<StatusMsg> {
    Json(StatusMsg::success("You have been logged out."))
}

/// Landing payload after a verification link is followed.
pub async fn verified() -> Json<StatusMsg> {
    Json(StatusMsg::success(
        "Your email address has been verified. You can now sign in.",
    ))
}

/// Landing payload after a completed registration.
pub async fn registered() -> Json<StatusMsg> {
    Json(StatusMsg::success(
        "Your account has been created. Please check your email to verify it.",
    ))
}

pub async fn get_me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserInfo>, ErrorResponse> {
    let claims = extract_claims(&state.jwt_secret, &headers)?;

    let found = user::Entity::find_by_id(&claims.sub)
        .one(&state.db)
        .await
        .map_err(db_err)?
        .ok_or((
            StatusCode::NOT_FOUND,
            Json(StatusMsg::danger("User not found")),
        ))?;

    Ok(Json(found.into()))
}

// ─── Helpers ───

pub fn hash_password(password: &str) -> Result<String, ErrorResponse> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusMsg::danger(format!("Hash error: {e}"))),
            )
        })
}

pub fn valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

/// Prefer the first X-Forwarded-For hop, fall back to the socket peer.
pub fn client_ip(headers: &HeaderMap, addr: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| addr.ip().to_string())
}

/// Human wait time for the lockout message.
pub fn lockout_wait(seconds: u64) -> String {
    if seconds >= 60 {
        format!("{} minutes.", seconds / 60)
    } else {
        format!("{} seconds.", seconds)
    }
}

// ─── JWT helpers ───

pub fn create_jwt(secret: &str, u: &user::Model) -> Result<String, ErrorResponse> {
    let expiration = (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize;

    let claims = Claims {
        sub: u.id.clone(),
        name: u.name.clone(),
        email: u.email.clone(),
        role: u.role.clone(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StatusMsg::danger(format!("JWT error: {e}"))),
        )
    })
}

pub fn extract_claims(secret: &str, headers: &HeaderMap) -> Result<Claims, ErrorResponse> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or((
            StatusCode::UNAUTHORIZED,
            Json(StatusMsg::danger("Missing Authorization header")),
        ))?;

    let token = auth.strip_prefix("Bearer ").ok_or((
        StatusCode::UNAUTHORIZED,
        Json(StatusMsg::danger("Invalid Authorization format")),
    ))?;

    decode_jwt(secret, token)
}

pub fn decode_jwt(secret: &str, token: &str) -> Result<Claims, ErrorResponse> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        (
            StatusCode::UNAUTHORIZED,
            Json(StatusMsg::danger(format!("Invalid token: {e}"))),
        )
    })?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lockout_wait_formats_minutes_and_seconds() {
        assert_eq!(lockout_wait(600), "10 minutes.");
        assert_eq!(lockout_wait(60), "1 minutes.");
        assert_eq!(lockout_wait(59), "59 seconds.");
        assert_eq!(lockout_wait(0), "0 seconds.");
    }

    #[test]
    fn email_validation() {
        assert!(valid_email("user@example.com"));
        assert!(valid_email("first.last@sub.example.co"));
        assert!(!valid_email("userexample.com"));
        assert!(!valid_email("user@nodomain"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email("user@.com"));
        assert!(!valid_email("user name@example.com"));
    }

    #[test]
    fn forwarded_header_wins_over_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());
        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        assert_eq!(client_ip(&headers, addr), "203.0.113.9");
        assert_eq!(client_ip(&HeaderMap::new(), addr), "127.0.0.1");
    }

    #[test]
    fn jwt_round_trip() {
        let u = user::Model {
            id: "u1".into(),
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            password_hash: "x".into(),
            role: "user".into(),
            status: "active".into(),
            mobile: None,
            date_of_birth: None,
            nationality: None,
            wallet_type: None,
            wallet_address: None,
            referral: "abcd1234".into(),
            referral_info: None,
            last_login: None,
            created_at: "2026-01-01 00:00:00".into(),
        };
        let token = create_jwt("secret", &u).unwrap();
        let claims = decode_jwt("secret", &token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "jane@example.com");
        assert!(decode_jwt("other-secret", &token).is_err());
    }
}
