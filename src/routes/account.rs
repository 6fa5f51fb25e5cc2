use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use argon2::{
    password_hash::{PasswordHash, PasswordVerifier},
    Argon2,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::entities::{global_meta, user, user_meta};
use crate::models::{
    AccountAction, AccountResponse, PersonalDataInput, PwdChangeInput, ReferralsResponse,
    StatusMsg, User, UserMeta, WalletFormResponse, WalletInput,
};
use crate::routes::auth::{extract_claims, hash_password, valid_email};
use crate::routes::{db_err, ErrorResponse};
use crate::state::AppState;
use crate::token;
use crate::wallet;

/// global_metas key for a pending wallet-change request.
const WALLET_CHANGE_KEY: &str = "user_wallet_address_change_request";

/// Minutes a password confirmation link stays valid.
const PWD_TOKEN_TTL_MINUTES: i64 = 60;

// ─── Account pages ───

pub async fn get_account(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AccountResponse>, ErrorResponse> {
    let claims = extract_claims(&state.jwt_secret, &headers)?;
    let found = find_user(&state.db, &claims.sub).await?;
    let meta = user_meta::Entity::find_by_id(&found.id)
        .one(&state.db)
        .await
        .map_err(db_err)?
        .unwrap_or_else(|| default_meta(&found.id));

    Ok(Json(AccountResponse { user: found, meta }))
}

pub async fn referrals(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ReferralsResponse>, ErrorResponse> {
    let claims = extract_claims(&state.jwt_secret, &headers)?;
    let found = find_user(&state.db, &claims.sub).await?;

    let referred = user::Entity::find()
        .filter(user::Column::ReferralInfo.eq(&found.referral))
        .all(&state.db)
        .await
        .map_err(db_err)?;

    Ok(Json(ReferralsResponse {
        referral_code: found.referral,
        referred_users: referred.into_iter().map(Into::into).collect(),
    }))
}

/// Data backing the wallet modal.
pub async fn wallet_form(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<WalletFormResponse>, ErrorResponse> {
    let claims = extract_claims(&state.jwt_secret, &headers)?;
    let found = find_user(&state.db, &claims.sub).await?;

    Ok(Json(WalletFormResponse {
        currencies: wallet::SUPPORTED_CURRENCIES
            .iter()
            .map(|c| c.to_string())
            .collect(),
        wallet_type: found.wallet_type,
        wallet_address: found.wallet_address,
    }))
}

// ─── Settings update ───

/// Single entry point for the account page; the body's `action_type` tag
/// picks the branch. Business outcomes always answer 200 with the status
/// envelope so the page can flash it as-is; an unrecognized action gets the
/// same envelope instead of a serde rejection.
pub async fn account_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<StatusMsg>, ErrorResponse> {
    let claims = extract_claims(&state.jwt_secret, &headers)?;

    let Ok(action) = serde_json::from_value::<AccountAction>(body) else {
        return Ok(Json(StatusMsg::info("Nothing to do!")));
    };

    let ret = match action {
        AccountAction::PersonalData(input) => {
            update_personal_data(&state.db, &claims.sub, input).await?
        }
        AccountAction::Wallet(input) => update_wallet(&state.db, &claims.sub, input).await?,
        AccountAction::WalletRequest(input) => {
            request_wallet_change(&state.db, &claims.sub, input).await?
        }
        AccountAction::Notification(input) => {
            let flags = MetaFlags {
                notify_admin: Some(input.notify_admin as i32),
                newsletter: Some(input.newsletter as i32),
                unusual: Some(input.unusual as i32),
                ..MetaFlags::default()
            };
            save_meta_flags(&state.db, &claims.sub, flags)
                .await
                .map_err(db_err)?;
            StatusMsg::success("Notification settings successfully updated.")
        }
        AccountAction::Security(input) => {
            let flags = MetaFlags {
                save_activity: Some(input.save_activity as i32),
                pwd_chng: Some(input.mail_pwd as i32),
                ..MetaFlags::default()
            };
            save_meta_flags(&state.db, &claims.sub, flags)
                .await
                .map_err(db_err)?;
            StatusMsg::success("Security settings successfully updated.")
        }
        AccountAction::AccountSetting(input) => {
            let flags = MetaFlags {
                notify_admin: Some(input.notify_admin as i32),
                newsletter: Some(input.newsletter as i32),
                unusual: Some(input.unusual as i32),
                save_activity: Some(input.save_activity as i32),
                // the combined form always re-enables the password mail
                pwd_chng: Some(1),
            };
            save_meta_flags(&state.db, &claims.sub, flags)
                .await
                .map_err(db_err)?;
            StatusMsg::success("Account settings successfully updated.")
        }
        AccountAction::PwdChange(input) => change_password(&state, &claims.sub, input).await?,
    };

    Ok(Json(ret))
}

async fn update_personal_data(
    db: &DatabaseConnection,
    user_id: &str,
    input: PersonalDataInput,
) -> Result<StatusMsg, ErrorResponse> {
    if let Err(msg) = validate_personal(&input) {
        return Ok(msg);
    }

    let found = find_user(db, user_id).await?;
    let mut active: user::ActiveModel = found.into();
    active.name = Set(input.name.trim().to_string());
    active.email = Set(input.email.trim().to_lowercase());
    active.mobile = Set(input.mobile.filter(|m| !m.is_empty()));
    active.date_of_birth = Set(Some(input.date_of_birth));
    active.nationality = Set(input.nationality.filter(|n| !n.is_empty()));
    active.update(db).await.map_err(db_err)?;

    Ok(StatusMsg::success("Account successfully updated."))
}

async fn update_wallet(
    db: &DatabaseConnection,
    user_id: &str,
    input: WalletInput,
) -> Result<StatusMsg, ErrorResponse> {
    if let Err(msg) = validate_wallet(&input) {
        return Ok(msg);
    }

    let found = find_user(db, user_id).await?;
    let mut active: user::ActiveModel = found.into();
    active.wallet_type = Set(Some(input.wallet_name.to_lowercase()));
    active.wallet_address = Set(Some(input.wallet_address.trim().to_string()));
    active.update(db).await.map_err(db_err)?;

    Ok(StatusMsg::success("Wallet successfully updated."))
}

/// Record the request under global_metas instead of touching the user row;
/// an admin applies it later.
async fn request_wallet_change(
    db: &DatabaseConnection,
    user_id: &str,
    input: WalletInput,
) -> Result<StatusMsg, ErrorResponse> {
    if let Err(msg) = validate_wallet(&input) {
        return Ok(msg);
    }

    let value = serde_json::json!({
        "name": input.wallet_name.to_lowercase(),
        "address": input.wallet_address.trim(),
    })
    .to_string();

    let saved = save_global_meta(db, WALLET_CHANGE_KEY, &value, user_id).await;
    match saved {
        Ok(()) => Ok(StatusMsg::success(
            "Your wallet change request has been received.",
        )),
        Err(e) => {
            tracing::warn!("Could not save wallet change request: {e}");
            Ok(StatusMsg::danger(
                "Could not save your wallet change request.",
            ))
        }
    }
}

async fn change_password(
    state: &AppState,
    user_id: &str,
    input: PwdChangeInput,
) -> Result<StatusMsg, ErrorResponse> {
    if let Err(msg) = validate_pwd_change(&input) {
        return Ok(msg);
    }

    let found = find_user(&state.db, user_id).await?;

    let old_matches = PasswordHash::new(&found.password_hash)
        .map(|h| {
            Argon2::default()
                .verify_password(input.old_password.as_bytes(), &h)
                .is_ok()
        })
        .unwrap_or(false);
    if !old_matches {
        return Ok(StatusMsg::warning("Your old password does not match."));
    }

    // The new password only goes live once the emailed token is redeemed.
    let pending_hash = hash_password(&input.new_password)?;
    let email_token = token::generate_email_token();
    let expire = token::expiry_string(PWD_TOKEN_TTL_MINUTES);

    match user_meta::Entity::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(db_err)?
    {
        Some(meta) => {
            let mut active: user_meta::ActiveModel = meta.into();
            active.pwd_temp = Set(Some(pending_hash));
            active.email_token = Set(Some(email_token.clone()));
            active.email_expire = Set(Some(expire));
            active.update(&state.db).await.map_err(db_err)?;
        }
        None => {
            user_meta::ActiveModel {
                user_id: Set(user_id.to_string()),
                notify_admin: Set(0),
                newsletter: Set(0),
                unusual: Set(0),
                save_activity: Set(1),
                pwd_chng: Set(1),
                pwd_temp: Set(Some(pending_hash)),
                email_token: Set(Some(email_token.clone())),
                email_expire: Set(Some(expire)),
            }
            .insert(&state.db)
            .await
            .map_err(db_err)?;
        }
    }

    let outcome = state
        .notifier
        .password_change(&found.id, &found.email, &email_token)
        .await;
    if outcome.is_delivered() {
        Ok(StatusMsg::success(
            "A confirmation link has been sent to your email address.",
        ))
    } else {
        Ok(StatusMsg::warning(format!(
            "We could not send the confirmation email. Please contact {}.",
            state.site_email
        )))
    }
}

// ─── Password-token confirmation ───

pub async fn password_confirm(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(token_param): Path<String>,
) -> Result<Json<StatusMsg>, ErrorResponse> {
    let claims = extract_claims(&state.jwt_secret, &headers)?;
    let found = find_user(&state.db, &claims.sub).await?;

    let Some(meta) = user_meta::Entity::find_by_id(&found.id)
        .one(&state.db)
        .await
        .map_err(db_err)?
    else {
        return Ok(Json(StatusMsg::danger(
            "Invalid password confirmation token.",
        )));
    };

    let token_matches = meta
        .email_token
        .as_deref()
        .map(|stored| {
            stored
                .as_bytes()
                .ct_eq(token_param.as_bytes())
                .unwrap_u8()
                == 1
        })
        .unwrap_or(false);
    if !token_matches {
        return Ok(Json(StatusMsg::danger(
            "Invalid password confirmation token.",
        )));
    }

    let unexpired = meta
        .email_expire
        .as_deref()
        .map(token::not_expired)
        .unwrap_or(false);

    let ret = if !unexpired {
        StatusMsg::danger("The password confirmation link has expired.")
    } else if let Some(pending) = meta.pwd_temp.clone() {
        let mut active: user::ActiveModel = found.into();
        active.password_hash = Set(pending);
        active.update(&state.db).await.map_err(db_err)?;
        StatusMsg::success("Your password has been changed successfully.")
    } else {
        StatusMsg::danger("Something went wrong.")
    };

    // Consumed or expired, the pending state goes away in one shot.
    let mut active: user_meta::ActiveModel = meta.into();
    active.pwd_temp = Set(None);
    active.email_token = Set(None);
    active.email_expire = Set(None);
    active.update(&state.db).await.map_err(db_err)?;

    Ok(Json(ret))
}

// ─── Validation ───

fn validate_personal(input: &PersonalDataInput) -> Result<(), StatusMsg> {
    if input.name.trim().len() < 4 {
        return Err(StatusMsg::warning(
            "The name must be at least 4 characters.",
        ));
    }
    if !valid_email(input.email.trim()) {
        return Err(StatusMsg::warning(
            "The email must be a valid email address.",
        ));
    }
    if chrono::NaiveDate::parse_from_str(&input.date_of_birth, "%m/%d/%Y").is_err() {
        return Err(StatusMsg::warning(
            "The date of birth does not match the format m/d/Y.",
        ));
    }
    Ok(())
}

fn validate_wallet(input: &WalletInput) -> Result<(), StatusMsg> {
    if input.wallet_name.trim().is_empty() {
        return Err(StatusMsg::warning("The wallet name field is required."));
    }
    if input.wallet_address.trim().len() < 10 {
        return Err(StatusMsg::warning(
            "The wallet address must be at least 10 characters.",
        ));
    }
    if !wallet::validate_address(&input.wallet_address, &input.wallet_name) {
        return Err(StatusMsg::warning(
            "Invalid wallet address for the selected currency.",
        ));
    }
    Ok(())
}

fn validate_pwd_change(input: &PwdChangeInput) -> Result<(), StatusMsg> {
    if input.old_password.len() < 6 {
        return Err(StatusMsg::warning(
            "The old password must be at least 6 characters.",
        ));
    }
    if input.new_password.len() < 6 {
        return Err(StatusMsg::warning(
            "The new password must be at least 6 characters.",
        ));
    }
    if input.re_password != input.new_password {
        return Err(StatusMsg::warning(
            "The re-entered password does not match the new password.",
        ));
    }
    Ok(())
}

// ─── Persistence helpers ───

async fn find_user(db: &DatabaseConnection, user_id: &str) -> Result<User, ErrorResponse> {
    user::Entity::find_by_id(user_id)
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(something_wrong)
}

fn something_wrong() -> ErrorResponse {
    (
        StatusCode::NOT_FOUND,
        Json(StatusMsg::danger("Something went wrong.")),
    )
}

fn default_meta(user_id: &str) -> UserMeta {
    UserMeta {
        user_id: user_id.to_string(),
        notify_admin: 0,
        newsletter: 0,
        unusual: 0,
        save_activity: 1,
        pwd_chng: 1,
        pwd_temp: None,
        email_token: None,
        email_expire: None,
    }
}

/// Flags to write; `None` leaves the stored value alone (insert defaults
/// apply when no row exists yet).
#[derive(Debug, Default)]
struct MetaFlags {
    notify_admin: Option<i32>,
    newsletter: Option<i32>,
    unusual: Option<i32>,
    save_activity: Option<i32>,
    pwd_chng: Option<i32>,
}

async fn save_meta_flags(
    db: &DatabaseConnection,
    user_id: &str,
    flags: MetaFlags,
) -> Result<(), DbErr> {
    match user_meta::Entity::find_by_id(user_id).one(db).await? {
        Some(existing) => {
            let mut active: user_meta::ActiveModel = existing.into();
            if let Some(v) = flags.notify_admin {
                active.notify_admin = Set(v);
            }
            if let Some(v) = flags.newsletter {
                active.newsletter = Set(v);
            }
            if let Some(v) = flags.unusual {
                active.unusual = Set(v);
            }
            if let Some(v) = flags.save_activity {
                active.save_activity = Set(v);
            }
            if let Some(v) = flags.pwd_chng {
                active.pwd_chng = Set(v);
            }
            active.update(db).await?;
        }
        None => {
            user_meta::ActiveModel {
                user_id: Set(user_id.to_string()),
                notify_admin: Set(flags.notify_admin.unwrap_or(0)),
                newsletter: Set(flags.newsletter.unwrap_or(0)),
                unusual: Set(flags.unusual.unwrap_or(0)),
                save_activity: Set(flags.save_activity.unwrap_or(1)),
                pwd_chng: Set(flags.pwd_chng.unwrap_or(1)),
                pwd_temp: Set(None),
                email_token: Set(None),
                email_expire: Set(None),
            }
            .insert(db)
            .await?;
        }
    }
    Ok(())
}

/// Upsert one (meta_key, user_id) row.
async fn save_global_meta(
    db: &DatabaseConnection,
    key: &str,
    value: &str,
    user_id: &str,
) -> Result<(), DbErr> {
    let existing = global_meta::Entity::find()
        .filter(global_meta::Column::MetaKey.eq(key))
        .filter(global_meta::Column::UserId.eq(user_id))
        .one(db)
        .await?;

    match existing {
        Some(row) => {
            let mut active: global_meta::ActiveModel = row.into();
            active.meta_value = Set(value.to_string());
            active.update(db).await?;
        }
        None => {
            global_meta::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                meta_key: Set(key.to_string()),
                meta_value: Set(value.to_string()),
                user_id: Set(user_id.to_string()),
                created_at: Set(token::now_string()),
            }
            .insert(db)
            .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn personal(name: &str, email: &str, dob: &str) -> PersonalDataInput {
        PersonalDataInput {
            name: name.into(),
            email: email.into(),
            mobile: None,
            date_of_birth: dob.into(),
            nationality: None,
        }
    }

    #[test]
    fn personal_data_first_error_wins() {
        let err = validate_personal(&personal("Jo", "bad-email", "x")).unwrap_err();
        assert_eq!(err.msg, "warning");
        assert!(err.message.contains("name"));

        let err = validate_personal(&personal("Jane Doe", "bad-email", "x")).unwrap_err();
        assert!(err.message.contains("email"));

        let err = validate_personal(&personal("Jane Doe", "jane@example.com", "1990-12-04"))
            .unwrap_err();
        assert!(err.message.contains("date of birth"));

        assert!(validate_personal(&personal("Jane Doe", "jane@example.com", "12/04/1990")).is_ok());
    }

    #[test]
    fn wallet_rejects_bad_address() {
        let input = WalletInput {
            wallet_name: "eth".into(),
            wallet_address: "0xnot-a-real-address".into(),
        };
        let err = validate_wallet(&input).unwrap_err();
        assert_eq!(err.msg, "warning");
        assert!(err.message.contains("Invalid wallet address"));

        let input = WalletInput {
            wallet_name: "eth".into(),
            wallet_address: "0x52908400098527886E0F7030069857D2E4169EE7".into(),
        };
        assert!(validate_wallet(&input).is_ok());
    }

    #[test]
    fn wallet_requires_fields_in_order() {
        let err = validate_wallet(&WalletInput {
            wallet_name: "".into(),
            wallet_address: "".into(),
        })
        .unwrap_err();
        assert!(err.message.contains("wallet name"));

        let err = validate_wallet(&WalletInput {
            wallet_name: "btc".into(),
            wallet_address: "short".into(),
        })
        .unwrap_err();
        assert!(err.message.contains("at least 10"));
    }

    #[test]
    fn pwd_change_validation() {
        let err = validate_pwd_change(&PwdChangeInput {
            old_password: "12345".into(),
            new_password: "abcdef".into(),
            re_password: "abcdef".into(),
        })
        .unwrap_err();
        assert!(err.message.contains("old password"));

        let err = validate_pwd_change(&PwdChangeInput {
            old_password: "123456".into(),
            new_password: "abcdef".into(),
            re_password: "abcdeg".into(),
        })
        .unwrap_err();
        assert!(err.message.contains("does not match"));

        assert!(validate_pwd_change(&PwdChangeInput {
            old_password: "123456".into(),
            new_password: "abcdef".into(),
            re_password: "abcdef".into(),
        })
        .is_ok());
    }

    // ─── Handler tests against an in-memory database ───

    use crate::db::test_db;
    use crate::notify::Notifier;
    use crate::routes::auth::create_jwt;

    async fn seed_state() -> (AppState, user::Model) {
        let db = test_db().await;
        let state = AppState::new(
            db,
            "secret".into(),
            "localhost".into(),
            "support@localhost".into(),
            Notifier::new(None),
        );

        let created = user::ActiveModel {
            id: Set("u1".into()),
            name: Set("Jane Doe".into()),
            email: Set("jane@example.com".into()),
            password_hash: Set(hash_password("oldpass1").unwrap()),
            role: Set("user".into()),
            status: Set("active".into()),
            mobile: Set(None),
            date_of_birth: Set(None),
            nationality: Set(None),
            wallet_type: Set(None),
            wallet_address: Set(None),
            referral: Set("abcd1234".into()),
            referral_info: Set(None),
            last_login: Set(None),
            created_at: Set(token::now_string()),
        }
        .insert(&state.db)
        .await
        .unwrap();

        save_meta_flags(&state.db, &created.id, MetaFlags::default())
            .await
            .unwrap();

        (state, created)
    }

    fn auth_headers(state: &AppState, u: &user::Model) -> HeaderMap {
        let jwt = create_jwt(&state.jwt_secret, u).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("authorization", format!("Bearer {jwt}").parse().unwrap());
        headers
    }

    fn verifies(hash: &str, password: &str) -> bool {
        PasswordHash::new(hash)
            .map(|h| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &h)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    async fn stored_user(state: &AppState, id: &str) -> user::Model {
        user::Entity::find_by_id(id)
            .one(&state.db)
            .await
            .unwrap()
            .unwrap()
    }

    async fn stored_meta(state: &AppState, id: &str) -> user_meta::Model {
        user_meta::Entity::find_by_id(id)
            .one(&state.db)
            .await
            .unwrap()
            .unwrap()
    }

    fn pwd_input() -> PwdChangeInput {
        PwdChangeInput {
            old_password: "oldpass1".into(),
            new_password: "newpass99".into(),
            re_password: "newpass99".into(),
        }
    }

    #[tokio::test]
    async fn password_stays_pending_until_token_confirmed() {
        let (state, u) = seed_state().await;

        let ret = change_password(&state, &u.id, pwd_input()).await.unwrap();
        // no webhook configured, so the user gets the fallback warning
        assert_eq!(ret.msg, "warning");

        // active password untouched, pending trio stored
        assert!(verifies(&stored_user(&state, &u.id).await.password_hash, "oldpass1"));
        let meta = stored_meta(&state, &u.id).await;
        assert!(meta.pwd_temp.is_some());
        assert!(meta.email_expire.is_some());
        let email_token = meta.email_token.clone().unwrap();

        let ret = password_confirm(
            State(state.clone()),
            auth_headers(&state, &u),
            Path(email_token),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(ret.msg, "success");

        assert!(verifies(&stored_user(&state, &u.id).await.password_hash, "newpass99"));
        let meta = stored_meta(&state, &u.id).await;
        assert!(meta.pwd_temp.is_none());
        assert!(meta.email_token.is_none());
        assert!(meta.email_expire.is_none());
    }

    #[tokio::test]
    async fn expired_token_clears_pending_state_without_promoting() {
        let (state, u) = seed_state().await;
        change_password(&state, &u.id, pwd_input()).await.unwrap();

        let meta = stored_meta(&state, &u.id).await;
        let email_token = meta.email_token.clone().unwrap();
        let mut active: user_meta::ActiveModel = meta.into();
        active.email_expire = Set(Some("2000-01-01 00:00:00".into()));
        active.update(&state.db).await.unwrap();

        let ret = password_confirm(
            State(state.clone()),
            auth_headers(&state, &u),
            Path(email_token),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(ret.msg, "danger");
        assert!(ret.message.contains("expired"));

        assert!(verifies(&stored_user(&state, &u.id).await.password_hash, "oldpass1"));
        let meta = stored_meta(&state, &u.id).await;
        assert!(meta.pwd_temp.is_none());
        assert!(meta.email_token.is_none());
        assert!(meta.email_expire.is_none());
    }

    #[tokio::test]
    async fn wrong_token_leaves_pending_state_in_place() {
        let (state, u) = seed_state().await;
        change_password(&state, &u.id, pwd_input()).await.unwrap();

        let ret = password_confirm(
            State(state.clone()),
            auth_headers(&state, &u),
            Path("not-the-token".into()),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(ret.msg, "danger");

        // neither consumed nor expired, so the request stays redeemable
        assert!(verifies(&stored_user(&state, &u.id).await.password_hash, "oldpass1"));
        let meta = stored_meta(&state, &u.id).await;
        assert!(meta.pwd_temp.is_some());
        assert!(meta.email_token.is_some());
    }

    #[tokio::test]
    async fn matched_token_without_pending_hash_still_clears() {
        let (state, u) = seed_state().await;

        let meta = stored_meta(&state, &u.id).await;
        let mut active: user_meta::ActiveModel = meta.into();
        active.email_token = Set(Some("tok123".into()));
        active.email_expire = Set(Some(token::expiry_string(60)));
        active.update(&state.db).await.unwrap();

        let ret = password_confirm(
            State(state.clone()),
            auth_headers(&state, &u),
            Path("tok123".into()),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(ret.msg, "danger");

        let meta = stored_meta(&state, &u.id).await;
        assert!(meta.email_token.is_none());
        assert!(meta.email_expire.is_none());
    }

    #[tokio::test]
    async fn unknown_action_type_answers_nothing_to_do() {
        let (state, u) = seed_state().await;

        let ret = account_update(
            State(state.clone()),
            auth_headers(&state, &u),
            Json(serde_json::json!({ "action_type": "bogus" })),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(ret.msg, "info");
        assert_eq!(ret.message, "Nothing to do!");
    }

    #[tokio::test]
    async fn short_name_is_rejected_without_persisting() {
        let (state, u) = seed_state().await;

        let ret = account_update(
            State(state.clone()),
            auth_headers(&state, &u),
            Json(serde_json::json!({
                "action_type": "personal_data",
                "name": "Jo",
                "email": "jo@example.com",
                "date_of_birth": "04/12/1990",
            })),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(ret.msg, "warning");

        let stored = stored_user(&state, &u.id).await;
        assert_eq!(stored.name, "Jane Doe");
        assert_eq!(stored.email, "jane@example.com");
    }
}
