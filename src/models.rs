use serde::{Deserialize, Serialize};

// ─── Re-export entity models under their domain names ───

pub use crate::entities::activity::Model as Activity;
pub use crate::entities::global_meta::Model as GlobalMeta;
pub use crate::entities::user::Model as User;
pub use crate::entities::user_meta::Model as UserMeta;

// ─── Status envelope ───

/// The `{msg, message}` envelope every mutation answers with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMsg {
    pub msg: String,
    pub message: String,
}

impl StatusMsg {
    pub fn success(message: impl Into<String>) -> Self {
        Self { msg: "success".into(), message: message.into() }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self { msg: "danger".into(), message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { msg: "warning".into(), message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { msg: "info".into(), message: message.into() }
    }
}

// ─── Auth ───

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Referral code of the inviting user, if the signup came from a link.
    pub referral: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize, Clone)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub last_login: Option<String>,
}

impl From<User> for UserInfo {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            status: u.status,
            last_login: u.last_login,
        }
    }
}

// ─── Account settings ───

/// One variant per settings action. The `action_type` discriminator matches
/// the form field the account page submits.
#[derive(Debug, Deserialize)]
#[serde(tag = "action_type", rename_all = "snake_case")]
pub enum AccountAction {
    PersonalData(PersonalDataInput),
    Wallet(WalletInput),
    WalletRequest(WalletInput),
    Notification(NotificationInput),
    Security(SecurityInput),
    AccountSetting(AccountSettingInput),
    PwdChange(PwdChangeInput),
}

#[derive(Debug, Deserialize)]
pub struct PersonalDataInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub mobile: Option<String>,
    #[serde(default)]
    pub date_of_birth: String,
    pub nationality: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WalletInput {
    #[serde(default)]
    pub wallet_name: String,
    #[serde(default)]
    pub wallet_address: String,
}

/// Checkbox-style flags: absent means off.
#[derive(Debug, Deserialize)]
pub struct NotificationInput {
    #[serde(default)]
    pub notify_admin: bool,
    #[serde(default)]
    pub newsletter: bool,
    #[serde(default)]
    pub unusual: bool,
}

#[derive(Debug, Deserialize)]
pub struct SecurityInput {
    #[serde(default)]
    pub save_activity: bool,
    #[serde(default)]
    pub mail_pwd: bool,
}

#[derive(Debug, Deserialize)]
pub struct AccountSettingInput {
    #[serde(default)]
    pub notify_admin: bool,
    #[serde(default)]
    pub newsletter: bool,
    #[serde(default)]
    pub unusual: bool,
    #[serde(default)]
    pub save_activity: bool,
    #[serde(default)]
    pub mail_pwd: bool,
}

#[derive(Debug, Deserialize)]
pub struct PwdChangeInput {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub re_password: String,
}

// ─── Account pages ───

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub user: User,
    pub meta: UserMeta,
}

#[derive(Debug, Serialize)]
pub struct ReferralsResponse {
    pub referral_code: String,
    pub referred_users: Vec<UserInfo>,
}

#[derive(Debug, Serialize)]
pub struct WalletFormResponse {
    pub currencies: Vec<String>,
    pub wallet_type: Option<String>,
    pub wallet_address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityDeleteRequest {
    /// An activity row id, or "all".
    #[serde(default)]
    pub delete_activity: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_type_tag_dispatch() {
        let action: AccountAction = serde_json::from_str(
            r#"{"action_type": "personal_data", "name": "Jane Doe",
                "email": "jane@example.com", "date_of_birth": "04/12/1990"}"#,
        )
        .unwrap();
        assert!(matches!(action, AccountAction::PersonalData(_)));

        let action: AccountAction = serde_json::from_str(
            r#"{"action_type": "wallet_request", "wallet_name": "eth",
                "wallet_address": "0x52908400098527886E0F7030069857D2E4169EE7"}"#,
        )
        .unwrap();
        assert!(matches!(action, AccountAction::WalletRequest(_)));

        let action: AccountAction =
            serde_json::from_str(r#"{"action_type": "pwd_change"}"#).unwrap();
        match action {
            AccountAction::PwdChange(input) => assert!(input.old_password.is_empty()),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn unknown_action_type_is_rejected() {
        let result = serde_json::from_str::<AccountAction>(r#"{"action_type": "nope"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn absent_checkboxes_default_off() {
        let action: AccountAction = serde_json::from_str(
            r#"{"action_type": "notification", "newsletter": true}"#,
        )
        .unwrap();
        match action {
            AccountAction::Notification(input) => {
                assert!(input.newsletter);
                assert!(!input.notify_admin);
                assert!(!input.unusual);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
