use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub mobile: Option<String>,
    pub date_of_birth: Option<String>,
    pub nationality: Option<String>,
    pub wallet_type: Option<String>,
    pub wallet_address: Option<String>,
    /// This user's own referral code.
    pub referral: String,
    /// Referral code of the user who invited this one, if any.
    pub referral_info: Option<String>,
    pub last_login: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
