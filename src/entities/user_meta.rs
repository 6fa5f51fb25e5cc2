use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-user preference flags plus the transient password-change state.
/// `pwd_temp`, `email_token` and `email_expire` are always set and cleared
/// together.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_metas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub notify_admin: i32,
    pub newsletter: i32,
    pub unusual: i32,
    pub save_activity: i32,
    pub pwd_chng: i32,
    #[serde(skip_serializing)]
    pub pwd_temp: Option<String>,
    #[serde(skip_serializing)]
    pub email_token: Option<String>,
    #[serde(skip_serializing)]
    pub email_expire: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
