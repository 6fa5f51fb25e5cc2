pub mod activity;
pub mod global_meta;
pub mod user;
pub mod user_meta;
