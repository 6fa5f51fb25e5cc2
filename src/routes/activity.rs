use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::activity;
use crate::models::{Activity, ActivityDeleteRequest, StatusMsg};
use crate::routes::auth::extract_claims;
use crate::routes::{db_err, ErrorResponse};
use crate::state::AppState;

/// The caller's login activity, newest first.
pub async fn list_activity(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Activity>>, ErrorResponse> {
    let claims = extract_claims(&state.jwt_secret, &headers)?;

    let rows = activity::Entity::find()
        .filter(activity::Column::UserId.eq(&claims.sub))
        .order_by_desc(activity::Column::CreatedAt)
        .all(&state.db)
        .await
        .map_err(db_err)?;

    Ok(Json(rows))
}

/// Delete one activity row (must belong to the caller) or, with the id
/// "all", every row the caller owns.
pub async fn delete_activity(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ActivityDeleteRequest>,
) -> Result<Json<StatusMsg>, ErrorResponse> {
    let claims = extract_claims(&state.jwt_secret, &headers)?;

    let id = req.delete_activity.trim();
    if id.is_empty() {
        return Ok(Json(StatusMsg::info("Nothing to do!")));
    }

    let delete = activity::Entity::delete_many().filter(activity::Column::UserId.eq(&claims.sub));
    let delete = if id != "all" {
        delete.filter(activity::Column::Id.eq(id))
    } else {
        delete
    };

    let result = delete.exec(&state.db).await.map_err(db_err)?;

    let ret = if result.rows_affected > 0 {
        StatusMsg::success("Activity deleted successfully.")
    } else {
        StatusMsg::danger("Something went wrong.")
    };
    Ok(Json(ret))
}
