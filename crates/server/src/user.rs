use api_types::user::{UserSync, UserView};
use axum::{Extension, Json, extract::State};
use axum_extra::extract::WithRejection;

use crate::{CurrentUser, ServerError, server::ServerState};

/// Creates or refreshes the caller's profile from the identity provider data.
pub async fn sync(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<UserSync>, ServerError>,
) -> Result<Json<UserView>, ServerError> {
    let synced = state
        .engine
        .sync_user(&user.id, &payload.email, payload.name.as_deref())
        .await?;

    Ok(Json(UserView {
        id: synced.id,
        email: synced.email,
        name: synced.name,
        created_at: synced.created_at,
    }))
}
