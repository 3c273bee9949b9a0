use api_types::tag::{TagNew, TagUpdate, TagView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::Tag;
use uuid::Uuid;

use crate::{CurrentUser, ServerError, server::ServerState};

fn view(tag: Tag) -> TagView {
    TagView {
        id: tag.id,
        name: tag.name,
        created_at: tag.created_at,
    }
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<TagNew>, ServerError>,
) -> Result<(StatusCode, Json<TagView>), ServerError> {
    let tag = state.engine.create_tag(&user.id, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(view(tag))))
}

pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<TagView>>, ServerError> {
    let tags = state.engine.tags(&user.id).await?;
    Ok(Json(tags.into_iter().map(view).collect()))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<TagUpdate>, ServerError>,
) -> Result<Json<TagView>, ServerError> {
    let tag = state.engine.rename_tag(&user.id, id, &payload.name).await?;
    Ok(Json(view(tag)))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_tag(&user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
