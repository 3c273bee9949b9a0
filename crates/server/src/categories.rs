//! Categories API endpoints

use api_types::category::{CategoryNew, CategoryUpdate, CategoryView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{Category, CreateCategoryCmd, UpdateCategoryCmd};
use uuid::Uuid;

use crate::{
    CurrentUser, ServerError,
    server::ServerState,
    transactions::{kind_from_api, kind_to_api},
};

fn view(category: Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        color: category.color,
        icon: category.icon,
        kind: kind_to_api(category.kind),
        created_at: category.created_at,
    }
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<CategoryNew>, ServerError>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let mut cmd = CreateCategoryCmd::new(user.id, payload.name, kind_from_api(payload.kind));
    cmd.color = payload.color;
    cmd.icon = payload.icon;

    let category = state.engine.create_category(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(category))))
}

pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state.engine.categories(&user.id).await?;
    Ok(Json(categories.into_iter().map(view).collect()))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<CategoryUpdate>, ServerError>,
) -> Result<Json<CategoryView>, ServerError> {
    let cmd = UpdateCategoryCmd {
        name: payload.name,
        kind: payload.kind.map(kind_from_api),
        color: payload.color,
        icon: payload.icon,
    };
    let category = state.engine.update_category(&user.id, id, cmd).await?;
    Ok(Json(view(category)))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(&user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
