//! Accounts API endpoints

use api_types::account::{AccountNew, AccountUpdate, AccountView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{Account, CreateAccountCmd, UpdateAccountCmd};
use uuid::Uuid;

use crate::{
    CurrentUser, ServerError,
    server::ServerState,
    transactions::{amount, money},
};

fn view(account: Account) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name,
        balance: amount(account.balance),
        color: account.color,
        icon: account.icon,
    }
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<AccountNew>, ServerError>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let mut cmd = CreateAccountCmd::new(user.id, payload.name, payload.color, payload.icon);
    if let Some(balance) = payload.balance {
        cmd = cmd.opening_balance(money(balance));
    }

    let account = state.engine.create_account(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(account))))
}

pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<AccountView>>, ServerError> {
    let accounts = state.engine.accounts(&user.id).await?;
    Ok(Json(accounts.into_iter().map(view).collect()))
}

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.account(&user.id, id).await?;
    Ok(Json(view(account)))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<AccountUpdate>, ServerError>,
) -> Result<Json<AccountView>, ServerError> {
    let cmd = UpdateAccountCmd {
        name: payload.name,
        balance: payload.balance.map(money),
        color: payload.color,
        icon: payload.icon,
    };
    let account = state.engine.update_account(&user.id, id, cmd).await?;
    Ok(Json(view(account)))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_account(&user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
