//! Transactions API endpoints

use api_types::{
    Amount, TransactionType,
    summary::{AccountSummary, DashboardSummary, SummaryQuery},
    transaction::{
        AccountRef, CategoryRef, PageMeta, TagRef, TransactionCreated, TransactionListItem,
        TransactionListResponse, TransactionNew, TransactionQuery, TransactionUpdate,
        TransactionView,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use engine::{
    CreateTransactionCmd, MoneyCents, Transaction, TransactionKind, TransactionListFilter,
    UpdateTransactionCmd,
};
use uuid::Uuid;

use crate::{CurrentUser, ServerError, server::ServerState};

pub(crate) fn kind_from_api(kind: TransactionType) -> TransactionKind {
    match kind {
        TransactionType::Income => TransactionKind::Income,
        TransactionType::Expense => TransactionKind::Expense,
    }
}

pub(crate) fn kind_to_api(kind: TransactionKind) -> TransactionType {
    match kind {
        TransactionKind::Income => TransactionType::Income,
        TransactionKind::Expense => TransactionType::Expense,
    }
}

pub(crate) fn money(amount: Amount) -> MoneyCents {
    MoneyCents::new(amount.cents())
}

pub(crate) fn amount(money: MoneyCents) -> Amount {
    Amount::from_cents(money.cents())
}

fn view(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        user_id: tx.user_id,
        account_id: tx.account_id,
        amount: amount(tx.amount),
        kind: kind_to_api(tx.kind),
        date: tx.date,
        description: tx.description,
        comments: tx.comments,
        category_id: tx.category_id,
        tag_ids: tx.tag_ids,
        created_at: tx.created_at,
        updated_at: tx.updated_at,
    }
}

fn list_item(item: engine::TransactionListItem) -> TransactionListItem {
    let tx = item.transaction;
    TransactionListItem {
        id: tx.id,
        user_id: tx.user_id,
        account_id: tx.account_id,
        amount: amount(tx.amount),
        kind: kind_to_api(tx.kind),
        date: tx.date,
        description: tx.description,
        comments: tx.comments,
        category_id: tx.category_id,
        created_at: tx.created_at,
        updated_at: tx.updated_at,
        category: item.category.map(|c| CategoryRef {
            id: c.id,
            name: c.name,
            color: c.color,
            icon: c.icon,
        }),
        account: AccountRef {
            id: tx.account_id,
            name: item.account_name,
        },
        tags: item
            .tags
            .into_iter()
            .map(|t| TagRef {
                id: t.id,
                name: t.name,
            })
            .collect(),
    }
}

pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<TransactionNew>, ServerError>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let mut cmd = CreateTransactionCmd::new(
        user.id,
        payload.account_id,
        money(payload.amount),
        kind_from_api(payload.kind),
        payload.date.with_timezone(&Utc),
    )
    .description(payload.description)
    .tag_ids(payload.tag_ids);
    if let Some(comments) = payload.comments {
        cmd = cmd.comments(comments);
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }

    let tx = state.engine.create_transaction(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionCreated {
            id: tx.id,
            amount: amount(tx.amount),
            account_id: tx.account_id,
        }),
    ))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<TransactionUpdate>, ServerError>,
) -> Result<Json<TransactionView>, ServerError> {
    let cmd = UpdateTransactionCmd {
        user_id: user.id,
        transaction_id: id,
        amount: payload.amount.map(money),
        kind: payload.kind.map(kind_from_api),
        account_id: payload.account_id,
        category_id: payload.category_id,
        tag_ids: payload.tag_ids,
        description: payload.description,
        comments: payload.comments,
        date: payload.date.map(|date| date.with_timezone(&Utc)),
    };

    let tx = state.engine.update_transaction(cmd).await?;
    Ok(Json(view(tx)))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(&user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<TransactionQuery>, ServerError>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let page = query.page.unwrap_or(engine::DEFAULT_PAGE);
    let limit = query.limit.unwrap_or(engine::DEFAULT_LIMIT);
    let filter = TransactionListFilter {
        from: query.from.map(|dt| dt.with_timezone(&Utc)),
        to: query.to.map(|dt| dt.with_timezone(&Utc)),
        kind: query.kind.map(kind_from_api),
    };

    let result = state
        .engine
        .list_transactions(&user.id, &filter, page, limit)
        .await?;

    Ok(Json(TransactionListResponse {
        data: result.items.into_iter().map(list_item).collect(),
        meta: PageMeta {
            total: result.total,
            page: result.page,
            total_pages: result.total_pages,
        },
    }))
}

pub async fn summary(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<SummaryQuery>, ServerError>,
) -> Result<Json<DashboardSummary>, ServerError> {
    let summary = state
        .engine
        .dashboard_summary(
            &user.id,
            query.from.map(|dt| dt.with_timezone(&Utc)),
            query.to.map(|dt| dt.with_timezone(&Utc)),
        )
        .await?;

    Ok(Json(DashboardSummary {
        total_balance: amount(summary.total_balance),
        total_income: amount(summary.total_income),
        total_expense: amount(summary.total_expense),
        accounts: summary
            .accounts
            .into_iter()
            .map(|a| AccountSummary {
                id: a.id,
                name: a.name,
                balance: amount(a.balance),
                color: a.color,
                icon: a.icon,
            })
            .collect(),
    }))
}
