use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
    sea_query::{Alias, Expr, Func, SimpleExpr},
};
use uuid::Uuid;

use crate::{
    Account, Category, EngineError, MoneyCents, ResultEngine, Tag, Transaction, TransactionKind,
    accounts, categories, tags, transaction_tags, transactions,
};

use super::super::{Engine, with_tx};
use super::{DashboardSummary, TransactionListFilter, TransactionListItem, TransactionPage};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

fn total_balance(accounts: &[Account]) -> ResultEngine<MoneyCents> {
    accounts
        .iter()
        .try_fold(MoneyCents::ZERO, |acc, account| acc.checked_add(account.balance))
        .ok_or_else(|| EngineError::InvalidAmount("total balance too large".to_string()))
}

fn validate_range(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (from, to)
        && from > to
    {
        return Err(EngineError::InvalidRange(
            "from must not be after to".to_string(),
        ));
    }
    Ok(())
}

fn validate_page(page: u64, limit: u64) -> ResultEngine<()> {
    if page == 0 {
        return Err(EngineError::InvalidRange("page must be >= 1".to_string()));
    }
    if limit == 0 || limit > MAX_LIMIT {
        return Err(EngineError::InvalidRange(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }
    Ok(())
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionListFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, filter: &TransactionListFilter) -> Self {
        if let Some(from) = filter.from {
            self = self.filter(transactions::Column::Date.gte(from));
        }
        if let Some(to) = filter.to {
            self = self.filter(transactions::Column::Date.lte(to));
        }
        if let Some(kind) = filter.kind {
            self = self.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        self
    }
}

impl Engine {
    /// Lists the caller's transactions, newest first.
    ///
    /// Ordering is `(date DESC, id DESC)`, so pages are stable even when
    /// several transactions share a date.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionListFilter,
        page: u64,
        limit: u64,
    ) -> ResultEngine<TransactionPage> {
        validate_range(filter.from, filter.to)?;
        validate_page(page, limit)?;

        with_tx!(self, |db_tx| {
            let base = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .apply_tx_filters(filter);

            let total = base.clone().count(&db_tx).await?;
            let rows = base
                .find_also_related(categories::Entity)
                .order_by_desc(transactions::Column::Date)
                .order_by_desc(transactions::Column::Id)
                .offset((page - 1).saturating_mul(limit))
                .limit(limit)
                .all(&db_tx)
                .await?;

            let transaction_ids: Vec<Uuid> = rows.iter().map(|(tx, _)| tx.id).collect();
            let account_ids: Vec<Uuid> = rows.iter().map(|(tx, _)| tx.account_id).collect();

            let account_names: HashMap<Uuid, String> = accounts::Entity::find()
                .filter(accounts::Column::Id.is_in(account_ids))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|account| (account.id, account.name))
                .collect();

            let mut tags_by_tx: HashMap<Uuid, Vec<Tag>> = HashMap::new();
            let links = transaction_tags::Entity::find()
                .filter(transaction_tags::Column::TransactionId.is_in(transaction_ids))
                .find_also_related(tags::Entity)
                .order_by_asc(tags::Column::Name)
                .all(&db_tx)
                .await?;
            for (link, tag) in links {
                if let Some(tag) = tag {
                    tags_by_tx
                        .entry(link.transaction_id)
                        .or_default()
                        .push(Tag::from(tag));
                }
            }

            let mut items = Vec::with_capacity(rows.len());
            for (model, category) in rows {
                let tags = tags_by_tx.remove(&model.id).unwrap_or_default();
                let tag_ids = tags.iter().map(|tag| tag.id).collect();
                let account_name = account_names
                    .get(&model.account_id)
                    .cloned()
                    .unwrap_or_default();
                items.push(TransactionListItem {
                    transaction: Transaction::from_model(model, tag_ids)?,
                    account_name,
                    category: category.map(Category::try_from).transpose()?,
                    tags,
                });
            }

            Ok(TransactionPage {
                items,
                total,
                page,
                total_pages: total.div_ceil(limit),
            })
        })
    }

    /// Totals for the dashboard: balance across all accounts, plus income and
    /// expense of the transactions dated within `[from, to]`.
    pub async fn dashboard_summary(
        &self,
        user_id: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> ResultEngine<DashboardSummary> {
        validate_range(from, to)?;
        let filter = TransactionListFilter {
            from,
            to,
            kind: None,
        };

        with_tx!(self, |db_tx| {
            let accounts: Vec<Account> = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id))
                .order_by_asc(accounts::Column::Name)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Account::from)
                .collect();

            // Postgres widens SUM(bigint) to numeric, the cast keeps it an i64.
            let totals: Vec<(String, i64)> = transactions::Entity::find()
                .select_only()
                .column(transactions::Column::Kind)
                .column_as(
                    SimpleExpr::from(Func::cast_as(
                        Expr::col(transactions::Column::Amount).sum(),
                        Alias::new("BIGINT"),
                    )),
                    "total",
                )
                .filter(transactions::Column::UserId.eq(user_id))
                .apply_tx_filters(&filter)
                .group_by(transactions::Column::Kind)
                .into_tuple()
                .all(&db_tx)
                .await?;

            let mut total_income = MoneyCents::ZERO;
            let mut total_expense = MoneyCents::ZERO;
            for (kind, total) in totals {
                match TransactionKind::try_from(kind.as_str())? {
                    TransactionKind::Income => total_income = MoneyCents::new(total),
                    TransactionKind::Expense => total_expense = MoneyCents::new(total),
                }
            }

            Ok(DashboardSummary {
                total_balance: total_balance(&accounts)?,
                total_income,
                total_expense,
                accounts,
            })
        })
    }
}
