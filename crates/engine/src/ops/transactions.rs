use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    Account, Category, Contribution, MoneyCents, ResultEngine, Tag, Transaction, TransactionKind,
    transaction_tags, transactions,
};

use super::Engine;

mod list;
mod write;

pub use list::{DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};

/// Filters for listing transactions.
///
/// `from` and `to` are both inclusive, in UTC.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub kind: Option<TransactionKind>,
}

/// A transaction with the records it references, as shown in listings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionListItem {
    pub transaction: Transaction,
    pub account_name: String,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionPage {
    pub items: Vec<TransactionListItem>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

pub type AccountBalance = Account;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total_balance: MoneyCents,
    pub total_income: MoneyCents,
    pub total_expense: MoneyCents,
    pub accounts: Vec<AccountBalance>,
}

fn contribution_of(model: &transactions::Model) -> ResultEngine<Contribution> {
    Ok(Contribution {
        account_id: model.account_id,
        amount: MoneyCents::new(model.amount),
        kind: TransactionKind::try_from(model.kind.as_str())?,
    })
}

impl Engine {
    async fn link_tags(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_id: Uuid,
        tag_ids: &[Uuid],
    ) -> ResultEngine<()> {
        if tag_ids.is_empty() {
            return Ok(());
        }
        let links = tag_ids.iter().map(|tag_id| transaction_tags::ActiveModel {
            transaction_id: ActiveValue::Set(transaction_id),
            tag_id: ActiveValue::Set(*tag_id),
        });
        transaction_tags::Entity::insert_many(links)
            .exec(db_tx)
            .await?;
        Ok(())
    }

    async fn unlink_tags(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_id: Uuid,
    ) -> ResultEngine<()> {
        transaction_tags::Entity::delete_many()
            .filter(transaction_tags::Column::TransactionId.eq(transaction_id))
            .exec(db_tx)
            .await?;
        Ok(())
    }

    async fn tag_ids_of(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_id: Uuid,
    ) -> ResultEngine<Vec<Uuid>> {
        let links = transaction_tags::Entity::find()
            .filter(transaction_tags::Column::TransactionId.eq(transaction_id))
            .order_by_asc(transaction_tags::Column::TagId)
            .all(db_tx)
            .await?;
        Ok(links.into_iter().map(|link| link.tag_id).collect())
    }
}
