//! Transaction primitives.
//!
//! A `Transaction` is an income or an expense recorded against exactly one
//! account. Its signed amount is the contribution it makes to that account's
//! balance.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, MoneyCents};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "INCOME" => Ok(Self::Income),
            "EXPENSE" => Ok(Self::Expense),
            other => Err(EngineError::InvalidReference(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub account_id: Uuid,
    /// Always positive; `kind` decides the sign.
    pub amount: MoneyCents,
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
    pub description: String,
    pub comments: Option<String>,
    pub category_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub account_id: Uuid,
    pub amount: i64,
    pub kind: String,
    pub date: DateTimeUtc,
    pub description: String,
    pub comments: Option<String>,
    pub category_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Account,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(has_many = "super::transaction_tags::Entity")]
    TransactionTags,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::transaction_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionTags.def()
    }
}

impl Related<super::tags::Entity> for Entity {
    fn to() -> RelationDef {
        super::transaction_tags::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::transaction_tags::Relation::Transaction.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Transaction {
    /// Builds the domain value from a row plus its tag links.
    pub(crate) fn from_model(model: Model, tag_ids: Vec<Uuid>) -> Result<Self, EngineError> {
        Ok(Self {
            id: model.id,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            user_id: model.user_id,
            account_id: model.account_id,
            amount: MoneyCents::new(model.amount),
            date: model.date,
            description: model.description,
            comments: model.comments,
            category_id: model.category_id,
            tag_ids,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
