//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{MoneyCents, TransactionKind};

/// Record an income or an expense on one account.
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub user_id: String,
    pub account_id: Uuid,
    pub amount: MoneyCents,
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
    pub description: String,
    pub comments: Option<String>,
    pub category_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        account_id: Uuid,
        amount: MoneyCents,
        kind: TransactionKind,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            account_id,
            amount,
            kind,
            date,
            description: String::new(),
            comments: None,
            category_id: None,
            tag_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn tag_ids(mut self, tag_ids: Vec<Uuid>) -> Self {
        self.tag_ids = tag_ids;
        self
    }
}

/// Partially update a transaction. Unset fields keep their current value.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub user_id: String,
    pub transaction_id: Uuid,
    pub amount: Option<MoneyCents>,
    pub kind: Option<TransactionKind>,
    pub account_id: Option<Uuid>,
    /// `Some(None)` clears the category.
    pub category_id: Option<Option<Uuid>>,
    /// Replaces the whole tag set.
    pub tag_ids: Option<Vec<Uuid>>,
    pub description: Option<String>,
    /// An empty string clears the comments.
    pub comments: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, transaction_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            transaction_id,
            amount: None,
            kind: None,
            account_id: None,
            category_id: None,
            tag_ids: None,
            description: None,
            comments: None,
            date: None,
        }
    }

    #[must_use]
    pub fn amount(mut self, amount: MoneyCents) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Option<Uuid>) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn tag_ids(mut self, tag_ids: Vec<Uuid>) -> Self {
        self.tag_ids = Some(tag_ids);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

/// Open a new account.
#[derive(Clone, Debug)]
pub struct CreateAccountCmd {
    pub user_id: String,
    pub name: String,
    pub opening_balance: MoneyCents,
    pub color: String,
    pub icon: String,
}

impl CreateAccountCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        color: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            opening_balance: MoneyCents::ZERO,
            color: color.into(),
            icon: icon.into(),
        }
    }

    #[must_use]
    pub fn opening_balance(mut self, balance: MoneyCents) -> Self {
        self.opening_balance = balance;
        self
    }
}

/// Account fields the owner may change. `balance` resets the running total.
#[derive(Clone, Debug, Default)]
pub struct UpdateAccountCmd {
    pub name: Option<String>,
    pub balance: Option<MoneyCents>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Clone, Debug)]
pub struct CreateCategoryCmd {
    pub user_id: String,
    pub name: String,
    pub kind: TransactionKind,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl CreateCategoryCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, kind: TransactionKind) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            kind,
            color: None,
            icon: None,
        }
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct UpdateCategoryCmd {
    pub name: Option<String>,
    pub kind: Option<TransactionKind>,
    pub color: Option<String>,
    pub icon: Option<String>,
}
