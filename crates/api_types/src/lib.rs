use serde::{Deserialize, Deserializer, Serialize};

pub use money::Amount;

mod money;

/// Deserializes a field that distinguishes "absent" from "explicit null".
///
/// Use together with `#[serde(default)]`: an absent field stays `None`, a
/// `null` becomes `Some(None)` and a value becomes `Some(Some(value))`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    Expense,
}

pub mod user {
    use super::*;
    use chrono::{DateTime, Utc};

    /// Upserts the caller's user record.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserSync {
        pub email: String,
        pub name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserView {
        pub id: String,
        pub email: String,
        pub name: Option<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod account {
    use super::*;
    use uuid::Uuid;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        /// Opening balance, defaults to zero.
        #[serde(default)]
        pub balance: Option<Amount>,
        pub color: String,
        pub icon: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub name: Option<String>,
        /// Overwrites the current balance.
        pub balance: Option<Amount>,
        pub color: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        pub balance: Amount,
        pub color: String,
        pub icon: String,
    }
}

pub mod category {
    use super::*;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub color: Option<String>,
        pub icon: Option<String>,
        #[serde(rename = "type")]
        pub kind: TransactionType,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub color: Option<String>,
        pub icon: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<TransactionType>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub color: Option<String>,
        pub icon: Option<String>,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub created_at: DateTime<Utc>,
    }
}

pub mod tag {
    use super::*;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagUpdate {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TagView {
        pub id: Uuid,
        pub name: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod transaction {
    use super::*;
    use chrono::{DateTime, FixedOffset, Utc};
    use uuid::Uuid;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionNew {
        /// Must be > 0. The type defines the sign applied to the account.
        pub amount: Amount,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub account_id: Uuid,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub date: DateTime<FixedOffset>,
        #[serde(default)]
        pub description: String,
        pub comments: Option<String>,
        pub category_id: Option<Uuid>,
        #[serde(default)]
        pub tag_ids: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionCreated {
        pub id: Uuid,
        pub amount: Amount,
        pub account_id: Uuid,
    }

    /// Partial update. Absent fields keep their current value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionUpdate {
        pub amount: Option<Amount>,
        #[serde(rename = "type")]
        pub kind: Option<TransactionType>,
        pub account_id: Option<Uuid>,
        /// `null` clears the category.
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub category_id: Option<Option<Uuid>>,
        /// Replaces the whole tag set.
        pub tag_ids: Option<Vec<Uuid>>,
        pub description: Option<String>,
        pub comments: Option<String>,
        pub date: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: Uuid,
        pub user_id: String,
        pub account_id: Uuid,
        pub amount: Amount,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub date: DateTime<Utc>,
        pub description: String,
        pub comments: Option<String>,
        pub category_id: Option<Uuid>,
        pub tag_ids: Vec<Uuid>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionQuery {
        pub from: Option<DateTime<FixedOffset>>,
        pub to: Option<DateTime<FixedOffset>>,
        pub page: Option<u64>,
        pub limit: Option<u64>,
        #[serde(rename = "type")]
        pub kind: Option<TransactionType>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryRef {
        pub id: Uuid,
        pub name: String,
        pub color: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountRef {
        pub id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagRef {
        pub id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionListItem {
        pub id: Uuid,
        pub user_id: String,
        pub account_id: Uuid,
        pub amount: Amount,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub date: DateTime<Utc>,
        pub description: String,
        pub comments: Option<String>,
        pub category_id: Option<Uuid>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        pub category: Option<CategoryRef>,
        pub account: AccountRef,
        pub tags: Vec<TagRef>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PageMeta {
        pub total: u64,
        pub page: u64,
        pub total_pages: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub data: Vec<TransactionListItem>,
        pub meta: PageMeta,
    }
}

pub mod summary {
    use super::*;
    use chrono::{DateTime, FixedOffset};
    use uuid::Uuid;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryQuery {
        pub from: Option<DateTime<FixedOffset>>,
        pub to: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountSummary {
        pub id: Uuid,
        pub name: String,
        pub balance: Amount,
        pub color: String,
        pub icon: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DashboardSummary {
        pub total_balance: Amount,
        pub total_income: Amount,
        pub total_expense: Amount,
        pub accounts: Vec<AccountSummary>,
    }
}
