use sea_orm::DatabaseConnection;

use crate::{EngineError, MoneyCents, ResultEngine};

mod access;
mod accounts;
mod balances;
mod categories;
mod tags;
mod transactions;
mod users;

pub use transactions::{
    AccountBalance, DEFAULT_LIMIT, DEFAULT_PAGE, DashboardSummary, MAX_LIMIT,
    TransactionListFilter, TransactionListItem, TransactionPage,
};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// Dropping the `DatabaseTransaction` without committing rolls it back, so an
/// early `?` inside the body discards every write made so far.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn apply_optional_text_patch(existing: Option<String>, patch: Option<&str>) -> Option<String> {
    match patch {
        None => existing,
        Some(value) => normalize_optional_text(Some(value)),
    }
}

fn ensure_positive(amount: MoneyCents) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(
            "amount must be > 0".to_string(),
        ));
    }
    if !amount.is_within_limit() {
        return Err(EngineError::InvalidAmount("amount too large".to_string()));
    }
    Ok(())
}

fn ensure_balance_within_limit(balance: MoneyCents) -> ResultEngine<()> {
    if !balance.is_within_limit() {
        return Err(EngineError::InvalidAmount(
            "balance out of range".to_string(),
        ));
    }
    Ok(())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_name_is_trimmed() {
        assert_eq!(normalize_required_name("  Food ", "category").unwrap(), "Food");
        assert_eq!(
            normalize_required_name("   ", "tag"),
            Err(EngineError::InvalidName("tag name must not be empty".to_string()))
        );
    }

    #[test]
    fn text_patch_keeps_sets_or_clears() {
        let existing = Some("old".to_string());
        assert_eq!(apply_optional_text_patch(existing.clone(), None), existing);
        assert_eq!(
            apply_optional_text_patch(existing.clone(), Some(" new ")),
            Some("new".to_string())
        );
        assert_eq!(apply_optional_text_patch(existing, Some("  ")), None);
    }

    #[test]
    fn only_positive_amounts_pass() {
        assert!(ensure_positive(MoneyCents::new(1)).is_ok());
        assert!(ensure_positive(MoneyCents::ZERO).is_err());
        assert!(ensure_positive(MoneyCents::new(-5)).is_err());
        assert!(ensure_positive(MoneyCents::MAX_ABS).is_ok());
        assert_eq!(
            ensure_positive(MoneyCents::new(MoneyCents::MAX_ABS.cents() + 1)),
            Err(EngineError::InvalidAmount("amount too large".to_string()))
        );
    }

    #[test]
    fn balances_may_be_negative_but_bounded() {
        assert!(ensure_balance_within_limit(-MoneyCents::MAX_ABS).is_ok());
        assert!(ensure_balance_within_limit(MoneyCents::new(i64::MAX - 10)).is_err());
    }
}
