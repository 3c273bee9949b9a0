use sea_orm::{DatabaseTransaction, PaginatorTrait, QueryFilter, prelude::*, sea_query::Expr};

use crate::{BalanceDelta, EngineError, MoneyCents, ResultEngine, accounts};

use super::Engine;

impl Engine {
    /// Applies each delta as `balance = balance + delta`, in order.
    ///
    /// The new value is computed by the database against the current row, so
    /// concurrent writers never overwrite each other's increments. Must run
    /// inside the same database transaction as the transaction-row write.
    ///
    /// The update only matches while the resulting balance stays within
    /// [`MoneyCents::MAX_ABS`]; an out-of-range result fails with
    /// `InvalidAmount` and the caller's unit rolls back.
    pub(super) async fn apply_balance_deltas(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        deltas: &[BalanceDelta],
    ) -> ResultEngine<()> {
        let max = MoneyCents::MAX_ABS.cents();
        for delta in deltas {
            let result = accounts::Entity::update_many()
                .col_expr(
                    accounts::Column::Balance,
                    Expr::col(accounts::Column::Balance).add(delta.delta.cents()),
                )
                .filter(accounts::Column::Id.eq(delta.account_id))
                .filter(accounts::Column::UserId.eq(user_id))
                .filter(
                    Expr::expr(Expr::col(accounts::Column::Balance).add(delta.delta.cents()))
                        .between(-max, max),
                )
                .exec(db_tx)
                .await?;
            if result.rows_affected != 1 {
                return Err(self.rejected_increment(db_tx, user_id, delta).await?);
            }
            tracing::debug!(
                account_id = %delta.account_id,
                delta = %delta.delta,
                "balance increment applied"
            );
        }
        Ok(())
    }

    /// Explains why an increment matched no row.
    async fn rejected_increment(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        delta: &BalanceDelta,
    ) -> ResultEngine<EngineError> {
        let exists = accounts::Entity::find_by_id(delta.account_id)
            .filter(accounts::Column::UserId.eq(user_id))
            .count(db_tx)
            .await?
            > 0;
        if exists {
            tracing::warn!(
                account_id = %delta.account_id,
                delta = %delta.delta,
                "balance increment out of range"
            );
            Ok(EngineError::InvalidAmount("balance out of range".to_string()))
        } else {
            Ok(EngineError::InvalidReference("account not found".to_string()))
        }
    }
}
