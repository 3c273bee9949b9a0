use chrono::Utc;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Contribution, ContributionPatch, CreateTransactionCmd, ResultEngine, Transaction,
    UpdateTransactionCmd, balance, transactions,
};

use super::super::{
    Engine, apply_optional_text_patch, ensure_positive, normalize_optional_text, with_tx,
};
use super::contribution_of;

impl Engine {
    /// Records a transaction and moves its account balance by the signed
    /// amount, as one atomic unit.
    ///
    /// Every reference (account, category, tags) is checked before anything
    /// is written; a dangling one fails with `InvalidReference`.
    pub async fn create_transaction(&self, cmd: CreateTransactionCmd) -> ResultEngine<Transaction> {
        ensure_positive(cmd.amount)?;
        let description = cmd.description.trim().to_string();
        let comments = normalize_optional_text(cmd.comments.as_deref());

        with_tx!(self, |db_tx| {
            self.require_account_reference(&db_tx, &cmd.user_id, cmd.account_id)
                .await?;
            if let Some(category_id) = cmd.category_id {
                self.require_category_reference(&db_tx, &cmd.user_id, category_id)
                    .await?;
            }
            let tag_ids = self
                .require_tag_references(&db_tx, &cmd.user_id, &cmd.tag_ids)
                .await?;

            let now = Utc::now();
            let id = Uuid::new_v4();
            let model = transactions::ActiveModel {
                id: ActiveValue::Set(id),
                user_id: ActiveValue::Set(cmd.user_id.clone()),
                account_id: ActiveValue::Set(cmd.account_id),
                amount: ActiveValue::Set(cmd.amount.cents()),
                kind: ActiveValue::Set(cmd.kind.as_str().to_string()),
                date: ActiveValue::Set(cmd.date),
                description: ActiveValue::Set(description),
                comments: ActiveValue::Set(comments),
                category_id: ActiveValue::Set(cmd.category_id),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            self.link_tags(&db_tx, id, &tag_ids).await?;

            let contribution = Contribution {
                account_id: cmd.account_id,
                amount: cmd.amount,
                kind: cmd.kind,
            };
            self.apply_balance_deltas(&db_tx, &cmd.user_id, &balance::plan_create(&contribution))
                .await?;

            tracing::info!(
                transaction_id = %id,
                account_id = %cmd.account_id,
                amount = %cmd.amount,
                kind = cmd.kind.as_str(),
                "transaction created"
            );
            Transaction::from_model(model, tag_ids)
        })
    }

    /// Applies a partial update, moving balances from the old contribution
    /// to the new one.
    ///
    /// The old contribution is reversed on its account before the new one is
    /// applied. When the account does not change both steps collapse into a
    /// single increment; when it does, each account moves exactly once.
    pub async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<Transaction> {
        if let Some(amount) = cmd.amount {
            ensure_positive(amount)?;
        }

        with_tx!(self, |db_tx| {
            let existing = self
                .require_owned_transaction(&db_tx, &cmd.user_id, cmd.transaction_id)
                .await?;
            let old = contribution_of(&existing)?;

            if let Some(account_id) = cmd.account_id {
                self.require_account_reference(&db_tx, &cmd.user_id, account_id)
                    .await?;
            }
            if let Some(Some(category_id)) = cmd.category_id {
                self.require_category_reference(&db_tx, &cmd.user_id, category_id)
                    .await?;
            }
            let tag_ids = match cmd.tag_ids.as_deref() {
                Some(ids) => Some(
                    self.require_tag_references(&db_tx, &cmd.user_id, ids)
                        .await?,
                ),
                None => None,
            };

            let plan = balance::plan_update(
                &old,
                &ContributionPatch {
                    account_id: cmd.account_id,
                    amount: cmd.amount,
                    kind: cmd.kind,
                },
            );
            let deltas = balance::net(&plan.deltas)?;
            self.apply_balance_deltas(&db_tx, &cmd.user_id, &deltas)
                .await?;

            let comments =
                apply_optional_text_patch(existing.comments.clone(), cmd.comments.as_deref());
            let mut active: transactions::ActiveModel = existing.into();
            active.account_id = ActiveValue::Set(plan.next.account_id);
            active.amount = ActiveValue::Set(plan.next.amount.cents());
            active.kind = ActiveValue::Set(plan.next.kind.as_str().to_string());
            if let Some(category_id) = cmd.category_id {
                active.category_id = ActiveValue::Set(category_id);
            }
            if let Some(description) = cmd.description.as_deref() {
                active.description = ActiveValue::Set(description.trim().to_string());
            }
            active.comments = ActiveValue::Set(comments);
            if let Some(date) = cmd.date {
                active.date = ActiveValue::Set(date);
            }
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;

            let tag_ids = match tag_ids {
                Some(ids) => {
                    self.unlink_tags(&db_tx, cmd.transaction_id).await?;
                    self.link_tags(&db_tx, cmd.transaction_id, &ids).await?;
                    ids
                }
                None => self.tag_ids_of(&db_tx, cmd.transaction_id).await?,
            };

            tracing::info!(
                transaction_id = %cmd.transaction_id,
                increments = deltas.len(),
                "transaction updated"
            );
            Transaction::from_model(model, tag_ids)
        })
    }

    /// Removes a transaction and takes its contribution back out of the
    /// account balance.
    pub async fn delete_transaction(&self, user_id: &str, transaction_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let existing = self
                .require_owned_transaction(&db_tx, user_id, transaction_id)
                .await?;
            let contribution = contribution_of(&existing)?;
            self.apply_balance_deltas(&db_tx, user_id, &balance::plan_delete(&contribution))
                .await?;

            self.unlink_tags(&db_tx, transaction_id).await?;
            transactions::Entity::delete_by_id(transaction_id)
                .exec(&db_tx)
                .await?;

            tracing::info!(%transaction_id, "transaction deleted");
            Ok(())
        })
    }

    /// Returns one transaction owned by `user_id`.
    pub async fn transaction(&self, user_id: &str, transaction_id: Uuid) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_owned_transaction(&db_tx, user_id, transaction_id)
                .await?;
            let tag_ids = self.tag_ids_of(&db_tx, transaction_id).await?;
            Transaction::from_model(model, tag_ids)
        })
    }
}
