use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Account, CreateAccountCmd, ResultEngine, UpdateAccountCmd, accounts};

use super::{Engine, ensure_balance_within_limit, normalize_required_name, with_tx};

impl Engine {
    /// Opens an account for an existing user.
    ///
    /// The opening balance is the account's baseline: transactions move the
    /// balance relative to it.
    pub async fn create_account(&self, cmd: CreateAccountCmd) -> ResultEngine<Account> {
        let name = normalize_required_name(&cmd.name, "account")?;
        ensure_balance_within_limit(cmd.opening_balance)?;

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, &cmd.user_id).await?;
            let model = accounts::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(cmd.user_id.clone()),
                name: ActiveValue::Set(name),
                balance: ActiveValue::Set(cmd.opening_balance.cents()),
                color: ActiveValue::Set(cmd.color.trim().to_string()),
                icon: ActiveValue::Set(cmd.icon.trim().to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(account_id = %model.id, "account created");
            Ok(Account::from(model))
        })
    }

    /// Lists the caller's accounts ordered by name.
    pub async fn accounts(&self, user_id: &str) -> ResultEngine<Vec<Account>> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id))
            .order_by_asc(accounts::Column::Name)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Account::from).collect())
    }

    pub async fn account(&self, user_id: &str, account_id: Uuid) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_owned_account(&db_tx, user_id, account_id)
                .await?;
            Ok(Account::from(model))
        })
    }

    /// Updates account metadata.
    ///
    /// A supplied `balance` is a direct assignment chosen by the owner (a
    /// reconciliation with the real bank balance). It becomes the new
    /// baseline for later increments.
    pub async fn update_account(
        &self,
        user_id: &str,
        account_id: Uuid,
        cmd: UpdateAccountCmd,
    ) -> ResultEngine<Account> {
        let name = cmd
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "account"))
            .transpose()?;
        if let Some(balance) = cmd.balance {
            ensure_balance_within_limit(balance)?;
        }

        with_tx!(self, |db_tx| {
            let existing = self
                .require_owned_account(&db_tx, user_id, account_id)
                .await?;
            let mut active: accounts::ActiveModel = existing.clone().into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(balance) = cmd.balance {
                tracing::info!(%account_id, %balance, "account balance reset");
                active.balance = ActiveValue::Set(balance.cents());
            }
            if let Some(color) = cmd.color.as_deref() {
                active.color = ActiveValue::Set(color.trim().to_string());
            }
            if let Some(icon) = cmd.icon.as_deref() {
                active.icon = ActiveValue::Set(icon.trim().to_string());
            }
            if !active.is_changed() {
                return Ok(Account::from(existing));
            }
            let model = active.update(&db_tx).await?;
            Ok(Account::from(model))
        })
    }

    /// Deletes an account together with its transactions.
    pub async fn delete_account(&self, user_id: &str, account_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_owned_account(&db_tx, user_id, account_id)
                .await?;
            accounts::Entity::delete_by_id(account_id)
                .exec(&db_tx)
                .await?;
            tracing::info!(%account_id, "account deleted");
            Ok(())
        })
    }
}
