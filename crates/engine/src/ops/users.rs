use chrono::Utc;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, User, users};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Creates or refreshes the caller's user record.
    ///
    /// `user_id` is the subject of the verified credential; `email` and
    /// `name` mirror what the identity provider holds for it.
    pub async fn sync_user(
        &self,
        user_id: &str,
        email: &str,
        name: Option<&str>,
    ) -> ResultEngine<User> {
        let email = email.trim();
        if email.is_empty() {
            return Err(EngineError::InvalidName(
                "email must not be empty".to_string(),
            ));
        }
        let name = normalize_optional_text(name);

        with_tx!(self, |db_tx| {
            let model = match users::Entity::find_by_id(user_id.to_string())
                .one(&db_tx)
                .await?
            {
                Some(existing) => {
                    let mut active: users::ActiveModel = existing.into();
                    active.email = ActiveValue::Set(email.to_string());
                    active.name = ActiveValue::Set(name);
                    active.update(&db_tx).await?
                }
                None => {
                    tracing::info!(%user_id, "user record created");
                    users::ActiveModel {
                        id: ActiveValue::Set(user_id.to_string()),
                        email: ActiveValue::Set(email.to_string()),
                        name: ActiveValue::Set(name),
                        created_at: ActiveValue::Set(Utc::now()),
                    }
                    .insert(&db_tx)
                    .await?
                }
            };
            Ok(User::from(model))
        })
    }

    pub async fn user(&self, user_id: &str) -> ResultEngine<User> {
        users::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::NotFound("user".to_string()))
    }
}
