use std::collections::BTreeSet;

use sea_orm::{DatabaseTransaction, PaginatorTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, accounts, categories, tags, transactions, users,
};

use super::Engine;

/// Generates a lookup scoped to the owner, plus a `require` variant that maps
/// absence to the given error.
///
/// A record owned by somebody else is reported exactly like a missing one.
macro_rules! impl_owned_lookup {
    ($find_fn:ident, $require_fn:ident, $entity:ident, $err:ident, $err_msg:literal) => {
        async fn $find_fn(
            &self,
            db: &DatabaseTransaction,
            user_id: &str,
            id: Uuid,
        ) -> ResultEngine<Option<$entity::Model>> {
            $entity::Entity::find_by_id(id)
                .filter($entity::Column::UserId.eq(user_id))
                .one(db)
                .await
                .map_err(Into::into)
        }

        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            user_id: &str,
            id: Uuid,
        ) -> ResultEngine<$entity::Model> {
            self.$find_fn(db, user_id, id)
                .await?
                .ok_or_else(|| EngineError::$err($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_owned_lookup!(
        find_owned_account,
        require_owned_account,
        accounts,
        NotFound,
        "account"
    );

    impl_owned_lookup!(
        find_owned_transaction,
        require_owned_transaction,
        transactions,
        NotFound,
        "transaction"
    );

    impl_owned_lookup!(
        find_owned_category,
        require_owned_category,
        categories,
        NotFound,
        "category"
    );

    impl_owned_lookup!(find_owned_tag, require_owned_tag, tags, NotFound, "tag");

    /// Like [`Engine::require_owned_account`], for ids supplied inside a
    /// transaction payload.
    pub(super) async fn require_account_reference(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        account_id: Uuid,
    ) -> ResultEngine<accounts::Model> {
        self.find_owned_account(db, user_id, account_id)
            .await?
            .ok_or_else(|| EngineError::InvalidReference("account not found".to_string()))
    }

    pub(super) async fn require_category_reference(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        category_id: Uuid,
    ) -> ResultEngine<categories::Model> {
        self.find_owned_category(db, user_id, category_id)
            .await?
            .ok_or_else(|| EngineError::InvalidReference("category not found".to_string()))
    }

    /// Checks that every tag id resolves to a tag owned by `user_id` and
    /// returns the ids deduplicated and sorted.
    pub(super) async fn require_tag_references(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        tag_ids: &[Uuid],
    ) -> ResultEngine<Vec<Uuid>> {
        let unique: BTreeSet<Uuid> = tag_ids.iter().copied().collect();
        if unique.is_empty() {
            return Ok(Vec::new());
        }

        let found = tags::Entity::find()
            .filter(tags::Column::UserId.eq(user_id))
            .filter(tags::Column::Id.is_in(unique.iter().copied()))
            .count(db)
            .await?;
        if found != unique.len() as u64 {
            return Err(EngineError::InvalidReference(
                "one or more tags not found".to_string(),
            ));
        }
        Ok(unique.into_iter().collect())
    }

    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::InvalidReference("user record not found".to_string()))
    }
}
