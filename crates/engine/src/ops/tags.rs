use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{ResultEngine, Tag, tags};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    pub async fn create_tag(&self, user_id: &str, name: &str) -> ResultEngine<Tag> {
        let name = normalize_required_name(name, "tag")?;

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let model = tags::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(user_id.to_string()),
                name: ActiveValue::Set(name),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(Tag::from(model))
        })
    }

    pub async fn tags(&self, user_id: &str) -> ResultEngine<Vec<Tag>> {
        let models = tags::Entity::find()
            .filter(tags::Column::UserId.eq(user_id))
            .order_by_asc(tags::Column::Name)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Tag::from).collect())
    }

    pub async fn rename_tag(&self, user_id: &str, tag_id: Uuid, name: &str) -> ResultEngine<Tag> {
        let name = normalize_required_name(name, "tag")?;

        with_tx!(self, |db_tx| {
            let existing = self.require_owned_tag(&db_tx, user_id, tag_id).await?;
            let mut active: tags::ActiveModel = existing.into();
            active.name = ActiveValue::Set(name);
            let model = active.update(&db_tx).await?;
            Ok(Tag::from(model))
        })
    }

    /// Deletes a tag and detaches it from every transaction.
    pub async fn delete_tag(&self, user_id: &str, tag_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_owned_tag(&db_tx, user_id, tag_id).await?;
            tags::Entity::delete_by_id(tag_id).exec(&db_tx).await?;
            Ok(())
        })
    }
}
