use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Category, CreateCategoryCmd, ResultEngine, UpdateCategoryCmd, categories,
};

use super::{Engine, apply_optional_text_patch, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    pub async fn create_category(&self, cmd: CreateCategoryCmd) -> ResultEngine<Category> {
        let name = normalize_required_name(&cmd.name, "category")?;

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, &cmd.user_id).await?;
            let model = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(cmd.user_id.clone()),
                name: ActiveValue::Set(name),
                color: ActiveValue::Set(normalize_optional_text(cmd.color.as_deref())),
                icon: ActiveValue::Set(normalize_optional_text(cmd.icon.as_deref())),
                kind: ActiveValue::Set(cmd.kind.as_str().to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Category::try_from(model)
        })
    }

    pub async fn categories(&self, user_id: &str) -> ResultEngine<Vec<Category>> {
        categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }

    pub async fn update_category(
        &self,
        user_id: &str,
        category_id: Uuid,
        cmd: UpdateCategoryCmd,
    ) -> ResultEngine<Category> {
        let name = cmd
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "category"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let existing = self
                .require_owned_category(&db_tx, user_id, category_id)
                .await?;
            let color = apply_optional_text_patch(existing.color.clone(), cmd.color.as_deref());
            let icon = apply_optional_text_patch(existing.icon.clone(), cmd.icon.as_deref());

            let mut active: categories::ActiveModel = existing.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(kind) = cmd.kind {
                active.kind = ActiveValue::Set(kind.as_str().to_string());
            }
            active.color = ActiveValue::Set(color);
            active.icon = ActiveValue::Set(icon);
            let model = active.update(&db_tx).await?;
            Category::try_from(model)
        })
    }

    /// Deletes a category. Its transactions stay, uncategorized.
    pub async fn delete_category(&self, user_id: &str, category_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_owned_category(&db_tx, user_id, category_id)
                .await?;
            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
