use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Role, User, categories, suppliers, users, util};

use super::{Engine, with_tx};

/// A supplier or category as listed to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaItem {
    pub id: i64,
    pub name: String,
}

impl Engine {
    /// Creates a user with a freshly minted opaque bearer token.
    ///
    /// Returns the user and the token; the token is stored verbatim and
    /// never derivable again, so the caller must hand it to the user.
    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        password: &str,
        role: Role,
    ) -> ResultEngine<(User, String)> {
        let email = util::normalize_required_name(email, "email")?.to_lowercase();
        let name = util::normalize_required_name(name, "user")?;
        let token = Uuid::new_v4().simple().to_string();
        with_tx!(self, |db_tx| {
            let existing = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(email));
            }
            let model = users::ActiveModel {
                id: ActiveValue::NotSet,
                email: ActiveValue::Set(email.clone()),
                name: ActiveValue::Set(name.clone()),
                password: ActiveValue::Set(password.to_string()),
                role: ActiveValue::Set(role.as_str().to_string()),
                token: ActiveValue::Set(token.clone()),
            }
            .insert(&db_tx)
            .await?;
            Ok((User::try_from(model)?, token))
        })
    }

    /// Looks up the user owning a bearer token.
    pub async fn authenticate(&self, token: &str) -> ResultEngine<User> {
        let model = users::Entity::find()
            .filter(users::Column::Token.eq(token))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("token not exists".to_string()))?;
        User::try_from(model)
    }

    /// Lists users, name order.
    pub async fn list_users(&self) -> ResultEngine<Vec<User>> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(User::try_from).collect()
    }

    /// Creates a supplier. Names that normalize to an existing dedup key
    /// are rejected, so `"ACME"` cannot join `"Acme"`.
    pub async fn create_supplier(&self, name: &str) -> ResultEngine<MetaItem> {
        let name = util::normalize_required_name(name, "supplier")?;
        let key = util::dedup_key(&name);
        with_tx!(self, |db_tx| {
            let existing = suppliers::Entity::find()
                .filter(suppliers::Column::NameNorm.eq(key.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(name));
            }
            let model = suppliers::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name.clone()),
                name_norm: ActiveValue::Set(key),
            }
            .insert(&db_tx)
            .await?;
            Ok(MetaItem {
                id: model.id,
                name: model.name,
            })
        })
    }

    /// Creates a category, with the same dedup rule as suppliers.
    pub async fn create_category(&self, name: &str) -> ResultEngine<MetaItem> {
        let name = util::normalize_required_name(name, "category")?;
        let key = util::dedup_key(&name);
        with_tx!(self, |db_tx| {
            let existing = categories::Entity::find()
                .filter(categories::Column::NameNorm.eq(key.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(name));
            }
            let model = categories::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name.clone()),
                name_norm: ActiveValue::Set(key),
            }
            .insert(&db_tx)
            .await?;
            Ok(MetaItem {
                id: model.id,
                name: model.name,
            })
        })
    }

    /// Lists suppliers, name order.
    pub async fn list_suppliers(&self) -> ResultEngine<Vec<MetaItem>> {
        let models = suppliers::Entity::find()
            .order_by_asc(suppliers::Column::Name)
            .all(&self.database)
            .await?;
        Ok(models
            .into_iter()
            .map(|m| MetaItem {
                id: m.id,
                name: m.name,
            })
            .collect())
    }

    /// Lists categories, name order.
    pub async fn list_categories(&self) -> ResultEngine<Vec<MetaItem>> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;
        Ok(models
            .into_iter()
            .map(|m| MetaItem {
                id: m.id,
                name: m.name,
            })
            .collect())
    }

    /// Get-or-create by dedup key, used by the bulk import.
    pub(super) async fn ensure_supplier(
        &self,
        db_tx: &DatabaseTransaction,
        name: &str,
    ) -> ResultEngine<i64> {
        let name = util::normalize_required_name(name, "supplier")?;
        let key = util::dedup_key(&name);
        let existing = suppliers::Entity::find()
            .filter(suppliers::Column::NameNorm.eq(key.clone()))
            .one(db_tx)
            .await?;
        if let Some(model) = existing {
            return Ok(model.id);
        }
        let model = suppliers::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name),
            name_norm: ActiveValue::Set(key),
        }
        .insert(db_tx)
        .await?;
        Ok(model.id)
    }

    /// Get-or-create by dedup key, used by the bulk import.
    pub(super) async fn ensure_category(
        &self,
        db_tx: &DatabaseTransaction,
        name: &str,
    ) -> ResultEngine<i64> {
        let name = util::normalize_required_name(name, "category")?;
        let key = util::dedup_key(&name);
        let existing = categories::Entity::find()
            .filter(categories::Column::NameNorm.eq(key.clone()))
            .one(db_tx)
            .await?;
        if let Some(model) = existing {
            return Ok(model.id);
        }
        let model = categories::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name),
            name_norm: ActiveValue::Set(key),
        }
        .insert(db_tx)
        .await?;
        Ok(model.id)
    }
}
