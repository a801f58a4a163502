use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Floor-plan map entity: one uploaded floor-plan image plus its locale
/// metadata. Duplicate locale tuples are allowed.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "maps")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Primary key
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name of the floor plan
    #[validate(length(
        min = 1,
        max = 255,
        message = "Map name must be between 1 and 255 characters"
    ))]
    pub name: String,

    /// State or region the building is in
    #[validate(length(min = 1, message = "State must not be empty"))]
    pub state: String,

    /// City the building is in
    #[validate(length(min = 1, message = "City must not be empty"))]
    pub city: String,

    /// Building identifier
    #[validate(length(min = 1, message = "Building must not be empty"))]
    pub building: String,

    /// Floor identifier
    #[validate(length(min = 1, message = "Floor must not be empty"))]
    pub floor: String,

    /// Public path of the stored floor-plan image
    pub image_url: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::location::Entity")]
    Locations,
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Locations.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        if insert {
            active_model.created_at = Set(Utc::now());
        }
        active_model.updated_at = Set(Some(Utc::now()));

        let model: Model = active_model.clone().try_into().map_err(|_| {
            DbErr::Custom("Failed to convert ActiveModel to Model for validation".to_string())
        })?;

        if let Err(err) = model.validate() {
            return Err(DbErr::Custom(format!("Validation error: {}", err)));
        }

        Ok(active_model)
    }
}
