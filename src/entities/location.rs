use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A coordinate pin binding one employee to one map. `x` and `y` are
/// fractions of the map image's bounding box, both in the closed
/// interval [0, 1].
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "locations")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub map_id: Uuid,
    pub employee_id: Uuid,
    pub x: f64,
    pub y: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::map::Entity",
        from = "Column::MapId",
        to = "super::map::Column::Id"
    )]
    Map,
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
}

impl Related<super::map::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Map.def()
    }
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

fn coordinate_in_bounds(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        // Store-level backstop behind the service-level coordinate checks
        if let ActiveValue::Set(x) = active_model.x {
            if !coordinate_in_bounds(x) {
                return Err(DbErr::Custom(format!(
                    "X coordinate out of range [0, 1]: {}",
                    x
                )));
            }
        }
        if let ActiveValue::Set(y) = active_model.y {
            if !coordinate_in_bounds(y) {
                return Err(DbErr::Custom(format!(
                    "Y coordinate out of range [0, 1]: {}",
                    y
                )));
            }
        }

        if insert {
            active_model.created_at = Set(Utc::now());
        }
        active_model.updated_at = Set(Some(Utc::now()));

        Ok(active_model)
    }
}
