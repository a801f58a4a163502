use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::{LocationWithEmployee, MapWithLocations},
    entities::{employee, location, map},
    errors::ServiceError,
    validation::require_field,
};

/// Fields for creating a map. `image_url` is `Some` once the uploaded
/// image has been stored; absence fails validation.
#[derive(Debug, Clone)]
pub struct NewMap {
    pub name: String,
    pub state: String,
    pub city: String,
    pub building: String,
    pub floor: String,
    pub image_url: Option<String>,
}

/// Partial update; only supplied fields change.
#[derive(Debug, Clone, Default)]
pub struct MapChanges {
    pub name: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub image_url: Option<String>,
}

/// Service for managing floor-plan maps
#[derive(Clone)]
pub struct MapService {
    db: Arc<DbPool>,
}

impl MapService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Lists all maps ordered by (state, city, building)
    #[instrument(skip(self))]
    pub async fn list_maps(&self) -> Result<Vec<map::Model>, ServiceError> {
        let db = &*self.db;
        let maps = map::Entity::find()
            .order_by_asc(map::Column::State)
            .order_by_asc(map::Column::City)
            .order_by_asc(map::Column::Building)
            .all(db)
            .await?;

        Ok(maps)
    }

    /// Gets a map by id with its locations and each location's employee
    #[instrument(skip(self))]
    pub async fn get_map(&self, map_id: Uuid) -> Result<Option<MapWithLocations>, ServiceError> {
        let db = &*self.db;

        let Some(found) = map::Entity::find_by_id(map_id).one(db).await? else {
            return Ok(None);
        };

        let locations = found.find_related(location::Entity).all(db).await?;

        let employee_ids: Vec<Uuid> = locations.iter().map(|l| l.employee_id).collect();
        let employees_by_id: HashMap<Uuid, employee::Model> = if employee_ids.is_empty() {
            HashMap::new()
        } else {
            employee::Entity::find()
                .filter(employee::Column::Id.is_in(employee_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|e| (e.id, e))
                .collect()
        };

        let locations = locations
            .into_iter()
            .map(|l| LocationWithEmployee {
                employee: employees_by_id.get(&l.employee_id).cloned(),
                location: l,
            })
            .collect();

        Ok(Some(MapWithLocations {
            map: found,
            locations,
        }))
    }

    /// Creates a map after checking every locale field is present
    #[instrument(skip(self, new_map), fields(name = %new_map.name))]
    pub async fn create_map(&self, new_map: NewMap) -> Result<map::Model, ServiceError> {
        require_field("name", &new_map.name)?;
        require_field("state", &new_map.state)?;
        require_field("city", &new_map.city)?;
        require_field("building", &new_map.building)?;
        require_field("floor", &new_map.floor)?;
        let image_url = new_map.image_url.ok_or(ServiceError::MissingImage)?;

        let db = &*self.db;
        let model = map::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_map.name),
            state: Set(new_map.state),
            city: Set(new_map.city),
            building: Set(new_map.building),
            floor: Set(new_map.floor),
            image_url: Set(image_url),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(map_id = %model.id, "map created");

        Ok(model)
    }

    /// Applies a partial update to an existing map
    #[instrument(skip(self, changes))]
    pub async fn update_map(
        &self,
        map_id: Uuid,
        changes: MapChanges,
    ) -> Result<map::Model, ServiceError> {
        let db = &*self.db;

        let existing = map::Entity::find_by_id(map_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Map".to_string()))?;

        let mut active: map::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(state) = changes.state {
            active.state = Set(state);
        }
        if let Some(city) = changes.city {
            active.city = Set(city);
        }
        if let Some(building) = changes.building {
            active.building = Set(building);
        }
        if let Some(floor) = changes.floor {
            active.floor = Set(floor);
        }
        if let Some(image_url) = changes.image_url {
            active.image_url = Set(image_url);
        }

        let updated = active.update(db).await?;

        info!(map_id = %updated.id, "map updated");

        Ok(updated)
    }

    /// Deletes a map; dependent locations are removed by the store cascade
    #[instrument(skip(self))]
    pub async fn delete_map(&self, map_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;

        let existing = map::Entity::find_by_id(map_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Map".to_string()))?;

        map::Entity::delete_by_id(existing.id).exec(db).await?;

        info!(map_id = %map_id, "map deleted");

        Ok(())
    }
}
