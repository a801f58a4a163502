use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::LocationWithRelations,
    entities::{employee, location, map},
    errors::ServiceError,
    validation::{check_coordinate, Axis},
};

#[derive(Debug, Clone)]
pub struct NewLocation {
    pub map_id: Uuid,
    pub employee_id: Uuid,
    pub x: f64,
    pub y: f64,
}

/// Partial update; either coordinate may change independently.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationChanges {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Sequences validation, existence checks, and store mutation for
/// location pins. Existence checks run before any write so an invalid
/// foreign reference is never reported as success.
#[derive(Clone)]
pub struct LocationService {
    db: Arc<DbPool>,
}

impl LocationService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Lists all locations with nested map and employee
    #[instrument(skip(self))]
    pub async fn list_locations(&self) -> Result<Vec<LocationWithRelations>, ServiceError> {
        let db = &*self.db;
        let locations = location::Entity::find().all(db).await?;

        let map_ids: Vec<Uuid> = locations.iter().map(|l| l.map_id).collect();
        let employee_ids: Vec<Uuid> = locations.iter().map(|l| l.employee_id).collect();

        let maps_by_id: HashMap<Uuid, map::Model> = if map_ids.is_empty() {
            HashMap::new()
        } else {
            map::Entity::find()
                .filter(map::Column::Id.is_in(map_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|m| (m.id, m))
                .collect()
        };
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

        Ok(locations
            .into_iter()
            .map(|l| LocationWithRelations {
                map: maps_by_id.get(&l.map_id).cloned(),
                employee: employees_by_id.get(&l.employee_id).cloned(),
                location: l,
            })
            .collect())
    }

    /// Gets one location with nested map and employee
    #[instrument(skip(self))]
    pub async fn get_location(
        &self,
        location_id: Uuid,
    ) -> Result<Option<LocationWithRelations>, ServiceError> {
        let db = &*self.db;

        let Some(found) = location::Entity::find_by_id(location_id).one(db).await? else {
            return Ok(None);
        };

        let found_map = map::Entity::find_by_id(found.map_id).one(db).await?;
        let found_employee = employee::Entity::find_by_id(found.employee_id).one(db).await?;

        Ok(Some(LocationWithRelations {
            map: found_map,
            employee: found_employee,
            location: found,
        }))
    }

    /// Creates a location pin: coordinate bounds, then map existence, then
    /// employee existence, then the insert
    #[instrument(skip(self))]
    pub async fn create_location(
        &self,
        new_location: NewLocation,
    ) -> Result<LocationWithRelations, ServiceError> {
        check_coordinate(Axis::X, new_location.x)?;
        check_coordinate(Axis::Y, new_location.y)?;

        let db = &*self.db;

        let found_map = map::Entity::find_by_id(new_location.map_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Map".to_string()))?;

        let found_employee = employee::Entity::find_by_id(new_location.employee_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Employee".to_string()))?;

        let model = location::ActiveModel {
            id: Set(Uuid::new_v4()),
            map_id: Set(new_location.map_id),
            employee_id: Set(new_location.employee_id),
            x: Set(new_location.x),
            y: Set(new_location.y),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(location_id = %model.id, map_id = %found_map.id, employee_id = %found_employee.id, "location created");

        Ok(LocationWithRelations {
            location: model,
            map: Some(found_map),
            employee: Some(found_employee),
        })
    }

    /// Applies a partial coordinate update after re-validating any
    /// supplied coordinate
    #[instrument(skip(self))]
    pub async fn update_location(
        &self,
        location_id: Uuid,
        changes: LocationChanges,
    ) -> Result<LocationWithRelations, ServiceError> {
        let db = &*self.db;

        let existing = location::Entity::find_by_id(location_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Location".to_string()))?;

        if let Some(x) = changes.x {
            check_coordinate(Axis::X, x)?;
        }
        if let Some(y) = changes.y {
            check_coordinate(Axis::Y, y)?;
        }

        let mut active: location::ActiveModel = existing.into();
        if let Some(x) = changes.x {
            active.x = Set(x);
        }
        if let Some(y) = changes.y {
            active.y = Set(y);
        }

        let updated = active.update(db).await?;

        let found_map = map::Entity::find_by_id(updated.map_id).one(db).await?;
        let found_employee = employee::Entity::find_by_id(updated.employee_id).one(db).await?;

        info!(location_id = %updated.id, "location updated");

        Ok(LocationWithRelations {
            location: updated,
            map: found_map,
            employee: found_employee,
        })
    }

    /// Deletes a location pin
    #[instrument(skip(self))]
    pub async fn delete_location(&self, location_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;

        let existing = location::Entity::find_by_id(location_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Location".to_string()))?;

        location::Entity::delete_by_id(existing.id).exec(db).await?;

        info!(location_id = %location_id, "location deleted");

        Ok(())
    }
}
