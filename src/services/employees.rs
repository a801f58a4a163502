use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, LoaderTrait, QueryFilter,
    QueryOrder,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::{EmployeeWithLocations, LocationWithMap},
    entities::{employee, location, map},
    errors::ServiceError,
    validation::require_field,
};

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub picture_url: Option<String>,
}

/// Partial update; only supplied fields change.
#[derive(Debug, Clone, Default)]
pub struct EmployeeChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub picture_url: Option<String>,
}

/// Attaches each employee's locations and each location's map.
///
/// Shared between the employee listing and the search engine so nested
/// payloads always have the same shape. Maps are fetched in one batched
/// query rather than per location.
pub(crate) async fn with_nested_maps(
    db: &DbPool,
    employees: Vec<employee::Model>,
) -> Result<Vec<EmployeeWithLocations>, ServiceError> {
    let locations = employees.load_many(location::Entity, db).await?;

    let map_ids: Vec<Uuid> = locations
        .iter()
        .flatten()
        .map(|l| l.map_id)
        .collect();
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

    Ok(employees
        .into_iter()
        .zip(locations)
        .map(|(person, pins)| EmployeeWithLocations {
            employee: person,
            locations: pins
                .into_iter()
                .map(|l| LocationWithMap {
                    map: maps_by_id.get(&l.map_id).cloned(),
                    location: l,
                })
                .collect(),
        })
        .collect())
}

/// Service for managing directory entries
#[derive(Clone)]
pub struct EmployeeService {
    db: Arc<DbPool>,
}

impl EmployeeService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Lists all employees ordered by name, with nested locations and maps
    #[instrument(skip(self))]
    pub async fn list_employees(&self) -> Result<Vec<EmployeeWithLocations>, ServiceError> {
        let db = &*self.db;
        let employees = employee::Entity::find()
            .order_by_asc(employee::Column::Name)
            .order_by_asc(employee::Column::CreatedAt)
            .order_by_asc(employee::Column::Id)
            .all(db)
            .await?;

        with_nested_maps(db, employees).await
    }

    /// Gets one employee with nested locations and maps
    #[instrument(skip(self))]
    pub async fn get_employee(
        &self,
        employee_id: Uuid,
    ) -> Result<Option<EmployeeWithLocations>, ServiceError> {
        let db = &*self.db;

        let Some(found) = employee::Entity::find_by_id(employee_id).one(db).await? else {
            return Ok(None);
        };

        let mut nested = with_nested_maps(db, vec![found]).await?;
        Ok(nested.pop())
    }

    /// Creates an employee after presence and email-uniqueness checks
    #[instrument(skip(self, new_employee), fields(email = %new_employee.email))]
    pub async fn create_employee(
        &self,
        new_employee: NewEmployee,
    ) -> Result<employee::Model, ServiceError> {
        require_field("name", &new_employee.name)?;
        require_field("phone", &new_employee.phone)?;
        require_field("email", &new_employee.email)?;

        let db = &*self.db;

        let existing = employee::Entity::find()
            .filter(employee::Column::Email.eq(new_employee.email.as_str()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::DuplicateEmail(new_employee.email));
        }

        let model = employee::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_employee.name),
            phone: Set(new_employee.phone),
            email: Set(new_employee.email),
            picture_url: Set(new_employee.picture_url),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(employee_id = %model.id, "employee created");

        Ok(model)
    }

    /// Applies a partial update; a changed email is re-checked for
    /// uniqueness against all other employees
    #[instrument(skip(self, changes))]
    pub async fn update_employee(
        &self,
        employee_id: Uuid,
        changes: EmployeeChanges,
    ) -> Result<employee::Model, ServiceError> {
        let db = &*self.db;

        let existing = employee::Entity::find_by_id(employee_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Employee".to_string()))?;

        if let Some(email) = changes.email.as_deref() {
            if email != existing.email {
                let conflict = employee::Entity::find()
                    .filter(employee::Column::Email.eq(email))
                    .filter(employee::Column::Id.ne(employee_id))
                    .one(db)
                    .await?;
                if conflict.is_some() {
                    return Err(ServiceError::DuplicateEmail(email.to_string()));
                }
            }
        }

        let mut active: employee::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(picture_url) = changes.picture_url {
            active.picture_url = Set(Some(picture_url));
        }

        let updated = active.update(db).await?;

        info!(employee_id = %updated.id, "employee updated");

        Ok(updated)
    }

    /// Deletes an employee; dependent locations are removed by the store cascade
    #[instrument(skip(self))]
    pub async fn delete_employee(&self, employee_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;

        let existing = employee::Entity::find_by_id(employee_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Employee".to_string()))?;

        employee::Entity::delete_by_id(existing.id).exec(db).await?;

        info!(employee_id = %employee_id, "employee deleted");

        Ok(())
    }
}
