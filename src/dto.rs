//! Composed response shapes with eagerly loaded relations.
//!
//! Entity fields are flattened so a nested response reads as the entity
//! plus its relations, e.g. a location serializes as
//! `{ id, mapId, employeeId, x, y, ..., map: {...}, employee: {...} }`.

use serde::Serialize;

use crate::entities::{employee, location, map};

/// Location with both of its referenced entities attached.
#[derive(Debug, Serialize)]
pub struct LocationWithRelations {
    #[serde(flatten)]
    pub location: location::Model,
    pub map: Option<map::Model>,
    pub employee: Option<employee::Model>,
}

/// Location nested inside an employee response.
#[derive(Debug, Serialize)]
pub struct LocationWithMap {
    #[serde(flatten)]
    pub location: location::Model,
    pub map: Option<map::Model>,
}

/// Location nested inside a map response.
#[derive(Debug, Serialize)]
pub struct LocationWithEmployee {
    #[serde(flatten)]
    pub location: location::Model,
    pub employee: Option<employee::Model>,
}

/// Employee with every location pin and each pin's map.
#[derive(Debug, Serialize)]
pub struct EmployeeWithLocations {
    #[serde(flatten)]
    pub employee: employee::Model,
    pub locations: Vec<LocationWithMap>,
}

/// Map with every location pin and each pin's employee.
#[derive(Debug, Serialize)]
pub struct MapWithLocations {
    #[serde(flatten)]
    pub map: map::Model,
    pub locations: Vec<LocationWithEmployee>,
}

/// Search endpoint payload; `count` is the number of matching employees,
/// not the number of matching locations.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<EmployeeWithLocations>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn location_with_relations_flattens_entity_fields() {
        let map_id = Uuid::new_v4();
        let employee_id = Uuid::new_v4();
        let shape = LocationWithRelations {
            location: location::Model {
                id: Uuid::new_v4(),
                map_id,
                employee_id,
                x: 0.25,
                y: 0.75,
                created_at: Utc::now(),
                updated_at: None,
            },
            map: None,
            employee: None,
        };

        let value = serde_json::to_value(&shape).unwrap();
        assert_eq!(value["mapId"], serde_json::json!(map_id));
        assert_eq!(value["x"], serde_json::json!(0.25));
        assert!(value["map"].is_null());
        assert!(value.get("location").is_none());
    }
}
