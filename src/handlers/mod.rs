pub mod common;
pub mod employees;
pub mod locations;
pub mod maps;
pub mod search;

use std::sync::Arc;

use crate::db::DbPool;
use crate::services::{
    employees::EmployeeService, images::ImageStore, locations::LocationService, maps::MapService,
    search::SearchService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub maps: Arc<MapService>,
    pub employees: Arc<EmployeeService>,
    pub locations: Arc<LocationService>,
    pub search: Arc<SearchService>,
    pub images: Arc<ImageStore>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, images: Arc<ImageStore>) -> Self {
        Self {
            maps: Arc::new(MapService::new(db.clone())),
            employees: Arc::new(EmployeeService::new(db.clone())),
            locations: Arc::new(LocationService::new(db.clone())),
            search: Arc::new(SearchService::new(db)),
            images,
        }
    }
}
