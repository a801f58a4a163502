use std::sync::Arc;

use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::SearchResponse,
    entities::{employee, location, map},
    errors::ServiceError,
    services::employees::with_nested_maps,
};

/// Explicit filter value-object for the search endpoint. Built once per
/// request by [`SearchFilter::new`]; blank inputs are normalized away so
/// the query engine only ever sees meaningful filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub term: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub building: Option<String>,
    pub floor: Option<String>,
}

impl SearchFilter {
    pub fn new(
        term: Option<String>,
        state: Option<String>,
        city: Option<String>,
        building: Option<String>,
        floor: Option<String>,
    ) -> Self {
        Self {
            term: normalize(term),
            state: normalize(state),
            city: normalize(city),
            building: normalize(building),
            floor: normalize(floor),
        }
    }

    /// True when at least one map locale filter is present.
    pub fn has_locale_filters(&self) -> bool {
        self.state.is_some()
            || self.city.is_some()
            || self.building.is_some()
            || self.floor.is_some()
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Case-insensitive substring match: `lower(col) LIKE '%term%'`.
fn contains_ci<C: ColumnTrait>(col: C, term: &str) -> SimpleExpr {
    let pattern = format!("%{}%", term.to_lowercase());
    Expr::expr(Func::lower(Expr::col(col))).like(pattern)
}

/// Composes the optional free-text term and locale filters into a single
/// employee query with nested locations and maps.
#[derive(Clone)]
pub struct SearchService {
    db: Arc<DbPool>,
}

impl SearchService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Runs a directory search.
    ///
    /// An employee matches when the free-text term (if any) hits its name,
    /// email, or phone, AND at least one of its locations sits on a map
    /// satisfying ALL supplied locale filters. The locale conjunction must
    /// hold on a single location's map; filters do not distribute across an
    /// employee's different locations.
    #[instrument(skip(self))]
    pub async fn search(&self, filter: &SearchFilter) -> Result<SearchResponse, ServiceError> {
        let db = &*self.db;

        let mut condition = Condition::all();

        if let Some(term) = &filter.term {
            condition = condition.add(
                Condition::any()
                    .add(contains_ci(employee::Column::Name, term))
                    .add(contains_ci(employee::Column::Email, term))
                    .add(employee::Column::Phone.contains(term.as_str())),
            );
        }

        if filter.has_locale_filters() {
            let Some(employee_ids) = self.employee_ids_with_matching_map(filter).await? else {
                return Ok(SearchResponse {
                    results: Vec::new(),
                    count: 0,
                });
            };
            condition = condition.add(employee::Column::Id.is_in(employee_ids));
        }

        let employees = employee::Entity::find()
            .filter(condition)
            .order_by_asc(employee::Column::Name)
            .order_by_asc(employee::Column::CreatedAt)
            .order_by_asc(employee::Column::Id)
            .all(db)
            .await?;

        let results = with_nested_maps(db, employees).await?;
        let count = results.len();

        Ok(SearchResponse { results, count })
    }

    /// Resolves the locale filters to the set of employees having at least
    /// one location on a matching map. Returns `None` when nothing matches,
    /// which short-circuits the whole search to an empty result.
    async fn employee_ids_with_matching_map(
        &self,
        filter: &SearchFilter,
    ) -> Result<Option<Vec<Uuid>>, ServiceError> {
        let db = &*self.db;

        let mut map_condition = Condition::all();
        if let Some(state) = &filter.state {
            map_condition = map_condition.add(contains_ci(map::Column::State, state));
        }
        if let Some(city) = &filter.city {
            map_condition = map_condition.add(contains_ci(map::Column::City, city));
        }
        if let Some(building) = &filter.building {
            map_condition = map_condition.add(contains_ci(map::Column::Building, building));
        }
        if let Some(floor) = &filter.floor {
            map_condition = map_condition.add(contains_ci(map::Column::Floor, floor));
        }

        let map_ids: Vec<Uuid> = map::Entity::find()
            .filter(map_condition)
            .select_only()
            .column(map::Column::Id)
            .into_tuple()
            .all(db)
            .await?;

        if map_ids.is_empty() {
            return Ok(None);
        }

        let employee_ids: Vec<Uuid> = location::Entity::find()
            .filter(location::Column::MapId.is_in(map_ids))
            .select_only()
            .column(location::Column::EmployeeId)
            .distinct()
            .into_tuple()
            .all(db)
            .await?;

        if employee_ids.is_empty() {
            return Ok(None);
        }

        Ok(Some(employee_ids))
    }
}
