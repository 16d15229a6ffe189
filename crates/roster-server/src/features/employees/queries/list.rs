use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::cache::Cache;
use crate::features::shared::{PaginationMetadata, PaginationParams};
use crate::models::EmployeeResponse;
use crate::store::{SharedStore, StoreError};

/// List or search employees, one page at a time
///
/// A `search` that is absent or only whitespace lists every employee.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEmployeesQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEmployeesResponse {
    pub items: Vec<EmployeeResponse>,
    pub pagination: PaginationMetadata,
}

#[derive(Debug, thiserror::Error)]
pub enum ListEmployeesError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl Request<Result<ListEmployeesResponse, ListEmployeesError>> for ListEmployeesQuery {}

impl crate::cqrs::middleware::Query for ListEmployeesQuery {}

impl ListEmployeesQuery {
    fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.limit)
    }

    fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

#[tracing::instrument(skip(store, cache))]
pub async fn handle(
    store: SharedStore,
    cache: Cache,
    query: ListEmployeesQuery,
) -> Result<ListEmployeesResponse, ListEmployeesError> {
    let params = query.pagination();
    let (limit, offset) = (params.limit(), params.offset());
    let search = query.search_term();

    let page = match cache.employee_page(limit, offset, search).await {
        Some(page) => page,
        None => {
            let page = match search {
                Some(term) => store.search(term, limit, offset).await?,
                None => store.find_all(limit, offset).await?,
            };
            cache.put_employee_page(limit, offset, search, &page).await;
            page
        },
    };

    Ok(ListEmployeesResponse {
        pagination: PaginationMetadata::from_params(&params, page.total),
        items: page
            .employees
            .into_iter()
            .map(EmployeeResponse::from)
            .collect(),
    })
}
