use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::error::{blocking, ApiError};
use crate::models::{Property, Taxonomy};
use crate::params::{parse_property_query, QueryPairs};
use crate::response::Envelope;
use crate::AppState;

/// Filtered, paginated listing. `populate` is accepted but relations are
/// always populated.
pub async fn list_properties(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<Envelope<Vec<Property>>>, ApiError> {
    let query = parse_property_query(&pairs)?;
    log::info!("Fetching properties: {:?}", query);
    let store = state.properties.clone();
    let page = blocking(move || Ok(store.list_properties(&query)?)).await?;
    log::info!("Fetched {} of {} properties", page.items.len(), page.total);
    Ok(Envelope::page(page))
}

/// Fetches a specific property by its document id
pub async fn get_property(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<Envelope<Property>>, ApiError> {
    let store = state.properties.clone();
    let lookup = document_id.clone();
    let property = blocking(move || Ok(store.property_by_document_id(&lookup)?)).await?;
    match property {
        Some(property) => Ok(Envelope::json(property)),
        None => {
            log::info!("Property {} not found", document_id);
            Err(ApiError::NotFound("Property not found".to_string()))
        }
    }
}

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Envelope<Vec<Taxonomy>>>, ApiError> {
    let store = state.properties.clone();
    Ok(Envelope::json(blocking(move || Ok(store.list_categories()?)).await?))
}

pub async fn list_locations(State(state): State<AppState>) -> Result<Json<Envelope<Vec<Taxonomy>>>, ApiError> {
    let store = state.properties.clone();
    Ok(Envelope::json(blocking(move || Ok(store.list_locations()?)).await?))
}
