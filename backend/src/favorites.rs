use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Extension, Json,
};

use crate::auth::AuthUser;
use crate::error::{blocking, ApiError};
use crate::models::{Favorite, NewFavorite};
use crate::params::{parse_pagination, QueryPairs};
use crate::response::Envelope;
use crate::store::{FavoriteStore, PropertyStore};
use crate::AppState;

/// Lists the caller's favorites with each property populated.
///
/// A `filters[user]` constraint in the query is ignored: the list is always
/// scoped to the authenticated user.
pub async fn list_favorites(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<Envelope<Vec<Favorite>>>, ApiError> {
    let page = parse_pagination(&pairs)?;
    let favorites = state.favorites.clone();
    let favorites = blocking(move || Ok(favorites.favorites_for_user(user.id, page)?)).await?;
    log::debug!("User {} has {} favorites", user.id, favorites.total);
    Ok(Envelope::page(favorites))
}

/// Favorites a property for the caller. Favoriting twice returns the
/// existing row.
pub async fn create_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> Result<Json<Envelope<Favorite>>, ApiError> {
    let property_id = property_reference(&body)?;
    let properties = state.properties.clone();
    let favorites = state.favorites.clone();
    let favorite =
        blocking(move || ensure_favorite(properties.as_ref(), favorites.as_ref(), user.id, property_id)).await?;
    Ok(Envelope::json(favorite))
}

pub async fn delete_favorite_by_property(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(property_id): Path<String>,
) -> Result<Json<Envelope<Favorite>>, ApiError> {
    let property_id: i32 = property_id
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid propertyId parameter.".to_string()))?;
    let favorites = state.favorites.clone();
    let deleted = blocking(move || remove_favorite(favorites.as_ref(), user.id, property_id)).await?;
    Ok(Envelope::json(deleted))
}

/// Extracts `data.property` from a create body. It must be a positive
/// integer.
fn property_reference(body: &[u8]) -> Result<i32, ApiError> {
    let invalid = || ApiError::BadRequest("Missing or invalid \"property\" ID in request body data.".to_string());
    let payload: serde_json::Value = serde_json::from_slice(body).map_err(|_| invalid())?;
    payload
        .get("data")
        .and_then(|data| data.get("property"))
        .and_then(serde_json::Value::as_i64)
        .filter(|id| *id > 0)
        .and_then(|id| i32::try_from(id).ok())
        .ok_or_else(invalid)
}

fn ensure_favorite(
    properties: &dyn PropertyStore,
    favorites: &dyn FavoriteStore,
    user_id: i32,
    property_id: i32,
) -> Result<Favorite, ApiError> {
    if !properties.property_exists(property_id)? {
        return Err(ApiError::BadRequest(format!("Property {} does not exist.", property_id)));
    }

    // Check-then-create: not atomic, two concurrent requests for one pair can both insert.
    if let Some(existing) = favorites.find_favorite(user_id, property_id)? {
        log::debug!("User {} already favorited property {}", user_id, property_id);
        return Ok(existing);
    }

    let created = favorites.insert_favorite(NewFavorite::published(user_id, property_id))?;
    log::info!("User {} favorited property {}", user_id, property_id);
    Ok(created)
}

fn remove_favorite(favorites: &dyn FavoriteStore, user_id: i32, property_id: i32) -> Result<Favorite, ApiError> {
    let not_found = || ApiError::NotFound("Favorite not found for this property and user.".to_string());
    let favorite = favorites.find_favorite(user_id, property_id)?.ok_or_else(not_found)?;
    let deleted = favorites.delete_favorite(favorite.id)?.ok_or_else(not_found)?;
    log::info!("User {} unfavorited property {}", user_id, property_id);
    Ok(deleted)
}
