//! In-memory `ContentApi` with the server's favorite semantics, call
//! counters and failure injection.

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::api::{ApiClientError, ContentApi};
use crate::auth::{AuthSession, AuthUser};
use crate::models::{
    Coordinates, Favorite, ListResponse, ListingStatus, ListingType, Meta, Pagination, Property, Taxonomy,
};
use crate::query::ListingQuery;

pub fn property(id: i32) -> Property {
    let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(i64::from(id));
    Property {
        id,
        document_id: format!("doc-{}", id),
        title: format!("Listing {}", id),
        description: None,
        price: 1_000 * i64::from(id),
        area: 50.0,
        rooms: Some(2),
        floor: None,
        address: None,
        listing_type: ListingType::Rent,
        listing_status: ListingStatus::Available,
        coordinates: Some(Coordinates {
            latitude: 41.0 + f64::from(id) / 1000.0,
            longitude: 69.0,
        }),
        category: None,
        location: None,
        amenities: Vec::new(),
        images: Vec::new(),
        created_at: created,
        updated_at: created,
        published_at: Some(created),
    }
}

pub fn session(user_id: i32) -> AuthSession {
    AuthSession::new(
        AuthUser {
            id: user_id,
            username: format!("user{}", user_id),
            email: format!("user{}@example.com", user_id),
        },
        format!("jwt-{}", user_id),
    )
}

struct Row {
    favorite_id: i32,
    user_id: i32,
    property_id: i32,
}

#[derive(Default)]
struct State {
    properties: Vec<Property>,
    favorites: Vec<Row>,
    next_id: i32,
    fail_lists: bool,
    fail_writes: Option<(u16, String)>,
}

#[derive(Default)]
pub struct FakeContentApi {
    state: Mutex<State>,
    gate: Mutex<Option<Arc<Notify>>>,
    pub property_lists: AtomicUsize,
    pub favorite_lists: AtomicUsize,
    pub writes: AtomicUsize,
}

impl FakeContentApi {
    pub fn with_properties(properties: Vec<Property>) -> Self {
        let api = Self::default();
        api.state.lock().unwrap().properties = properties;
        api
    }

    pub fn fail_favorite_lists(&self) {
        self.state.lock().unwrap().fail_lists = true;
    }

    pub fn fail_writes(&self, status: u16, message: &str) {
        self.state.lock().unwrap().fail_writes = Some((status, message.to_string()));
    }

    /// Makes `list_favorites` wait until [`FakeContentApi::release_favorite_lists`].
    pub fn hold_favorite_lists(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Notify::new()));
    }

    pub fn release_favorite_lists(&self) {
        if let Some(gate) = self.gate.lock().unwrap().as_ref() {
            gate.notify_one();
        }
    }

    /// Server-side favorite property ids of `user_id`.
    pub fn rows_for(&self, user_id: i32) -> Vec<i32> {
        let state = self.state.lock().unwrap();
        state
            .favorites
            .iter()
            .filter(|row| row.user_id == user_id)
            .map(|row| row.property_id)
            .collect()
    }

    pub fn seed_favorite(&self, user_id: i32, property_id: i32) {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let favorite_id = state.next_id;
        state.favorites.push(Row {
            favorite_id,
            user_id,
            property_id,
        });
    }

    fn row_to_favorite(state: &State, row: &Row) -> Favorite {
        let created = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        Favorite {
            id: row.favorite_id,
            document_id: format!("fav-{}", row.favorite_id),
            created_at: created,
            published_at: Some(created),
            property: state.properties.iter().find(|p| p.id == row.property_id).cloned(),
        }
    }

    fn server(status: u16, message: &str) -> ApiClientError {
        ApiClientError::Server {
            status,
            message: message.to_string(),
        }
    }
}

fn page_param(query: &ListingQuery, key: &str, default: u32) -> u32 {
    query.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[async_trait]
impl ContentApi for FakeContentApi {
    async fn list_properties(&self, query: &ListingQuery) -> Result<ListResponse<Property>, ApiClientError> {
        self.property_lists.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        let page = page_param(query, "pagination[page]", 1).max(1);
        let page_size = page_param(query, "pagination[pageSize]", 25).clamp(1, 100);
        let ids: Vec<i32> = query
            .pairs()
            .iter()
            .filter(|(key, _)| key.starts_with("filters[id][$in]"))
            .filter_map(|(_, value)| value.parse().ok())
            .collect();
        let matching: Vec<&Property> = state
            .properties
            .iter()
            .filter(|p| ids.is_empty() || ids.contains(&p.id))
            .collect();
        let total = matching.len();
        let data = matching
            .into_iter()
            .skip(((page - 1) * page_size) as usize)
            .take(page_size as usize)
            .cloned()
            .collect();
        Ok(ListResponse {
            data,
            meta: Meta {
                pagination: Some(Pagination {
                    page,
                    page_size,
                    page_count: (total as u32).div_ceil(page_size),
                    total: total as u64,
                }),
            },
        })
    }

    async fn get_property(&self, document_id: &str) -> Result<Option<Property>, ApiClientError> {
        let state = self.state.lock().unwrap();
        Ok(state.properties.iter().find(|p| p.document_id == document_id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Taxonomy>, ApiClientError> {
        Ok(Vec::new())
    }

    async fn list_locations(&self) -> Result<Vec<Taxonomy>, ApiClientError> {
        Ok(Vec::new())
    }

    async fn list_favorites(&self, session: &AuthSession) -> Result<Vec<Favorite>, ApiClientError> {
        self.favorite_lists.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let state = self.state.lock().unwrap();
        if state.fail_lists {
            return Err(Self::server(500, "Internal Server Error"));
        }
        Ok(state
            .favorites
            .iter()
            .filter(|row| row.user_id == session.user.id)
            .map(|row| Self::row_to_favorite(&state, row))
            .collect())
    }

    async fn create_favorite(&self, session: &AuthSession, property_id: i32) -> Result<Favorite, ApiClientError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if let Some((status, message)) = &state.fail_writes {
            return Err(Self::server(*status, message));
        }
        if property_id <= 0 {
            return Err(Self::server(400, "Missing or invalid \"property\" ID in request body data."));
        }
        if !state.properties.iter().any(|p| p.id == property_id) {
            return Err(Self::server(400, &format!("Property {} does not exist.", property_id)));
        }
        let user_id = session.user.id;
        if let Some(row) = state
            .favorites
            .iter()
            .find(|row| row.user_id == user_id && row.property_id == property_id)
        {
            return Ok(Self::row_to_favorite(&state, row));
        }
        state.next_id += 1;
        let row = Row {
            favorite_id: state.next_id,
            user_id,
            property_id,
        };
        let favorite = Self::row_to_favorite(&state, &row);
        state.favorites.push(row);
        Ok(favorite)
    }

    async fn delete_favorite(&self, session: &AuthSession, property_id: i32) -> Result<Favorite, ApiClientError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if let Some((status, message)) = &state.fail_writes {
            return Err(Self::server(*status, message));
        }
        let position = state
            .favorites
            .iter()
            .position(|row| row.user_id == session.user.id && row.property_id == property_id)
            .ok_or_else(|| Self::server(404, "Favorite not found for this property and user."))?;
        let row = state.favorites.remove(position);
        Ok(Self::row_to_favorite(&state, &row))
    }
}
