//! Repository seams for listings and favorites.
//!
//! Handlers only see the [`PropertyStore`] and [`FavoriteStore`] traits;
//! `AppState` carries whichever implementation `main` picked. Both traits
//! are synchronous and are driven from `spawn_blocking`.

use thiserror::Error;

use crate::models::{Favorite, ListingType, NewFavorite, Property, Taxonomy};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    #[error("Store lock poisoned")]
    Poisoned,
}

pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Limited(u32),
    Unbounded,
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: PageSize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: page.max(1),
            size: PageSize::Limited(size.clamp(1, MAX_PAGE_SIZE)),
        }
    }

    pub fn unbounded() -> Self {
        Self {
            page: 1,
            size: PageSize::Unbounded,
        }
    }

    /// `(offset, limit)`; `limit` is `None` for an unbounded page.
    pub fn window(&self) -> (u64, Option<u64>) {
        match self.size {
            PageSize::Limited(size) => (u64::from(self.page - 1) * u64::from(size), Some(u64::from(size))),
            PageSize::Unbounded => (0, None),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        let (page_size, page_count) = match request.size {
            PageSize::Limited(size) => (size, total.div_ceil(u64::from(size)) as u32),
            PageSize::Unbounded => (total as u32, u32::from(total > 0)),
        };
        Self {
            items,
            page: request.page,
            page_size,
            page_count,
            total,
        }
    }

    /// Cuts one page out of the full, already ordered result set.
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let (offset, limit) = request.window();
        let items = all
            .into_iter()
            .skip(offset as usize)
            .take(limit.map_or(usize::MAX, |limit| limit as usize))
            .collect();
        Self::new(items, request, total)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            page_count: self.page_count,
            total: self.total,
        }
    }
}

/// Listing constraints; `None` applies no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFilter {
    pub listing_type: Option<ListingType>,
    pub category_id: Option<i32>,
    pub location_id: Option<i32>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_rooms: Option<i32>,
    pub ids: Option<Vec<i32>>,
}

impl PropertyFilter {
    pub fn matches(&self, property: &Property) -> bool {
        if self.listing_type.is_some_and(|t| t != property.listing_type) {
            return false;
        }
        if let Some(category_id) = self.category_id {
            if property.category.as_ref().map(|c| c.id) != Some(category_id) {
                return false;
            }
        }
        if let Some(location_id) = self.location_id {
            if property.location.as_ref().map(|l| l.id) != Some(location_id) {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| property.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| property.price > max) {
            return false;
        }
        if let Some(min_rooms) = self.min_rooms {
            if !property.rooms.is_some_and(|rooms| rooms >= min_rooms) {
                return false;
            }
        }
        if let Some(ids) = &self.ids {
            if !ids.contains(&property.id) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PropertySort {
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
    PriceAsc,
    PriceDesc,
}

impl PropertySort {
    /// Parses the `field:direction` form used by `sort` query params.
    pub fn parse(value: &str) -> Option<Self> {
        let (field, direction) = value.split_once(':').unwrap_or((value, "asc"));
        match (field, direction.to_ascii_lowercase().as_str()) {
            ("createdAt", "desc") => Some(PropertySort::CreatedAtDesc),
            ("createdAt", "asc") => Some(PropertySort::CreatedAtAsc),
            ("price", "asc") => Some(PropertySort::PriceAsc),
            ("price", "desc") => Some(PropertySort::PriceDesc),
            _ => None,
        }
    }

    pub fn order(self, a: &Property, b: &Property) -> std::cmp::Ordering {
        match self {
            PropertySort::CreatedAtDesc => b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)),
            PropertySort::CreatedAtAsc => a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)),
            PropertySort::PriceAsc => a.price.cmp(&b.price).then(a.id.cmp(&b.id)),
            PropertySort::PriceDesc => b.price.cmp(&a.price).then(b.id.cmp(&a.id)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyQuery {
    pub filter: PropertyFilter,
    pub sort: PropertySort,
    pub page: PageRequest,
}

pub trait PropertyStore: Send + Sync {
    /// Filtered, sorted page of properties with relations populated.
    fn list_properties(&self, query: &PropertyQuery) -> Result<Page<Property>, StoreError>;

    fn property_by_document_id(&self, document_id: &str) -> Result<Option<Property>, StoreError>;

    fn property_exists(&self, id: i32) -> Result<bool, StoreError>;

    fn list_categories(&self) -> Result<Vec<Taxonomy>, StoreError>;

    fn list_locations(&self) -> Result<Vec<Taxonomy>, StoreError>;
}

pub trait FavoriteStore: Send + Sync {
    /// The user's favorites, newest first, each with its property populated.
    fn favorites_for_user(&self, user_id: i32, page: PageRequest) -> Result<Page<Favorite>, StoreError>;

    fn find_favorite(&self, user_id: i32, property_id: i32) -> Result<Option<Favorite>, StoreError>;

    fn insert_favorite(&self, favorite: NewFavorite) -> Result<Favorite, StoreError>;

    /// Deletes by the favorite's own id and returns the removed row.
    fn delete_favorite(&self, favorite_id: i32) -> Result<Option<Favorite>, StoreError>;
}
