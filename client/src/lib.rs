//! Client side of the listings service: the typed content API, the
//! listing and map queries, the favorites cache and the view models the
//! presentation layer renders.

pub mod api;
pub mod auth;
pub mod config;
pub mod favorites;
pub mod map;
pub mod models;
pub mod query;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiClientError, ContentApi, HttpContentApi};
pub use auth::{AuthSession, AuthState, AuthUser};
pub use crate::config::ClientConfig;
pub use favorites::{CacheState, FavoritesSync, SyncError};
pub use query::{build_listing_query, ListingFilters, ListingQuery, DEFAULT_PAGE_SIZE};
