use chrono::{Duration, TimeZone, Utc};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::{
    Coordinates, Favorite, ListingStatus, ListingType, NamedRef, NewFavorite, Property, Taxonomy,
};
use crate::store::{FavoriteStore, Page, PageRequest, PropertyQuery, PropertyStore, StoreError};

#[derive(Default)]
struct Catalog {
    properties: Vec<Property>,
    categories: Vec<Taxonomy>,
    locations: Vec<Taxonomy>,
    favorites: Vec<Favorite>,
    next_favorite_id: i32,
}

/// In-process store for tests and `STORE_BACKEND=memory`.
#[derive(Default)]
pub struct MemoryStore {
    catalog: RwLock<Catalog>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(categories: Vec<Taxonomy>, locations: Vec<Taxonomy>, properties: Vec<Property>) -> Self {
        Self {
            catalog: RwLock::new(Catalog {
                properties,
                categories,
                locations,
                favorites: Vec::new(),
                next_favorite_id: 1,
            }),
        }
    }

    /// A small Tashkent catalog for local runs without Postgres.
    pub fn seeded() -> Self {
        let categories = taxonomy(&["Apartment", "House", "Commercial"]);
        let locations = taxonomy(&["Yunusabad", "Chilanzar", "Mirzo Ulugbek"]);
        let base = Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).single().unwrap_or_else(Utc::now);

        let listings = [
            ("Sunny two-room flat near Minor", ListingType::Rent, 4_500_000, 54.0, Some(2), 0, 0, (41.3385, 69.2853)),
            ("Family house with garden", ListingType::Buy, 1_650_000_000, 210.0, Some(5), 1, 2, (41.3308, 69.3340)),
            ("Studio by Chilanzar metro", ListingType::Rent, 3_000_000, 31.0, Some(1), 0, 1, (41.2756, 69.2034)),
            ("Office floor on Amir Temur", ListingType::Rent, 28_000_000, 320.0, None, 2, 0, (41.3111, 69.2797)),
            ("Three-room flat, renovated", ListingType::Buy, 980_000_000, 86.0, Some(3), 0, 2, (41.3254, 69.3381)),
            ("Townhouse in Yunusabad", ListingType::Buy, 2_100_000_000, 240.0, Some(6), 1, 0, (41.3665, 69.2891)),
        ];

        let properties = listings
            .into_iter()
            .enumerate()
            .map(|(index, (title, listing_type, price, area, rooms, category, location, (lat, lon)))| {
                let id = index as i32 + 1;
                let created_at = base + Duration::hours(i64::from(id));
                Property {
                    id,
                    document_id: format!("seed-property-{id}"),
                    title: title.to_string(),
                    description: None,
                    price,
                    area,
                    rooms,
                    floor: None,
                    address: None,
                    listing_type,
                    listing_status: ListingStatus::Available,
                    coordinates: Some(Coordinates { latitude: lat, longitude: lon }),
                    category: Some(named(&categories[category])),
                    location: Some(named(&locations[location])),
                    amenities: Vec::new(),
                    images: Vec::new(),
                    created_at,
                    updated_at: created_at,
                    published_at: Some(created_at),
                }
            })
            .collect();

        Self::with_catalog(categories, locations, properties)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Catalog>, StoreError> {
        self.catalog.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Catalog>, StoreError> {
        self.catalog.write().map_err(|_| StoreError::Poisoned)
    }
}

fn taxonomy(names: &[&str]) -> Vec<Taxonomy> {
    names
        .iter()
        .enumerate()
        .map(|(index, name)| Taxonomy {
            id: index as i32 + 1,
            document_id: format!("seed-{}", name.to_lowercase().replace(' ', "-")),
            name: name.to_string(),
        })
        .collect()
}

fn named(taxonomy: &Taxonomy) -> NamedRef {
    NamedRef {
        id: taxonomy.id,
        name: taxonomy.name.clone(),
    }
}

fn sorted_by_name(mut rows: Vec<Taxonomy>) -> Vec<Taxonomy> {
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}

impl PropertyStore for MemoryStore {
    fn list_properties(&self, query: &PropertyQuery) -> Result<Page<Property>, StoreError> {
        let catalog = self.read()?;
        let mut matching: Vec<Property> = catalog
            .properties
            .iter()
            .filter(|property| query.filter.matches(property))
            .cloned()
            .collect();
        matching.sort_by(|a, b| query.sort.order(a, b));
        Ok(Page::slice(matching, query.page))
    }

    fn property_by_document_id(&self, document_id: &str) -> Result<Option<Property>, StoreError> {
        let catalog = self.read()?;
        Ok(catalog
            .properties
            .iter()
            .find(|property| property.document_id == document_id)
            .cloned())
    }

    fn property_exists(&self, id: i32) -> Result<bool, StoreError> {
        Ok(self.read()?.properties.iter().any(|property| property.id == id))
    }

    fn list_categories(&self) -> Result<Vec<Taxonomy>, StoreError> {
        Ok(sorted_by_name(self.read()?.categories.clone()))
    }

    fn list_locations(&self) -> Result<Vec<Taxonomy>, StoreError> {
        Ok(sorted_by_name(self.read()?.locations.clone()))
    }
}

impl FavoriteStore for MemoryStore {
    fn favorites_for_user(&self, user_id: i32, page: PageRequest) -> Result<Page<Favorite>, StoreError> {
        let catalog = self.read()?;
        let mut rows: Vec<Favorite> = catalog
            .favorites
            .iter()
            .filter(|favorite| favorite.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(Page::slice(rows, page).map(|favorite| {
            let property = catalog
                .properties
                .iter()
                .find(|property| property.id == favorite.property_id)
                .cloned();
            favorite.with_property(property)
        }))
    }

    fn find_favorite(&self, user_id: i32, property_id: i32) -> Result<Option<Favorite>, StoreError> {
        Ok(self
            .read()?
            .favorites
            .iter()
            .find(|favorite| favorite.user_id == user_id && favorite.property_id == property_id)
            .cloned())
    }

    fn insert_favorite(&self, new: NewFavorite) -> Result<Favorite, StoreError> {
        let mut catalog = self.write()?;
        catalog.next_favorite_id = catalog.next_favorite_id.max(1);
        let favorite = Favorite {
            id: catalog.next_favorite_id,
            document_id: new.document_id,
            user_id: new.user_id,
            property_id: new.property_id,
            created_at: new.created_at,
            updated_at: new.updated_at,
            published_at: new.published_at,
            property: None,
        };
        catalog.next_favorite_id += 1;
        catalog.favorites.push(favorite.clone());
        Ok(favorite)
    }

    fn delete_favorite(&self, favorite_id: i32) -> Result<Option<Favorite>, StoreError> {
        let mut catalog = self.write()?;
        let position = catalog.favorites.iter().position(|favorite| favorite.id == favorite_id);
        Ok(position.map(|index| catalog.favorites.remove(index)))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn property(id: i32, listing_type: ListingType, price: i64, rooms: Option<i32>) -> Property {
        let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(i64::from(id));
        Property {
            id,
            document_id: format!("doc-{id}"),
            title: format!("Listing {id}"),
            description: Some("Bright and quiet".to_string()),
            price,
            area: 50.0,
            rooms,
            floor: Some(3),
            address: None,
            listing_type,
            listing_status: ListingStatus::Available,
            coordinates: Some(Coordinates { latitude: 41.3, longitude: 69.24 }),
            category: Some(NamedRef { id: 1, name: "Apartment".to_string() }),
            location: Some(NamedRef { id: (id % 2) + 1, name: "District".to_string() }),
            amenities: Vec::new(),
            images: Vec::new(),
            created_at,
            updated_at: created_at,
            published_at: Some(created_at),
        }
    }

    pub fn store_with(properties: Vec<Property>) -> MemoryStore {
        MemoryStore::with_catalog(taxonomy(&["Apartment", "House"]), taxonomy(&["North", "South"]), properties)
    }
}
