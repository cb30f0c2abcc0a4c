//! Wire types of the content API as the client reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingType {
    Buy,
    Rent,
}

impl ListingType {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingType::Buy => "Buy",
            ListingType::Rent => "Rent",
        }
    }
}

impl FromStr for ListingType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Buy" => Ok(ListingType::Buy),
            "Rent" => Ok(ListingType::Rent),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingStatus {
    Available,
    Sold,
    Rented,
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ListingStatus::Available => "Available",
            ListingStatus::Sold => "Sold",
            ListingStatus::Rented => "Rented",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedRef {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taxonomy {
    pub id: i32,
    pub document_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MediaFormat {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MediaFormats {
    pub thumbnail: Option<MediaFormat>,
    pub small: Option<MediaFormat>,
    pub medium: Option<MediaFormat>,
    pub large: Option<MediaFormat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub alternative_text: Option<String>,
    pub url: String,
    #[serde(default)]
    pub formats: Option<MediaFormats>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i32,
    pub document_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: i64,
    pub area: f64,
    #[serde(default)]
    pub rooms: Option<i32>,
    #[serde(default)]
    pub floor: Option<i32>,
    #[serde(default)]
    pub address: Option<String>,
    pub listing_type: ListingType,
    pub listing_status: ListingStatus,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub category: Option<NamedRef>,
    #[serde(default)]
    pub location: Option<NamedRef>,
    #[serde(default)]
    pub amenities: Vec<NamedRef>,
    #[serde(default)]
    pub images: Vec<Media>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// A favorite row. `property` is present only when populated.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: i32,
    pub document_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub property: Option<Property>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Meta,
}

impl<T> ListResponse<T> {
    /// Reported pagination, or a single page covering `data` when the
    /// server sent none.
    pub fn pagination(&self) -> Pagination {
        self.meta.pagination.unwrap_or(Pagination {
            page: 1,
            page_size: self.data.len() as u32,
            page_count: u32::from(!self.data.is_empty()),
            total: self.data.len() as u64,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SingleResponse<T> {
    pub data: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    #[serde(default)]
    pub name: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn property_reads_with_missing_relations() {
        let property: Property = serde_json::from_value(json!({
            "id": 3,
            "documentId": "abc",
            "title": "Flat",
            "price": 1250000,
            "area": 54.5,
            "listingType": "Rent",
            "listingStatus": "Available",
            "createdAt": "2025-04-20T10:00:00Z",
            "updatedAt": "2025-04-20T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(property.listing_type, ListingType::Rent);
        assert!(property.images.is_empty());
        assert!(property.category.is_none());
    }

    #[test]
    fn missing_pagination_covers_the_data() {
        let response: ListResponse<NamedRef> =
            serde_json::from_value(json!({"data": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]})).unwrap();
        assert_eq!(response.pagination().page_count, 1);
        assert_eq!(response.pagination().total, 2);
    }
}
