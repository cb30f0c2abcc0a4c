use chrono::{DateTime, Utc};
use diesel::prelude::*;
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
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Buy" => Ok(ListingType::Buy),
            "Rent" => Ok(ListingType::Rent),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingStatus {
    Available,
    Sold,
    Rented,
}

impl ListingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingStatus::Available => "Available",
            ListingStatus::Sold => "Sold",
            ListingStatus::Rented => "Rented",
        }
    }
}

impl FromStr for ListingStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(ListingStatus::Available),
            "Sold" => Ok(ListingStatus::Sold),
            "Rented" => Ok(ListingStatus::Rented),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A populated `{id, name}` relation (category, location, amenity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: i32,
    pub name: String,
}

/// Category and location rows as served by their list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taxonomy {
    pub id: i32,
    pub document_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFormat {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFormats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<MediaFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small: Option<MediaFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<MediaFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large: Option<MediaFormat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: i32,
    pub name: String,
    pub alternative_text: Option<String>,
    pub url: String,
    pub formats: MediaFormats,
}

/// A listing with every relation populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i32,
    pub document_id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub area: f64,
    pub rooms: Option<i32>,
    pub floor: Option<i32>,
    pub address: Option<String>,
    pub listing_type: ListingType,
    pub listing_status: ListingStatus,
    pub coordinates: Option<Coordinates>,
    pub category: Option<NamedRef>,
    pub location: Option<NamedRef>,
    pub amenities: Vec<NamedRef>,
    pub images: Vec<Media>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

/// A user's bookmark of a property.
///
/// `user_id` and the raw `property_id` never leave the server; `property`
/// is only serialized when the caller asked for it to be populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: i32,
    pub document_id: String,
    #[serde(skip_serializing)]
    pub user_id: i32,
    #[serde(skip_serializing)]
    pub property_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<Property>,
}

impl Favorite {
    pub fn with_property(mut self, property: Option<Property>) -> Self {
        self.property = property;
        self
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::favorites)]
pub struct NewFavorite {
    pub document_id: String,
    pub user_id: i32,
    pub property_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl NewFavorite {
    /// A favorite stamped with the acting user and published immediately.
    pub fn published(user_id: i32, property_id: i32) -> Self {
        let now = Utc::now();
        Self {
            document_id: uuid::Uuid::new_v4().simple().to_string(),
            user_id,
            property_id,
            created_at: now,
            updated_at: now,
            published_at: Some(now),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::favorites)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FavoriteRow {
    pub id: i32,                              // Int4
    pub document_id: String,                  // Varchar
    pub user_id: i32,                         // Int4
    pub property_id: i32,                     // Int4
    pub created_at: DateTime<Utc>,            // Timestamptz
    pub updated_at: DateTime<Utc>,            // Timestamptz
    pub published_at: Option<DateTime<Utc>>,  // Nullable<Timestamptz>
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Self {
            id: row.id,
            document_id: row.document_id,
            user_id: row.user_id,
            property_id: row.property_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            published_at: row.published_at,
            property: None,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::properties)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PropertyRow {
    pub id: i32,                              // Int4
    pub document_id: String,                  // Varchar
    pub title: String,                        // Varchar
    pub description: Option<String>,          // Nullable<Text>
    pub price: i64,                           // Int8
    pub area: f64,                            // Float8
    pub rooms: Option<i32>,                   // Nullable<Int4>
    pub floor: Option<i32>,                   // Nullable<Int4>
    pub address: Option<String>,              // Nullable<Varchar>
    pub listing_type: String,                 // Varchar
    pub listing_status: String,               // Varchar
    pub latitude: Option<f64>,                // Nullable<Float8>
    pub longitude: Option<f64>,               // Nullable<Float8>
    pub category_id: Option<i32>,             // Nullable<Int4>
    pub location_id: Option<i32>,             // Nullable<Int4>
    pub created_at: DateTime<Utc>,            // Timestamptz
    pub updated_at: DateTime<Utc>,            // Timestamptz
    pub published_at: Option<DateTime<Utc>>,  // Nullable<Timestamptz>
}

impl PropertyRow {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::property_images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ImageRow {
    pub id: i32,
    pub property_id: i32,
    pub name: String,
    pub alternative_text: Option<String>,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub small_url: Option<String>,
    pub medium_url: Option<String>,
    pub large_url: Option<String>,
}

impl From<ImageRow> for Media {
    fn from(row: ImageRow) -> Self {
        let format = |url: Option<String>| url.map(|url| MediaFormat { url });
        Self {
            id: row.id,
            name: row.name,
            alternative_text: row.alternative_text,
            url: row.url,
            formats: MediaFormats {
                thumbnail: format(row.thumbnail_url),
                small: format(row.small_url),
                medium: format(row.medium_url),
                large: format(row.large_url),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn favorite_output_hides_owner_and_unpopulated_property() {
        let favorite = Favorite::from(FavoriteRow {
            id: 7,
            document_id: "fav7".to_string(),
            user_id: 3,
            property_id: 11,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            published_at: None,
        });
        let json = serde_json::to_value(&favorite).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["documentId"], "fav7");
        assert!(json.get("userId").is_none());
        assert!(json.get("propertyId").is_none());
        assert!(json.get("property").is_none());
    }

    #[test]
    fn listing_type_round_trips_through_wire_names() {
        assert_eq!("Rent".parse::<ListingType>(), Ok(ListingType::Rent));
        assert_eq!(ListingType::Buy.as_str(), "Buy");
        assert!("rent".parse::<ListingType>().is_err());
        assert_eq!("Sold".parse::<ListingStatus>(), Ok(ListingStatus::Sold));
    }

    #[test]
    fn coordinates_need_both_axes() {
        let mut row = PropertyRow {
            id: 1,
            document_id: "p1".to_string(),
            title: "Flat".to_string(),
            description: None,
            price: 100,
            area: 40.0,
            rooms: None,
            floor: None,
            address: None,
            listing_type: "Buy".to_string(),
            listing_status: "Available".to_string(),
            latitude: Some(41.3),
            longitude: None,
            category_id: None,
            location_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            published_at: None,
        };
        assert_eq!(row.coordinates(), None);
        row.longitude = Some(69.2);
        assert_eq!(
            row.coordinates(),
            Some(Coordinates { latitude: 41.3, longitude: 69.2 })
        );
    }
}
