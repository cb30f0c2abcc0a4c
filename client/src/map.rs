//! Every matching listing with coordinates, for the map view.

use crate::api::{ApiClientError, ContentApi};
use crate::models::Property;
use crate::query::{build_map_query, ListingFilters};
use crate::views::format_price;

pub const MAP_CHUNK_SIZE: u32 = 100;
/// Tashkent.
pub const DEFAULT_CENTER: [f64; 2] = [41.2995, 69.2401];
pub const DEFAULT_ZOOM: u8 = 12;
pub const SINGLE_POINT_ZOOM: u8 = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct Placemark {
    pub id: i32,
    pub document_id: String,
    /// `[latitude, longitude]`
    pub coords: [f64; 2],
    pub popup_content: String,
}

impl Placemark {
    pub fn from_property(property: &Property) -> Option<Self> {
        let coordinates = property.coordinates?;
        Some(Self {
            id: property.id,
            document_id: property.document_id.clone(),
            coords: [coordinates.latitude, coordinates.longitude],
            popup_content: format!("{}<br>{}", property.title, format_price(property.price)),
        })
    }
}

/// Pages through the filtered listing in chunks of [`MAP_CHUNK_SIZE`]
/// until the reported page count is reached.
pub async fn fetch_all_matching<A>(api: &A, filters: &ListingFilters) -> Result<Vec<Property>, ApiClientError>
where
    A: ContentApi + ?Sized,
{
    let base = build_map_query(filters);
    let mut properties = Vec::new();
    let mut page = 1;
    loop {
        let response = api.list_properties(&base.clone().with_page(page, MAP_CHUNK_SIZE)).await?;
        let page_count = response.pagination().page_count;
        let received = response.data.len();
        properties.extend(response.data);
        log::debug!("Map chunk {}/{}: {} properties", page, page_count, received);

        if page >= page_count || received == 0 {
            break;
        }
        page += 1;
    }
    Ok(properties)
}

pub async fn fetch_map_points<A>(api: &A, filters: &ListingFilters) -> Result<Vec<Placemark>, ApiClientError>
where
    A: ContentApi + ?Sized,
{
    let properties = fetch_all_matching(api, filters).await?;
    let points: Vec<Placemark> = properties.iter().filter_map(Placemark::from_property).collect();
    if points.len() < properties.len() {
        log::debug!("{} properties have no coordinates", properties.len() - points.len());
    }
    Ok(points)
}

/// Mean position of `points`, or [`DEFAULT_CENTER`].
pub fn map_center(points: &[Placemark]) -> [f64; 2] {
    if points.is_empty() {
        return DEFAULT_CENTER;
    }
    let count = points.len() as f64;
    let (lat, lon) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lon), point| (lat + point.coords[0], lon + point.coords[1]));
    [lat / count, lon / count]
}

pub fn map_zoom(points: &[Placemark]) -> u8 {
    if points.len() == 1 {
        SINGLE_POINT_ZOOM
    } else {
        DEFAULT_ZOOM
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::testing::{property, FakeContentApi};

    #[tokio::test]
    async fn fetches_every_chunk_until_page_count() {
        let api = FakeContentApi::with_properties((1..=250).map(property).collect());
        let points = fetch_map_points(&api, &ListingFilters::default()).await.unwrap();

        assert_eq!(api.property_lists.load(Ordering::SeqCst), 3);
        assert_eq!(points.len(), 250);
        assert_eq!(points[0].id, 1);
        assert_eq!(points[249].id, 250);
    }

    #[tokio::test]
    async fn no_matches_is_a_single_request() {
        let api = FakeContentApi::with_properties(Vec::new());
        let points = fetch_map_points(&api, &ListingFilters::default()).await.unwrap();
        assert!(points.is_empty());
        assert_eq!(api.property_lists.load(Ordering::SeqCst), 1);
        assert_eq!(map_center(&points), DEFAULT_CENTER);
    }

    #[test]
    fn listings_without_coordinates_are_skipped() {
        let mut unplaced = property(3);
        unplaced.coordinates = None;
        assert!(Placemark::from_property(&unplaced).is_none());

        let placed = Placemark::from_property(&property(2)).unwrap();
        assert_eq!(placed.document_id, "doc-2");
        assert_eq!(placed.popup_content, "Listing 2<br>UZS 2,000");
        assert_eq!(map_zoom(&[placed]), SINGLE_POINT_ZOOM);
    }

    #[test]
    fn center_is_the_mean_position() {
        let points: Vec<Placemark> = [1, 3]
            .into_iter()
            .filter_map(|id| Placemark::from_property(&property(id)))
            .collect();
        let [lat, lon] = map_center(&points);
        assert!((lat - 41.002).abs() < 1e-9);
        assert!((lon - 69.0).abs() < 1e-9);
    }
}
