use super::gallery::ImageGallery;
use super::media::card_image_url;
use super::pagination::PaginationWindow;
use crate::api::{ApiClientError, ContentApi};
use crate::favorites::FavoritesSync;
use crate::map::{Placemark, DEFAULT_CENTER, SINGLE_POINT_ZOOM};
use crate::models::{ListingStatus, ListingType, Property};
use crate::query::{
    build_listing_query, favorites_query, ListingFilters, ListingQuery, DEFAULT_PAGE_SIZE, FAVORITES_CHUNK_SIZE,
};

/// `UZS 1,250,000`
pub fn format_price(price: i64) -> String {
    let digits = price.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if price < 0 { "-" } else { "" };
    format!("{}UZS {}", sign, grouped)
}

/// Link to `page` of the listing with the current filters kept.
pub fn page_href(filters: &ListingFilters, page: u32) -> String {
    let mut query = ListingQuery::new();
    for (key, value) in filters.to_search_params(page) {
        query.push(key, value);
    }
    format!("/?{}", query.to_query_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyCard {
    pub id: i32,
    pub document_id: String,
    pub title: String,
    pub price: String,
    pub listing_type: ListingType,
    pub listing_status: ListingStatus,
    pub area: String,
    pub rooms: Option<i32>,
    pub floor: Option<i32>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub image_url: String,
    pub href: String,
    pub is_favorited: bool,
}

impl PropertyCard {
    pub fn new(property: &Property, public_base: &str, is_favorited: bool) -> Self {
        Self {
            id: property.id,
            document_id: property.document_id.clone(),
            title: property.title.clone(),
            price: format_price(property.price),
            listing_type: property.listing_type,
            listing_status: property.listing_status,
            area: format!("{} sqm", property.area),
            rooms: property.rooms,
            floor: property.floor,
            category: property.category.as_ref().map(|c| c.name.clone()),
            location: property.location.as_ref().map(|l| l.name.clone()),
            image_url: card_image_url(public_base, &property.images),
            href: format!("/properties/{}", property.document_id),
            is_favorited,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDetail {
    pub card: PropertyCard,
    pub description: Option<String>,
    pub address: Option<String>,
    pub amenities: Vec<String>,
    pub gallery: ImageGallery,
    pub placemark: Option<Placemark>,
    pub map_center: [f64; 2],
    pub map_zoom: u8,
}

impl PropertyDetail {
    pub fn new(property: &Property, public_base: &str, is_favorited: bool) -> Self {
        let placemark = Placemark::from_property(property);
        let map_center = placemark.as_ref().map_or(DEFAULT_CENTER, |p| p.coords);
        Self {
            card: PropertyCard::new(property, public_base, is_favorited),
            description: property.description.clone(),
            address: property.address.clone(),
            amenities: property.amenities.iter().map(|a| a.name.clone()).collect(),
            gallery: ImageGallery::new(public_base, &property.images, &property.title),
            placemark,
            map_center,
            map_zoom: SINGLE_POINT_ZOOM,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    pub filters: ListingFilters,
    pub cards: Vec<PropertyCard>,
    pub pagination: PaginationWindow,
}

impl ListingPage {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Fetches one grid page and turns it into cards.
pub async fn fetch_listing_page<A, F>(
    api: &A,
    filters: &ListingFilters,
    page: u32,
    public_base: &str,
    is_favorited: F,
) -> Result<ListingPage, ApiClientError>
where
    A: ContentApi + ?Sized,
    F: Fn(i32) -> bool,
{
    let query = build_listing_query(filters, page, DEFAULT_PAGE_SIZE);
    let response = api.list_properties(&query).await?;
    let pagination = response.pagination();
    let cards = response
        .data
        .iter()
        .map(|property| PropertyCard::new(property, public_base, is_favorited(property.id)))
        .collect();

    Ok(ListingPage {
        filters: filters.clone(),
        cards,
        pagination: PaginationWindow::new(page.max(1), pagination.page_count, pagination.total, DEFAULT_PAGE_SIZE),
    })
}

/// The signed-in user's favorited listings, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesPage {
    pub cards: Vec<PropertyCard>,
}

impl FavoritesPage {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Loads every cached favorite in chunks of [`FAVORITES_CHUNK_SIZE`] ids.
/// An empty cache sends no request.
pub async fn fetch_favorites_page<A, S>(
    api: &A,
    favorites: &FavoritesSync<S>,
    public_base: &str,
) -> Result<FavoritesPage, ApiClientError>
where
    A: ContentApi + ?Sized,
    S: ContentApi,
{
    let ids = favorites.favorite_ids();
    let mut properties: Vec<Property> = Vec::with_capacity(ids.len());

    for chunk in ids.chunks(FAVORITES_CHUNK_SIZE) {
        let Some(base) = favorites_query(chunk) else {
            continue;
        };
        let mut page = 1;
        loop {
            let response = api.list_properties(&base.clone().with_page(page, chunk.len() as u32)).await?;
            let page_count = response.pagination().page_count;
            let received = response.data.len();
            properties.extend(response.data);
            if page >= page_count || received == 0 {
                break;
            }
            page += 1;
        }
    }
    log::debug!("Fetched {} of {} favorited properties", properties.len(), ids.len());

    properties.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Ok(FavoritesPage {
        cards: properties
            .iter()
            .map(|property| PropertyCard::new(property, public_base, true))
            .collect(),
    })
}

/// `None` when the document id is unknown.
pub async fn fetch_property_detail<A>(
    api: &A,
    document_id: &str,
    public_base: &str,
    is_favorited: impl Fn(i32) -> bool,
) -> Result<Option<PropertyDetail>, ApiClientError>
where
    A: ContentApi + ?Sized,
{
    let property = api.get_property(document_id).await?;
    Ok(property.map(|property| PropertyDetail::new(&property, public_base, is_favorited(property.id))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use crate::auth::AuthState;
    use crate::models::NamedRef;
    use crate::testing::{property, session, FakeContentApi};

    #[test]
    fn prices_are_grouped_in_thousands() {
        assert_eq!(format_price(1_250_000), "UZS 1,250,000");
        assert_eq!(format_price(999), "UZS 999");
        assert_eq!(format_price(1_000), "UZS 1,000");
        assert_eq!(format_price(0), "UZS 0");
    }

    #[test]
    fn card_carries_relations_and_detail_link() {
        let mut listing = property(4);
        listing.category = Some(NamedRef {
            id: 1,
            name: "Apartment".to_string(),
        });
        let card = PropertyCard::new(&listing, "http://cms", true);
        assert_eq!(card.href, "/properties/doc-4");
        assert_eq!(card.category.as_deref(), Some("Apartment"));
        assert_eq!(card.price, "UZS 4,000");
        assert_eq!(card.area, "50 sqm");
        assert_eq!(card.image_url, "/placeholder.png");
        assert!(card.is_favorited);
    }

    #[test]
    fn page_links_keep_filters() {
        let filters = ListingFilters {
            listing_type: Some(ListingType::Rent),
            ..Default::default()
        };
        assert_eq!(page_href(&filters, 3), "/?listingType=Rent&page=3");
    }

    #[tokio::test]
    async fn listing_page_marks_favorites() {
        let api = FakeContentApi::with_properties((1..=30).map(property).collect());
        let page = fetch_listing_page(&api, &ListingFilters::default(), 3, "http://cms", |id| id == 26)
            .await
            .unwrap();
        assert_eq!(page.cards.len(), 6);
        assert_eq!(page.pagination.start_item, 25);
        assert_eq!(page.pagination.end_item, 30);
        assert!(!page.pagination.has_next);
        let favorited: Vec<i32> = page.cards.iter().filter(|c| c.is_favorited).map(|c| c.id).collect();
        assert_eq!(favorited, vec![26]);
    }

    #[tokio::test]
    async fn empty_favorites_page_sends_no_request() {
        let api = Arc::new(FakeContentApi::with_properties((1..=5).map(property).collect()));
        let favorites = FavoritesSync::new(api.clone());
        favorites.on_auth_change(AuthState::LoggedIn(session(7))).await;

        let page = fetch_favorites_page(api.as_ref(), &favorites, "http://cms").await.unwrap();
        assert!(page.is_empty());
        assert_eq!(api.property_lists.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn favorites_past_one_server_page_are_all_fetched() {
        let api = Arc::new(FakeContentApi::with_properties((1..=180).map(property).collect()));
        for id in 1..=150 {
            api.seed_favorite(7, id);
        }
        let favorites = FavoritesSync::new(api.clone());
        favorites.on_auth_change(AuthState::LoggedIn(session(7))).await;

        let page = fetch_favorites_page(api.as_ref(), &favorites, "http://cms").await.unwrap();
        assert_eq!(api.property_lists.load(Ordering::SeqCst), 2);
        assert_eq!(page.cards.len(), 150);
        assert_eq!(page.cards[0].id, 150);
        assert_eq!(page.cards[149].id, 1);
        assert!(page.cards.iter().all(|card| card.is_favorited));
    }

    #[tokio::test]
    async fn unknown_detail_is_none() {
        let api = FakeContentApi::with_properties(vec![property(1)]);
        let detail = fetch_property_detail(&api, "doc-1", "http://cms", |_| false).await.unwrap().unwrap();
        assert_eq!(detail.map_center, detail.placemark.unwrap().coords);
        assert!(fetch_property_detail(&api, "nope", "http://cms", |_| false).await.unwrap().is_none());
    }
}
