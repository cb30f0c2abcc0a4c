//! Builds the bracketed query strings the content API understands.

use reqwest::Url;

use crate::models::ListingType;

pub const DEFAULT_PAGE_SIZE: u32 = 12;

const NEWEST_FIRST: &str = "createdAt:desc";
const LIST_RELATIONS: [&str; 3] = ["category", "location", "images"];

/// Filter selections of the listing page. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilters {
    pub listing_type: Option<ListingType>,
    pub category_id: Option<i32>,
    pub location_id: Option<i32>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_rooms: Option<i32>,
}

impl ListingFilters {
    /// Reads the listing page's URL state. Returns the filters and the
    /// requested page (1 when absent).
    pub fn from_search_params<K, V>(params: &[(K, V)]) -> (Self, u32)
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        fn parsed<T: std::str::FromStr>(value: &str) -> Option<T> {
            let value = value.trim();
            if value.is_empty() {
                None
            } else {
                value.parse().ok()
            }
        }

        let mut filters = ListingFilters::default();
        let mut page = 1;
        for (key, value) in params {
            let value = value.as_ref();
            match key.as_ref() {
                "listingType" => filters.listing_type = parsed(value),
                "categoryId" => filters.category_id = parsed(value),
                "locationId" => filters.location_id = parsed(value),
                "minPrice" => filters.min_price = parsed(value),
                "maxPrice" => filters.max_price = parsed(value),
                "rooms" => filters.min_rooms = parsed(value),
                "page" => page = parsed(value).filter(|p: &u32| *p >= 1).unwrap_or(1),
                _ => {}
            }
        }
        (filters, page)
    }

    /// The inverse of [`ListingFilters::from_search_params`], used for page links.
    pub fn to_search_params(&self, page: u32) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                params.push((key.to_string(), value));
            }
        };
        push("listingType", self.listing_type.map(|t| t.as_str().to_string()));
        push("categoryId", self.category_id.map(|v| v.to_string()));
        push("locationId", self.location_id.map(|v| v.to_string()));
        push("minPrice", self.min_price.map(|v| v.to_string()));
        push("maxPrice", self.max_price.map(|v| v.to_string()));
        push("rooms", self.min_rooms.map(|v| v.to_string()));
        push("page", Some(page.max(1).to_string()));
        params
    }

    fn append_to(&self, query: &mut ListingQuery) {
        if let Some(listing_type) = self.listing_type {
            query.push("filters[listingType][$eq]", listing_type.as_str());
        }
        if let Some(id) = self.category_id {
            query.push("filters[category][id][$eq]", id);
        }
        if let Some(id) = self.location_id {
            query.push("filters[location][id][$eq]", id);
        }
        if let Some(min) = self.min_price {
            query.push("filters[price][$gte]", min);
        }
        if let Some(max) = self.max_price {
            query.push("filters[price][$lte]", max);
        }
        if let Some(rooms) = self.min_rooms {
            query.push("filters[rooms][$gte]", rooms);
        }
    }
}

/// An ordered list of query pairs, kept unencoded until sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pairs: Vec<(String, String)>,
}

impl ListingQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.pairs.push((key.into(), value.to_string()));
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn contains_key_prefix(&self, prefix: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k.starts_with(prefix))
    }

    /// Replaces `pagination[page]` and `pagination[pageSize]`.
    pub fn with_page(mut self, page: u32, page_size: u32) -> Self {
        self.pairs.retain(|(k, _)| !k.starts_with("pagination["));
        self.push("pagination[page]", page.max(1));
        self.push("pagination[pageSize]", page_size.max(1));
        self
    }

    /// Percent-encoded `key=value&...` form.
    pub fn to_query_string(&self) -> String {
        let mut url = match Url::parse("http://localhost/") {
            Ok(url) => url,
            Err(_) => return String::new(),
        };
        url.query_pairs_mut().extend_pairs(self.pairs.iter());
        url.query().unwrap_or_default().to_string()
    }
}

/// One page of the listing grid, newest first.
pub fn build_listing_query(filters: &ListingFilters, page: u32, page_size: u32) -> ListingQuery {
    let mut query = ListingQuery::new();
    filters.append_to(&mut query);
    let mut query = query.with_page(page, page_size);
    query.push("sort[0]", NEWEST_FIRST);
    for (index, relation) in LIST_RELATIONS.iter().enumerate() {
        query.push(format!("populate[{}]", index), relation);
    }
    query
}

/// The same filters with no UI pagination. Callers page through it.
pub fn build_map_query(filters: &ListingFilters) -> ListingQuery {
    let mut query = ListingQuery::new();
    filters.append_to(&mut query);
    query.push("sort[0]", NEWEST_FIRST);
    query
}

/// Largest page the server serves; longer id lists go out in chunks.
pub const FAVORITES_CHUNK_SIZE: usize = 100;

/// Properties by id for the favorites page. `None` for an empty id set,
/// which would otherwise match every listing.
pub fn favorites_query(ids: &[i32]) -> Option<ListingQuery> {
    if ids.is_empty() {
        return None;
    }
    let mut query = ListingQuery::new();
    for (index, id) in ids.iter().enumerate() {
        query.push(format!("filters[id][$in][{}]", index), id);
    }
    let mut query = query.with_page(1, ids.len() as u32);
    query.push("sort[0]", NEWEST_FIRST);
    for (index, relation) in LIST_RELATIONS.iter().enumerate() {
        query.push(format!("populate[{}]", index), relation);
    }
    Some(query)
}

/// Every favorite row of `user_id` with its property populated.
pub fn user_favorites_query(user_id: i32) -> ListingQuery {
    let mut query = ListingQuery::new();
    query.push("filters[user][id][$eq]", user_id);
    query.push("populate", "property");
    query.push("pagination[limit]", -1);
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rent_price_range_page_two() {
        let filters = ListingFilters {
            listing_type: Some(ListingType::Rent),
            min_price: Some(100),
            max_price: Some(500),
            ..Default::default()
        };
        let query = build_listing_query(&filters, 2, DEFAULT_PAGE_SIZE);

        assert_eq!(query.get("filters[listingType][$eq]"), Some("Rent"));
        assert_eq!(query.get("filters[price][$gte]"), Some("100"));
        assert_eq!(query.get("filters[price][$lte]"), Some("500"));
        assert_eq!(query.get("pagination[page]"), Some("2"));
        assert_eq!(query.get("pagination[pageSize]"), Some("12"));
        assert_eq!(query.get("sort[0]"), Some("createdAt:desc"));

        assert!(!query.contains_key_prefix("filters[category]"));
        assert!(!query.contains_key_prefix("filters[location]"));
        assert!(!query.contains_key_prefix("filters[rooms]"));
    }

    #[test]
    fn empty_filters_emit_no_filter_keys() {
        let query = build_listing_query(&ListingFilters::default(), 0, DEFAULT_PAGE_SIZE);
        assert!(!query.contains_key_prefix("filters"));
        assert_eq!(query.get("pagination[page]"), Some("1"));
    }

    #[test]
    fn query_string_encodes_brackets() {
        let mut query = ListingQuery::new();
        query.push("filters[price][$gte]", 100);
        assert_eq!(query.to_query_string(), "filters%5Bprice%5D%5B%24gte%5D=100");
    }

    #[test]
    fn search_params_round_trip_and_skip_blanks() {
        let (filters, page) = ListingFilters::from_search_params(&[
            ("listingType", "Buy"),
            ("categoryId", ""),
            ("minPrice", "abc"),
            ("rooms", "2"),
            ("page", "3"),
        ]);
        assert_eq!(filters.listing_type, Some(ListingType::Buy));
        assert_eq!(filters.category_id, None);
        assert_eq!(filters.min_price, None);
        assert_eq!(filters.min_rooms, Some(2));
        assert_eq!(page, 3);

        let params = filters.to_search_params(4);
        assert_eq!(
            params,
            vec![
                ("listingType".to_string(), "Buy".to_string()),
                ("rooms".to_string(), "2".to_string()),
                ("page".to_string(), "4".to_string()),
            ]
        );
    }

    #[test]
    fn favorites_page_lists_every_id() {
        assert!(favorites_query(&[]).is_none());
        let query = favorites_query(&[5, 9]).unwrap();
        assert_eq!(query.get("filters[id][$in][0]"), Some("5"));
        assert_eq!(query.get("filters[id][$in][1]"), Some("9"));
        assert_eq!(query.get("pagination[pageSize]"), Some("2"));
    }
}
