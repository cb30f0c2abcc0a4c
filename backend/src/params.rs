//! Bracketed query-string grammar shared by the list endpoints:
//! `filters[field][$op]=v`, `pagination[page]=n`, `sort[0]=field:dir`.

use std::str::FromStr;

use crate::error::ApiError;
use crate::store::{PageRequest, PropertyFilter, PropertyQuery, PropertySort, DEFAULT_PAGE_SIZE};

pub type QueryPairs = Vec<(String, String)>;

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid value '{}' for '{}'", value, key)))
}

/// `pagination[page]`, `pagination[pageSize]` and `pagination[limit]`
/// (`-1` meaning unbounded).
pub fn parse_pagination(pairs: &[(String, String)]) -> Result<PageRequest, ApiError> {
    let mut page = 1u32;
    let mut page_size = DEFAULT_PAGE_SIZE;
    let mut unbounded = false;

    for (key, value) in pairs {
        match key.as_str() {
            "pagination[page]" => page = parse_value(key, value)?,
            "pagination[pageSize]" => page_size = parse_value(key, value)?,
            "pagination[limit]" => {
                let limit: i64 = parse_value(key, value)?;
                if limit < 0 {
                    unbounded = true;
                } else {
                    page_size = u32::try_from(limit)
                        .map_err(|_| ApiError::BadRequest(format!("Invalid value '{}' for '{}'", value, key)))?;
                }
            }
            _ => {}
        }
    }

    if unbounded {
        return Ok(PageRequest::unbounded());
    }
    if page == 0 {
        return Err(ApiError::BadRequest("pagination[page] must be at least 1".to_string()));
    }
    if page_size == 0 {
        return Err(ApiError::BadRequest("pagination[pageSize] must be at least 1".to_string()));
    }
    Ok(PageRequest::new(page, page_size))
}

pub fn parse_property_query(pairs: &[(String, String)]) -> Result<PropertyQuery, ApiError> {
    let mut filter = PropertyFilter::default();
    let mut sort = None;

    for (key, value) in pairs {
        if value.is_empty() {
            continue;
        }
        match key.as_str() {
            "filters[listingType][$eq]" => {
                filter.listing_type = Some(
                    value
                        .parse()
                        .map_err(|_| ApiError::BadRequest(format!("Unknown listing type '{}'", value)))?,
                )
            }
            "filters[category][id][$eq]" => filter.category_id = Some(parse_value(key, value)?),
            "filters[location][id][$eq]" => filter.location_id = Some(parse_value(key, value)?),
            "filters[price][$gte]" => filter.min_price = Some(parse_value(key, value)?),
            "filters[price][$lte]" => filter.max_price = Some(parse_value(key, value)?),
            "filters[rooms][$gte]" => filter.min_rooms = Some(parse_value(key, value)?),
            "sort" => sort = Some(parse_sort(value)?),
            _ if key.starts_with("filters[id][$in]") => {
                filter.ids.get_or_insert_with(Vec::new).push(parse_value(key, value)?)
            }
            _ if key.starts_with("sort[") => {
                // Only the first sort key is honoured.
                if sort.is_none() {
                    sort = Some(parse_sort(value)?);
                }
            }
            _ => {}
        }
    }

    Ok(PropertyQuery {
        filter,
        sort: sort.unwrap_or_default(),
        page: parse_pagination(pairs)?,
    })
}

fn parse_sort(value: &str) -> Result<PropertySort, ApiError> {
    let first = value.split(',').next().unwrap_or(value).trim();
    PropertySort::parse(first).ok_or_else(|| ApiError::BadRequest(format!("Unsupported sort '{}'", value)))
}
