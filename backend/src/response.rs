use axum::Json;
use serde::Serialize;

use crate::store::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u64,
}

#[derive(Debug, Default, Serialize)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Success body: `{ "data": ..., "meta": {...} }`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    pub meta: Meta,
}

impl<T: Serialize> Envelope<T> {
    pub fn json(data: T) -> Json<Self> {
        Json(Self {
            data,
            meta: Meta::default(),
        })
    }
}

impl<T: Serialize> Envelope<Vec<T>> {
    pub fn page(page: Page<T>) -> Json<Self> {
        let pagination = Pagination {
            page: page.page,
            page_size: page.page_size,
            page_count: page.page_count,
            total: page.total,
        };
        Json(Self {
            data: page.items,
            meta: Meta {
                pagination: Some(pagination),
            },
        })
    }
}
