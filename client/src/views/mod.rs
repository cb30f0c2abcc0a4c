//! Data the presentation layer renders. Nothing here produces markup.

mod gallery;
mod listing;
mod media;
mod pagination;

pub use gallery::{GalleryImage, ImageGallery};
pub use listing::{
    fetch_favorites_page, fetch_listing_page, fetch_property_detail, format_price, page_href, FavoritesPage, ListingPage,
    PropertyCard, PropertyDetail,
};
pub use media::{card_image_url, detail_image_url, resolve_media_url, PLACEHOLDER_IMAGE};
pub use pagination::{PageLink, PaginationWindow};
