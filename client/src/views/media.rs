use crate::models::Media;

pub const PLACEHOLDER_IMAGE: &str = "/placeholder.png";

/// Absolute URLs pass through; uploads stored as a path are served from
/// the public API base.
pub fn resolve_media_url(public_base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("{}{}", public_base.trim_end_matches('/'), url)
    }
}

/// First image at card size: `small`, falling back to the original.
pub fn card_image_url(public_base: &str, images: &[Media]) -> String {
    match images.first() {
        Some(image) => {
            let small = image.formats.as_ref().and_then(|f| f.small.as_ref());
            resolve_media_url(public_base, small.map_or(image.url.as_str(), |f| f.url.as_str()))
        }
        None => PLACEHOLDER_IMAGE.to_string(),
    }
}

/// `medium`, then `small`, then `thumbnail`, then the original.
pub fn detail_image_url(public_base: &str, image: &Media) -> String {
    let url = image
        .formats
        .as_ref()
        .and_then(|f| f.medium.as_ref().or(f.small.as_ref()).or(f.thumbnail.as_ref()))
        .map_or(image.url.as_str(), |f| f.url.as_str());
    resolve_media_url(public_base, url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaFormat, MediaFormats};

    fn media(url: &str, small: Option<&str>, thumbnail: Option<&str>) -> Media {
        let format = |url: &str| MediaFormat { url: url.to_string() };
        Media {
            id: 1,
            name: "front.jpg".to_string(),
            alternative_text: None,
            url: url.to_string(),
            formats: Some(MediaFormats {
                small: small.map(format),
                thumbnail: thumbnail.map(format),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn card_prefers_small_and_prefixes_the_base() {
        let images = vec![media("/uploads/front.jpg", Some("/uploads/small_front.jpg"), None)];
        assert_eq!(
            card_image_url("http://localhost:1337", &images),
            "http://localhost:1337/uploads/small_front.jpg"
        );
    }

    #[test]
    fn detail_falls_back_to_thumbnail_then_original() {
        let image = media("/uploads/front.jpg", None, Some("/uploads/thumb.jpg"));
        assert_eq!(detail_image_url("http://cms", &image), "http://cms/uploads/thumb.jpg");

        let bare = Media { formats: None, ..image };
        assert_eq!(detail_image_url("http://cms", &bare), "http://cms/uploads/front.jpg");
    }

    #[test]
    fn absolute_urls_and_missing_images() {
        let images = vec![media("https://cdn.example.com/a.jpg", None, None)];
        assert_eq!(card_image_url("http://cms", &images), "https://cdn.example.com/a.jpg");
        assert_eq!(card_image_url("http://cms", &[]), PLACEHOLDER_IMAGE);
    }
}
