use super::media::{detail_image_url, PLACEHOLDER_IMAGE};
use crate::models::Media;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    pub url: String,
    pub alt: String,
}

/// Detail-page image carousel. Navigation wraps at both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageGallery {
    images: Vec<GalleryImage>,
    index: usize,
}

impl ImageGallery {
    pub fn new(public_base: &str, media: &[Media], title: &str) -> Self {
        let images = media
            .iter()
            .map(|image| GalleryImage {
                url: detail_image_url(public_base, image),
                alt: image
                    .alternative_text
                    .clone()
                    .filter(|alt| !alt.is_empty())
                    .unwrap_or_else(|| title.to_string()),
            })
            .collect();
        Self { images, index: 0 }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn images(&self) -> &[GalleryImage] {
        &self.images
    }

    /// The shown image, or the placeholder for a listing without photos.
    pub fn current(&self) -> GalleryImage {
        self.images.get(self.index).cloned().unwrap_or_else(|| GalleryImage {
            url: PLACEHOLDER_IMAGE.to_string(),
            alt: String::new(),
        })
    }

    pub fn next(&mut self) {
        if !self.images.is_empty() {
            self.index = (self.index + 1) % self.images.len();
        }
    }

    pub fn previous(&mut self) {
        if !self.images.is_empty() {
            self.index = (self.index + self.images.len() - 1) % self.images.len();
        }
    }

    /// Out-of-range thumbnails are ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.images.len() {
            self.index = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(id: i32, alt: Option<&str>) -> Media {
        Media {
            id,
            name: format!("{}.jpg", id),
            alternative_text: alt.map(str::to_string),
            url: format!("/uploads/{}.jpg", id),
            formats: None,
        }
    }

    #[test]
    fn navigation_wraps_both_ways() {
        let mut gallery = ImageGallery::new("http://cms", &[media(1, None), media(2, None), media(3, None)], "Flat");
        gallery.previous();
        assert_eq!(gallery.index(), 2);
        gallery.next();
        assert_eq!(gallery.index(), 0);
        gallery.select(7);
        assert_eq!(gallery.index(), 0);
        gallery.select(1);
        assert_eq!(gallery.current().url, "http://cms/uploads/2.jpg");
    }

    #[test]
    fn alt_text_falls_back_to_title() {
        let gallery = ImageGallery::new("http://cms", &[media(1, Some("Kitchen")), media(2, Some(""))], "Flat");
        assert_eq!(gallery.images()[0].alt, "Kitchen");
        assert_eq!(gallery.images()[1].alt, "Flat");
    }

    #[test]
    fn empty_gallery_shows_the_placeholder() {
        let mut gallery = ImageGallery::new("http://cms", &[], "Flat");
        gallery.next();
        assert!(gallery.is_empty());
        assert_eq!(gallery.current().url, PLACEHOLDER_IMAGE);
    }
}
