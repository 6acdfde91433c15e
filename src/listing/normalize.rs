//! Turning server places into display places
//!
//! Resolves amenity names, picks an image reference and computes the rating
//! shown on a card, according to the listing configuration.

use crate::data::{average_rating, DisplayPlace, Place, Rating, Review};

use super::amenities::AmenityCache;
use super::config::{ImageStrategy, ListingConfig, RatingStrategy};

/// Directory derived image paths live under
const IMAGE_DIR: &str = "/static/images";

/// Image used when a title has no entry in the lookup table
const DEFAULT_IMAGE: &str = "default_place.jpg";

/// Known listing titles and their bundled artwork
static TITLE_IMAGES: [(&str, &str); 4] = [
    ("Dragon's Rest Tavern", "place1.jpeg"),
    ("Cozy Woodland Cabin", "place2.jpeg"),
    ("Ethereal Fae Retreat", "place3.jpeg"),
    ("Royal Castle Quarters", "place4.jpeg"),
];

/// Path of the bundled image for a title, or the default image
pub fn derived_image(title: &str) -> String {
    let file = TITLE_IMAGES
        .iter()
        .find(|(t, _)| *t == title)
        .map(|(_, file)| *file)
        .unwrap_or(DEFAULT_IMAGE);
    format!("{}/{}", IMAGE_DIR, file)
}

/// Picks the image reference for a place
///
/// `ServerFirst` uses the server value when it is a non-empty string.
pub fn resolve_image(place: &Place, strategy: ImageStrategy) -> String {
    match (strategy, place.image.as_deref()) {
        (ImageStrategy::ServerFirst, Some(url)) if !url.trim().is_empty() => url.to_string(),
        _ => derived_image(&place.title),
    }
}

/// Computes the display rating
///
/// `reviews` is `None` when no review list was loaded for the place.
pub fn resolve_rating(
    reviews: Option<&[Review]>,
    strategy: RatingStrategy,
    default_rating: f64,
) -> Rating {
    match strategy {
        RatingStrategy::Reviews => match reviews {
            Some(reviews) => average_rating(reviews),
            None => Rating::Score(default_rating),
        },
        RatingStrategy::Fixed => Rating::Score(default_rating),
        RatingStrategy::Unrated => Rating::New,
    }
}

/// Builds the display form of a place
pub fn to_display(
    place: &Place,
    amenities: &AmenityCache,
    reviews: Option<&[Review]>,
    config: &ListingConfig,
) -> DisplayPlace {
    DisplayPlace {
        id: place.id.clone(),
        title: place.title.clone(),
        description: place.description.clone(),
        price: place.price.max(0.0),
        amenities: amenities.resolve(&place.amenities),
        owner_id: place.owner_id.clone(),
        latitude: place.latitude,
        longitude: place.longitude,
        rating: resolve_rating(reviews, config.rating_strategy, config.default_rating),
        image: resolve_image(place, config.image_strategy),
    }
}
