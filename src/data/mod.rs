//! Core data models for Placeboard
//!
//! This module contains the records returned by the listings API (places,
//! amenities, reviews, users) and the display types derived from them.

pub mod api;
pub mod fallback;

pub use fallback::{fallback_places, is_fallback_id};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A bookable listing as returned by the API
///
/// Records are read-only for this client. `amenities` holds amenity ids in the
/// server form; the fallback dataset stores display names there instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Stable identifier, used for navigation
    pub id: String,
    /// Display name
    pub title: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Price per night in gold
    pub price: f64,
    /// Amenity identifiers (or names for fallback data)
    #[serde(default)]
    pub amenities: Vec<String>,
    /// Identifier of the hosting user
    #[serde(default)]
    pub owner_id: Option<String>,
    /// Latitude coordinate
    #[serde(default)]
    pub latitude: f64,
    /// Longitude coordinate
    #[serde(default)]
    pub longitude: f64,
    /// Server-supplied image URL, if any
    #[serde(default)]
    pub image: Option<String>,
}

/// An amenity record from `/api/v3/amenities/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amenity {
    pub id: String,
    pub name: String,
}

/// Name of the user who wrote a review, when the server embeds it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewAuthor {
    pub first_name: String,
    pub last_name: String,
}

/// A review attached to one place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub text: String,
    /// Star rating, 1 to 5
    pub rating: u8,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub user: Option<ReviewAuthor>,
}

impl Review {
    /// Name shown above the review text
    pub fn author_name(&self) -> String {
        match &self.user {
            Some(author) => format!("{} {}", author.first_name, author.last_name),
            None => "Anonymous".to_string(),
        }
    }

    /// Rating as filled and empty stars, e.g. `★★★★☆`
    pub fn stars(&self) -> String {
        let filled = self.rating.min(5) as usize;
        format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
    }
}

/// An authenticated user as returned by the session endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Public profile of a place owner
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PublicUser {
    pub first_name: String,
    pub last_name: String,
}

/// Display rating of a place
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Rating {
    /// A numeric rating between 1 and 5
    Score(f64),
    /// No rating available yet
    New,
}

impl Rating {
    /// Numeric value, if rated
    pub fn value(&self) -> Option<f64> {
        match self {
            Rating::Score(score) => Some(*score),
            Rating::New => None,
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Score(score) => write!(f, "{:.1}", score),
            Rating::New => write!(f, "New"),
        }
    }
}

/// Averages the ratings of a review list
///
/// Returns `Rating::New` for an empty list.
pub fn average_rating(reviews: &[Review]) -> Rating {
    if reviews.is_empty() {
        return Rating::New;
    }
    let total: u32 = reviews.iter().map(|r| r.rating as u32).sum();
    Rating::Score(total as f64 / reviews.len() as f64)
}

/// A place enriched for display: resolved amenity names, rating and image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayPlace {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    /// Human-readable amenity names, in the place's amenity order
    pub amenities: Vec<String>,
    pub owner_id: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: Rating,
    /// Resolved image path or URL
    pub image: String,
}

/// Formats a review count, e.g. "1 review" or "3 reviews"
pub fn review_count_label(count: usize) -> String {
    format!("{} review{}", count, if count == 1 { "" } else { "s" })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: u8) -> Review {
        Review {
            id: format!("r{}", rating),
            text: "A fine place to rest".to_string(),
            rating,
            user_id: Some("u1".to_string()),
            place_id: Some("p1".to_string()),
            user: None,
        }
    }

    #[test]
    fn test_place_deserializes_server_payload() {
        let json = r#"{
            "id": "p-1",
            "title": "Dragon's Rest Tavern",
            "description": "A legendary tavern",
            "price": 75.0,
            "latitude": 42.36,
            "longitude": -71.05,
            "owner_id": "owner-1",
            "amenities": ["a1", "a2"],
            "image": "http://localhost/static/images/Dragon%27s%20Rest%20Tavern.jpg"
        }"#;

        let place: Place = serde_json::from_str(json).expect("Failed to parse place");

        assert_eq!(place.id, "p-1");
        assert_eq!(place.title, "Dragon's Rest Tavern");
        assert!((place.price - 75.0).abs() < 0.001);
        assert_eq!(place.amenities, vec!["a1", "a2"]);
        assert_eq!(place.owner_id.as_deref(), Some("owner-1"));
        assert!(place.image.is_some());
    }

    #[test]
    fn test_place_tolerates_missing_optional_fields() {
        let json = r#"{"id": "p-2", "title": "Cabin", "price": 10}"#;

        let place: Place = serde_json::from_str(json).expect("Failed to parse place");

        assert!(place.description.is_empty());
        assert!(place.amenities.is_empty());
        assert!(place.owner_id.is_none());
        assert!(place.image.is_none());
    }

    #[test]
    fn test_user_defaults_admin_flag() {
        let json = r#"{"id": "u1", "first_name": "Aragorn", "last_name": "Ranger", "email": "a@b.c"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(!user.is_admin);
        assert_eq!(user.first_name, "Aragorn");
    }

    #[test]
    fn test_average_rating_of_empty_list_is_new() {
        assert_eq!(average_rating(&[]), Rating::New);
    }

    #[test]
    fn test_average_rating_computes_mean() {
        let rating = average_rating(&[review(5), review(4), review(3)]);
        assert_eq!(rating, Rating::Score(4.0));
    }

    #[test]
    fn test_rating_display() {
        assert_eq!(Rating::Score(4.5).to_string(), "4.5");
        assert_eq!(Rating::Score(4.333).to_string(), "4.3");
        assert_eq!(Rating::New.to_string(), "New");
    }

    #[test]
    fn test_review_stars() {
        assert_eq!(review(4).stars(), "★★★★☆");
        assert_eq!(review(5).stars(), "★★★★★");
    }

    #[test]
    fn test_review_author_name() {
        let mut r = review(5);
        assert_eq!(r.author_name(), "Anonymous");
        r.user = Some(ReviewAuthor {
            first_name: "Gandalf".to_string(),
            last_name: "Grey".to_string(),
        });
        assert_eq!(r.author_name(), "Gandalf Grey");
    }

    #[test]
    fn test_review_count_label() {
        assert_eq!(review_count_label(0), "0 reviews");
        assert_eq!(review_count_label(1), "1 review");
        assert_eq!(review_count_label(2), "2 reviews");
    }
}
