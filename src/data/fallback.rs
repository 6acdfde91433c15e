//! Fixed fallback data shown when the API cannot be reached
//!
//! Mirrors the sample listings the web front end shipped with, so a failed
//! load still leaves a recognisable, clearly-marked card row on screen.

use super::Place;

/// Identifier prefix marking fallback records
pub const FALLBACK_ID_PREFIX: &str = "fallback-";

/// Returns the fallback place collection
///
/// Amenities are stored as display names, so they render unchanged when the
/// amenity cache is empty.
pub fn fallback_places() -> Vec<Place> {
    vec![
        fallback(
            "1",
            "Dragon's Rest Tavern",
            "A legendary tavern where heroes gather to share tales of their adventures.",
            75.0,
            &["Wi-Fi", "Hot Meals", "Stables", "Magical Protection"],
            "/static/images/place1.jpeg",
        ),
        fallback(
            "2",
            "Cozy Woodland Cabin",
            "A quiet cabin deep in the enchanted forest.",
            100.0,
            &["Fireplace", "Hot Meals"],
            "/static/images/place2.jpeg",
        ),
        fallback(
            "3",
            "Ethereal Fae Retreat",
            "A shimmering retreat with a view over the fae lakes.",
            200.0,
            &["Moonlit Garden", "Magical Protection"],
            "/static/images/place3.jpeg",
        ),
        fallback(
            "4",
            "Royal Castle Quarters",
            "A hidden gem within the royal castle walls.",
            300.0,
            &["Royal Guard", "Banquet Hall", "Stables"],
            "/static/images/place4.jpeg",
        ),
    ]
}

/// Whether a place id belongs to the fallback dataset
pub fn is_fallback_id(id: &str) -> bool {
    id.starts_with(FALLBACK_ID_PREFIX)
}

fn fallback(
    n: &str,
    title: &str,
    description: &str,
    price: f64,
    amenities: &[&str],
    image: &str,
) -> Place {
    Place {
        id: format!("{}{}", FALLBACK_ID_PREFIX, n),
        title: title.to_string(),
        description: description.to_string(),
        price,
        amenities: amenities.iter().map(|a| a.to_string()).collect(),
        owner_id: None,
        latitude: 0.0,
        longitude: 0.0,
        image: Some(image.to_string()),
    }
}
