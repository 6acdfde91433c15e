//! Listing configuration points
//!
//! The listing renderer is one component with a handful of knobs instead of
//! several near-identical variants: how far a scroll step moves, where card
//! images come from, and how the card rating is computed.

/// Width of one card in terminal columns, including its gap
pub const CARD_WIDTH: u16 = 36;

/// Rating shown when no review-based rating is available
pub const DEFAULT_RATING: f64 = 4.5;

/// Where a card's image reference comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageStrategy {
    /// Server URL if non-empty, else the title lookup table
    #[default]
    ServerFirst,
    /// Always the title lookup table
    TitleLookup,
}

impl ImageStrategy {
    /// Parses a strategy name as given on the command line
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<ImageStrategy> {
        match s.to_lowercase().trim() {
            "server" | "server-first" => Some(ImageStrategy::ServerFirst),
            "title" | "title-lookup" | "lookup" => Some(ImageStrategy::TitleLookup),
            _ => None,
        }
    }
}

/// How a card's rating is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RatingStrategy {
    /// Average of the place's reviews (fetched with the listing)
    #[default]
    Reviews,
    /// Always the configured default rating
    Fixed,
    /// Never rated; every card shows "New"
    Unrated,
}

impl RatingStrategy {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<RatingStrategy> {
        match s.to_lowercase().trim() {
            "reviews" | "average" => Some(RatingStrategy::Reviews),
            "fixed" | "default" => Some(RatingStrategy::Fixed),
            "unrated" | "none" => Some(RatingStrategy::Unrated),
            _ => None,
        }
    }

    /// Whether loading the listing also needs each place's reviews
    pub fn needs_reviews(&self) -> bool {
        matches!(self, RatingStrategy::Reviews)
    }
}

/// Configuration for a `ListingRenderer`
#[derive(Debug, Clone, PartialEq)]
pub struct ListingConfig {
    /// Columns moved by one scroll step
    pub card_scroll_delta: u16,
    pub image_strategy: ImageStrategy,
    pub rating_strategy: RatingStrategy,
    pub default_rating: f64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            card_scroll_delta: CARD_WIDTH,
            image_strategy: ImageStrategy::default(),
            rating_strategy: RatingStrategy::default(),
            default_rating: DEFAULT_RATING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ListingConfig::default();
        assert_eq!(config.card_scroll_delta, CARD_WIDTH);
        assert_eq!(config.image_strategy, ImageStrategy::ServerFirst);
        assert_eq!(config.rating_strategy, RatingStrategy::Reviews);
        assert!((config.default_rating - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_image_strategy_names() {
        assert_eq!(
            ImageStrategy::from_str("server-first"),
            Some(ImageStrategy::ServerFirst)
        );
        assert_eq!(
            ImageStrategy::from_str("Title-Lookup"),
            Some(ImageStrategy::TitleLookup)
        );
        assert_eq!(ImageStrategy::from_str("random"), None);
    }

    #[test]
    fn test_rating_strategy_names() {
        assert_eq!(RatingStrategy::from_str("reviews"), Some(RatingStrategy::Reviews));
        assert_eq!(RatingStrategy::from_str("FIXED"), Some(RatingStrategy::Fixed));
        assert_eq!(RatingStrategy::from_str("unrated"), Some(RatingStrategy::Unrated));
        assert_eq!(RatingStrategy::from_str("stars"), None);
    }

    #[test]
    fn test_only_reviews_strategy_needs_reviews() {
        assert!(RatingStrategy::Reviews.needs_reviews());
        assert!(!RatingStrategy::Fixed.needs_reviews());
        assert!(!RatingStrategy::Unrated.needs_reviews());
    }
}
