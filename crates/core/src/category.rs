// Service categories
//
// The marketplace groups providers by the kind of service they offer.
// The same enum backs the intake "services" multi-choice step.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Kind of service a provider offers and a customer can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Photographer,
    Venue,
    Caterer,
    Decorator,
    Entertainment,
    MakeupArtist,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 6] = [
        ServiceKind::Photographer,
        ServiceKind::Venue,
        ServiceKind::Caterer,
        ServiceKind::Decorator,
        ServiceKind::Entertainment,
        ServiceKind::MakeupArtist,
    ];

    /// Stable identifier used in URLs and storage
    pub fn slug(&self) -> &'static str {
        match self {
            ServiceKind::Photographer => "photographer",
            ServiceKind::Venue => "venue",
            ServiceKind::Caterer => "caterer",
            ServiceKind::Decorator => "decorator",
            ServiceKind::Entertainment => "entertainment",
            ServiceKind::MakeupArtist => "makeup_artist",
        }
    }

    /// Human-readable label shown as a choice
    pub fn label(&self) -> &'static str {
        match self {
            ServiceKind::Photographer => "Photographer",
            ServiceKind::Venue => "Venue",
            ServiceKind::Caterer => "Caterer",
            ServiceKind::Decorator => "Decorator",
            ServiceKind::Entertainment => "Entertainment",
            ServiceKind::MakeupArtist => "Makeup Artist",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ServiceKind::Photographer => "Photo and video coverage of your event",
            ServiceKind::Venue => "Banquet halls, lawns and event spaces",
            ServiceKind::Caterer => "Food and beverage service",
            ServiceKind::Decorator => "Theme, floral and stage decoration",
            ServiceKind::Entertainment => "DJs, live bands and performers",
            ServiceKind::MakeupArtist => "Bridal and party makeup",
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ServiceKind {
    type Err = String;

    /// Accepts the slug or the label, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ServiceKind::ALL
            .into_iter()
            .find(|kind| {
                kind.slug().eq_ignore_ascii_case(needle) || kind.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| format!("unknown service kind: {s}"))
    }
}

/// Browsable category entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Category {
    pub kind: ServiceKind,
    pub slug: String,
    pub name: String,
    pub description: String,
}

impl From<ServiceKind> for Category {
    fn from(kind: ServiceKind) -> Self {
        Self {
            kind,
            slug: kind.slug().to_string(),
            name: kind.label().to_string(),
            description: kind.description().to_string(),
        }
    }
}

/// All categories in display order
pub fn categories() -> Vec<Category> {
    ServiceKind::ALL.into_iter().map(Category::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_slug_and_label() {
        assert_eq!("makeup_artist".parse::<ServiceKind>(), Ok(ServiceKind::MakeupArtist));
        assert_eq!("Makeup Artist".parse::<ServiceKind>(), Ok(ServiceKind::MakeupArtist));
        assert_eq!(" venue ".parse::<ServiceKind>(), Ok(ServiceKind::Venue));
        assert!("plumber".parse::<ServiceKind>().is_err());
    }

    #[test]
    fn test_categories_cover_every_kind() {
        let cats = categories();
        assert_eq!(cats.len(), ServiceKind::ALL.len());
        assert_eq!(cats[0].slug, "photographer");
        assert_eq!(cats[5].name, "Makeup Artist");
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&ServiceKind::MakeupArtist).unwrap();
        assert_eq!(json, "\"makeup_artist\"");
    }
}
