//! Built-in clubs and the fallback template catalogue shipped with the main application.

use serde::Serialize;

use crate::extract::{ClubTemplates, TemplateConfig, TemplateDefinition};

const FONT_FAMILY: &str = "Inter, system-ui, Avenir, Helvetica, Arial, sans-serif";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubTheme {
    pub primary_color: &'static str,
    pub secondary_color: &'static str,
    pub accent_color: &'static str,
    pub background_color: &'static str,
    pub font_family: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClubSeed {
    pub id: &'static str,
    pub name: &'static str,
    pub slug: &'static str,
    pub description: &'static str,
    pub theme: ClubTheme,
}

pub fn builtin_clubs() -> Vec<ClubSeed> {
    vec![
        ClubSeed {
            id: "hedonism",
            name: "HEDONISM",
            slug: "hedonism",
            description: "HEDONISM running club",
            theme: ClubTheme {
                primary_color: "#FF5A5F",
                secondary_color: "#00A699",
                accent_color: "#FC642D",
                background_color: "#FFFFFF",
                font_family: FONT_FAMILY,
            },
        },
        ClubSeed {
            id: "not-in-paris",
            name: "NOT IN PARIS",
            slug: "not-in-paris",
            description: "NOT IN PARIS running club",
            theme: ClubTheme {
                primary_color: "#1E40AF",
                secondary_color: "#10B981",
                accent_color: "#F59E0B",
                background_color: "#FFFFFF",
                font_family: FONT_FAMILY,
            },
        },
    ]
}

pub fn builtin_club(id: &str) -> Option<ClubSeed> {
    builtin_clubs().into_iter().find(|club| club.id == id)
}

fn fallback(
    id: &str,
    name: &str,
    description: &str,
    background_mode: &str,
    is_mono: bool,
    badge: &str,
) -> TemplateDefinition {
    TemplateDefinition {
        id: id.to_string(),
        name: name.to_string(),
        badge: Some(badge.to_string()),
        description: Some(description.to_string()),
        config: TemplateConfig {
            background_mode: Some(background_mode.to_string()),
            font_color: Some("white".to_string()),
            is_mono: Some(is_mono),
        },
    }
}

/// Templates the main application renders when the database has none published.
pub fn fallback_catalogue() -> Vec<ClubTemplates> {
    vec![
        ClubTemplates {
            club_id: "not-in-paris".to_string(),
            templates: vec![
                fallback(
                    "nip-classic",
                    "Classic Route",
                    "Standard overlay with club logo and clean typography.",
                    "image",
                    false,
                    "Default",
                ),
                fallback(
                    "nip-mono",
                    "Mono Cut",
                    "High-contrast monochrome look for bold storytelling.",
                    "image",
                    true,
                    "Alt",
                ),
                fallback(
                    "nip-gradient",
                    "Sunset Fade",
                    "Gradient background with bright typography accents.",
                    "gradient",
                    false,
                    "Special",
                ),
            ],
        },
        ClubTemplates {
            club_id: "hedonism".to_string(),
            templates: vec![
                fallback(
                    "hedonism-classic",
                    "Hedonism Core",
                    "Signature hedonism palette with vivid logo lockup.",
                    "image",
                    false,
                    "Default",
                ),
                fallback(
                    "hedonism-night",
                    "Night Drive",
                    "Dark mode composition with neon typography highlights.",
                    "solid",
                    false,
                    "Alt",
                ),
                fallback(
                    "hedonism-mono",
                    "Mono Pulse",
                    "Monochrome variant for poster-ready storytelling.",
                    "image",
                    true,
                    "Mono",
                ),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalogue_has_three_templates_per_club() {
        let catalogue = fallback_catalogue();
        assert_eq!(catalogue.len(), 2);
        for club in &catalogue {
            assert_eq!(club.templates.len(), 3, "{}", club.club_id);
            assert!(builtin_club(&club.club_id).is_some());
        }
    }

    #[test]
    fn test_catalogue_ids_are_unique() {
        let ids: HashSet<String> = fallback_catalogue()
            .into_iter()
            .flat_map(|club| club.templates.into_iter().map(|t| t.id))
            .collect();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_theme_serializes_camel_case() {
        let club = builtin_club("hedonism").unwrap();
        let theme = serde_json::to_value(&club.theme).unwrap();
        assert_eq!(theme["primaryColor"], "#FF5A5F");
        assert_eq!(theme["fontFamily"], FONT_FAMILY);
    }
}
