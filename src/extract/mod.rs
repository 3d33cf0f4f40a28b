//! Template extraction from the main application's JavaScript source.
//!
//! The source holds an object literal keyed by club id, each value an array
//! of template objects. Club arrays are located by their quoted key and then
//! isolated with the delimiter scanner.

pub mod fields;
pub mod scanner;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Club keys looked up in the source, in report order.
pub const CLUB_KEYS: [&str; 2] = ["not-in-paris", "hedonism"];

/// Rendering hints from a template's `config` sub-object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConfig {
    pub background_mode: Option<String>,
    pub font_color: Option<String>,
    pub is_mono: Option<bool>,
}

/// Flat template record as written in the JavaScript source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub id: String,
    pub name: String,
    pub badge: Option<String>,
    pub description: Option<String>,
    pub config: TemplateConfig,
}

/// Templates belonging to one club.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClubTemplates {
    pub club_id: String,
    pub templates: Vec<TemplateDefinition>,
}

/// Extract the template arrays of every known club from `source`.
///
/// Clubs whose key is missing or whose array is unterminated are omitted.
pub fn parse_template_definitions(source: &str) -> Vec<ClubTemplates> {
    CLUB_KEYS
        .iter()
        .filter_map(|club_id| {
            parse_club_array(source, club_id).map(|templates| ClubTemplates {
                club_id: club_id.to_string(),
                templates,
            })
        })
        .collect()
}

fn parse_club_array(source: &str, club_id: &str) -> Option<Vec<TemplateDefinition>> {
    let key = format!("'{club_id}':");
    let key_at = source.find(&key)?;
    let open = scanner::find_code_byte(source, key_at + key.len(), b'[')?;
    let close = scanner::find_matching(source, open)?;

    Some(parse_template_array(&source[open + 1..close]))
}

/// Parse the body of a template array (without the surrounding brackets).
pub fn parse_template_array(body: &str) -> Vec<TemplateDefinition> {
    scanner::object_spans(body)
        .into_iter()
        .filter_map(|(open, close)| fields::extract_template(&body[open..=close]))
        .collect()
}

/// Read `path` and extract its template definitions.
pub fn load_template_definitions(path: &Path) -> Result<Vec<ClubTemplates>> {
    let source = std::fs::read_to_string(path)?;
    let clubs = parse_template_definitions(&source);
    tracing::debug!(
        path = %path.display(),
        clubs = clubs.len(),
        "Parsed template definitions"
    );
    Ok(clubs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
class AddictedApp {
    getTemplateDefinitions() {
        // Fallback templates, '[' in comments must not matter
        return {
            'not-in-paris': [
                {
                    id: 'nip-classic',
                    name: 'Classic Route',
                    description: 'Standard overlay with club logo and clean typography.',
                    config: { backgroundMode: 'image', fontColor: 'white', isMono: false },
                    badge: 'Default'
                },
                {
                    id: 'nip-broken',
                    description: 'No name here ] so it is skipped',
                }
            ],
            'hedonism': [
                {
                    id: 'hedonism-night',
                    name: 'Night Drive',
                    description: 'Dark mode composition with neon typography highlights.',
                    config: { backgroundMode: 'solid', fontColor: 'white', isMono: false },
                    badge: 'Alt'
                }
            ]
        };
    }
}
"#;

    #[test]
    fn test_parses_both_clubs_in_order() {
        let clubs = parse_template_definitions(SOURCE);
        let ids: Vec<&str> = clubs.iter().map(|c| c.club_id.as_str()).collect();
        assert_eq!(ids, vec!["not-in-paris", "hedonism"]);
    }

    #[test]
    fn test_object_without_name_is_excluded() {
        let clubs = parse_template_definitions(SOURCE);
        let nip = &clubs[0];
        assert_eq!(nip.templates.len(), 1);
        assert_eq!(nip.templates[0].id, "nip-classic");
    }

    #[test]
    fn test_config_is_parsed() {
        let clubs = parse_template_definitions(SOURCE);
        let night = &clubs[1].templates[0];
        assert_eq!(night.config.background_mode.as_deref(), Some("solid"));
        assert_eq!(night.badge.as_deref(), Some("Alt"));
    }

    #[test]
    fn test_missing_club_is_omitted() {
        let clubs = parse_template_definitions("const x = { 'hedonism': [ { id: 'h', name: 'H' } ] };");
        assert_eq!(clubs.len(), 1);
        assert_eq!(clubs[0].club_id, "hedonism");
    }

    #[test]
    fn test_empty_source() {
        assert!(parse_template_definitions("").is_empty());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = load_template_definitions(Path::new("/nonexistent/app-addicted-logic.js"));
        assert!(matches!(result, Err(crate::error::AppError::Io(_))));
    }
}
