//! Field-level extraction from a single template object literal.

use once_cell::sync::Lazy;
use regex::Regex;

use super::scanner::find_matching;
use super::{TemplateConfig, TemplateDefinition};

fn string_field(key: &str) -> Regex {
    // Keys may be bare or quoted; values are single- or double-quoted strings.
    let pattern = format!(r#"(?:^|[^\w$])['"]?{key}['"]?\s*:\s*['"]([^'"]+)['"]"#);
    Regex::new(&pattern).unwrap_or_else(|e| panic!("invalid field pattern for {key}: {e}"))
}

static ID_RE: Lazy<Regex> = Lazy::new(|| string_field("id"));
static NAME_RE: Lazy<Regex> = Lazy::new(|| string_field("name"));
static BADGE_RE: Lazy<Regex> = Lazy::new(|| string_field("badge"));
static DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| string_field("description"));
static BACKGROUND_MODE_RE: Lazy<Regex> = Lazy::new(|| string_field("backgroundMode"));
static FONT_COLOR_RE: Lazy<Regex> = Lazy::new(|| string_field("fontColor"));
static IS_MONO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|[^\w$])['"]?isMono['"]?\s*:\s*(true|false)\b"#)
        .unwrap_or_else(|e| panic!("invalid isMono pattern: {e}"))
});
static CONFIG_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|[^\w$])['"]?config['"]?\s*:\s*\{"#)
        .unwrap_or_else(|e| panic!("invalid config pattern: {e}"))
});

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Split an object literal into its top-level text and the body of its
/// `config: {…}` sub-object, if any.
fn split_config(object: &str) -> (String, Option<&str>) {
    let Some(m) = CONFIG_KEY_RE.find(object) else {
        return (object.to_string(), None);
    };
    let open = m.end() - 1;
    match find_matching(object, open) {
        Some(close) => {
            let mut outer = String::with_capacity(object.len());
            outer.push_str(&object[..m.start()]);
            outer.push_str(&object[close + 1..]);
            (outer, Some(&object[open + 1..close]))
        }
        None => (object.to_string(), None),
    }
}

fn parse_config(body: &str) -> TemplateConfig {
    TemplateConfig {
        background_mode: capture(&BACKGROUND_MODE_RE, body),
        font_color: capture(&FONT_COLOR_RE, body),
        is_mono: capture(&IS_MONO_RE, body).map(|v| v == "true"),
    }
}

/// Extract a template from one object literal.
///
/// Returns `None` unless both `id` and `name` are present.
pub fn extract_template(object: &str) -> Option<TemplateDefinition> {
    let (outer, config) = split_config(object);

    let id = capture(&ID_RE, &outer)?;
    let name = capture(&NAME_RE, &outer)?;

    Some(TemplateDefinition {
        id,
        name,
        badge: capture(&BADGE_RE, &outer),
        description: capture(&DESCRIPTION_RE, &outer),
        config: config.map(parse_config).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_all_fields() {
        let object = r#"{
            id: 'nip-classic',
            name: 'Classic Route',
            description: 'Standard overlay with club logo and clean typography.',
            config: { backgroundMode: 'image', fontColor: 'white', isMono: false },
            badge: 'Default'
        }"#;
        let template = extract_template(object).unwrap();
        assert_eq!(template.id, "nip-classic");
        assert_eq!(template.name, "Classic Route");
        assert_eq!(template.badge.as_deref(), Some("Default"));
        assert_eq!(
            template.description.as_deref(),
            Some("Standard overlay with club logo and clean typography.")
        );
        assert_eq!(template.config.background_mode.as_deref(), Some("image"));
        assert_eq!(template.config.font_color.as_deref(), Some("white"));
        assert_eq!(template.config.is_mono, Some(false));
    }

    #[test]
    fn test_missing_name_is_dropped() {
        assert!(extract_template("{ id: 'only-id', badge: 'Alt' }").is_none());
    }

    #[test]
    fn test_missing_id_is_dropped() {
        assert!(extract_template("{ name: 'Nameless' }").is_none());
    }

    #[test]
    fn test_optional_fields_absent() {
        let template = extract_template(r#"{ "id": "x", "name": "Y" }"#).unwrap();
        assert!(template.badge.is_none());
        assert!(template.description.is_none());
        assert_eq!(template.config, TemplateConfig::default());
    }

    #[test]
    fn test_nested_config_keys_do_not_shadow_top_level() {
        let object = "{ config: { name: 'inner', isMono: true }, id: 'outer-id', name: 'Outer' }";
        let template = extract_template(object).unwrap();
        assert_eq!(template.name, "Outer");
        assert_eq!(template.config.is_mono, Some(true));
    }

    #[test]
    fn test_prefixed_keys_are_not_matched() {
        let object = "{ clubid: 'nope', id: 'real', displayname: 'nope', name: 'Real' }";
        let template = extract_template(object).unwrap();
        assert_eq!(template.id, "real");
        assert_eq!(template.name, "Real");
    }
}
