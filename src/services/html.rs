//! Runtime configuration injected into served HTML.
//!
//! Pages reference `config.js` with a version query; the tag is replaced
//! with an inline script that defines `window.CONFIG`. The client secret is
//! never written into the page.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Config;

const CONFIG_TAGS: [&str; 4] = [
    r#"<script src="/route/config.js?v=4"></script>"#,
    r#"<script src="config.js?v=4"></script>"#,
    r#"<script src="/route/config.js?v=3"></script>"#,
    r#"<script src="config.js?v=3"></script>"#,
];

static CONFIG_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<script src="(/route/)?config\.js\?v=\d+"></script>"#)
        .unwrap_or_else(|e| panic!("invalid config tag pattern: {e}"))
});

const PLACEHOLDER_CLIENT_ID: &str = "YOUR_STRAVA_CLIENT_ID";

/// Build the inline `<script>` defining `window.CONFIG`.
pub fn config_script(config: &Config) -> String {
    let client_id = config
        .strava
        .client_id
        .as_deref()
        .unwrap_or(PLACEHOLDER_CLIENT_ID);
    // JSON string literals are valid JavaScript; `<` is escaped so the value cannot close the tag.
    let client_id_js = serde_json::Value::String(client_id.to_string())
        .to_string()
        .replace('<', "\\u003c");
    let production = config.is_production();

    format!(
        r#"
<script>
window.CONFIG = {{
    STRAVA: {{
        CLIENT_ID: {client_id_js},
        REDIRECT_URI: window.location.origin + '/route/oauth/',
        SCOPE: '{scope}',
        API_BASE_URL: '{api_base}'
    }},
    ENV: {{
        PRODUCTION: {production},
        DEBUG: {debug},
        MOCK_DATA: false
    }},
    APP: {{
        NAME: 'addicted',
        VERSION: '1.0.0',
        DEFAULT_WORKOUTS_COUNT: 10
    }}
}};

if (CONFIG.ENV.DEBUG) {{
    console.log('addicted web configuration:', CONFIG);
}}
</script>
"#,
        scope = config.strava.scope,
        api_base = config.strava.api_base_url,
        debug = !production,
    )
}

/// Replace the `config.js` script tag in `html` with the inline configuration.
///
/// Exact tags are tried in order and only the first one found is replaced;
/// otherwise every tag matching the versioned pattern is replaced. HTML
/// without a config tag is returned unchanged.
pub fn inject_config(html: &str, config: &Config) -> String {
    let script = config_script(config);

    if let Some(tag) = CONFIG_TAGS.iter().find(|tag| html.contains(*tag)) {
        return html.replace(tag, &script);
    }

    CONFIG_TAG_RE
        .replace_all(html, regex::NoExpand(&script))
        .into_owned()
}
