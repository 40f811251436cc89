use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Presentation options for one home page section. Only these keys, with
/// the right JSON types, survive normalization; anything else a client
/// sends is dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_button_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_button_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_top: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_bottom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slide_images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<i64>,
}

impl SectionConfig {
    /// Extracts the known keys from an untyped config object. Slide images
    /// are accepted either as an array of strings or as one newline-
    /// separated string; `maxItems` is kept only when positive. Returns
    /// None when nothing usable remains.
    pub fn normalize(raw: &Value) -> Option<SectionConfig> {
        let obj = raw.as_object()?;
        let text = |key: &str| obj.get(key).and_then(Value::as_str).map(String::from);

        let slide_images = match obj.get("slideImages") {
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect(),
            ),
            Some(Value::String(s)) => Some(
                s.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from)
                    .collect(),
            ),
            _ => None,
        };

        let config = SectionConfig {
            title: text("title"),
            subtitle: text("subtitle"),
            primary_button_text: text("primaryButtonText"),
            secondary_button_text: text("secondaryButtonText"),
            placeholder: text("placeholder"),
            button_text: text("buttonText"),
            background_color: text("backgroundColor"),
            background_image: text("backgroundImage"),
            text_color: text("textColor"),
            accent_color: text("accentColor"),
            padding_top: text("paddingTop"),
            padding_bottom: text("paddingBottom"),
            slide_images,
            max_items: obj.get("maxItems").and_then(Value::as_i64).filter(|n| *n > 0),
        };

        if config == SectionConfig::default() {
            None
        } else {
            Some(config)
        }
    }
}

/// One configurable section of the home page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeLayoutSection {
    pub id: String,
    pub enabled: bool,
    pub order: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<SectionConfig>,
}

impl HomeLayoutSection {
    /// Coerces one untyped stored/submitted section. Unknown or mistyped
    /// fields fall back: empty id, enabled, the given order.
    pub fn normalize(raw: &Value, default_order: i64) -> HomeLayoutSection {
        let id = match raw.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        HomeLayoutSection {
            id,
            enabled: raw.get("enabled").and_then(Value::as_bool).unwrap_or(true),
            order: raw.get("order").and_then(Value::as_i64).unwrap_or(default_order),
            config: raw.get("config").and_then(SectionConfig::normalize),
        }
    }
}

/// The home layout served when nothing was ever saved.
pub fn default_sections() -> Vec<HomeLayoutSection> {
    ["hero", "categories", "featured", "newsletter"]
        .iter()
        .enumerate()
        .map(|(order, id)| HomeLayoutSection {
            id: (*id).to_string(),
            enabled: true,
            order: order as i64,
            config: Some(SectionConfig::default()),
        })
        .collect()
}

/// Wire shape of the home layout.
#[derive(Debug, Clone, Serialize)]
pub struct HomeLayoutResponse {
    pub sections: Vec<HomeLayoutSection>,
}

/// Storefront theme colors and typography. Values are free-form strings
/// interpreted by the client; unset fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteTheme {
    pub primary_color: String,
    pub accent_color: String,
    pub font_family: String,
}

impl SiteTheme {
    /// Coerces any stored or submitted value; non-string fields become "".
    pub fn normalize(raw: &Value) -> SiteTheme {
        let text = |key: &str| {
            raw.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        SiteTheme {
            primary_color: text("primaryColor"),
            accent_color: text("accentColor"),
            font_family: text("fontFamily"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_keeps_only_known_string_keys() {
        let raw = json!({
            "title": "Summer sale",
            "maxItems": 4,
            "unknown": "dropped",
            "subtitle": 42
        });
        let config = SectionConfig::normalize(&raw).unwrap();
        assert_eq!(config.title.as_deref(), Some("Summer sale"));
        assert_eq!(config.max_items, Some(4));
        assert!(config.subtitle.is_none());
    }

    #[test]
    fn test_config_splits_slide_images_from_a_string() {
        let raw = json!({ "slideImages": "a.jpg\n  b.jpg \n\n" });
        let config = SectionConfig::normalize(&raw).unwrap();
        assert_eq!(
            config.slide_images,
            Some(vec!["a.jpg".to_string(), "b.jpg".to_string()])
        );
    }

    #[test]
    fn test_config_filters_non_string_slide_images() {
        let raw = json!({ "slideImages": ["a.jpg", 3, null, "b.jpg"] });
        let config = SectionConfig::normalize(&raw).unwrap();
        assert_eq!(
            config.slide_images,
            Some(vec!["a.jpg".to_string(), "b.jpg".to_string()])
        );
    }

    #[test]
    fn test_config_drops_non_positive_max_items() {
        assert!(SectionConfig::normalize(&json!({ "maxItems": 0 })).is_none());
        assert!(SectionConfig::normalize(&json!({ "maxItems": -2 })).is_none());
    }

    #[test]
    fn test_empty_config_normalizes_to_none() {
        assert!(SectionConfig::normalize(&json!({})).is_none());
        assert!(SectionConfig::normalize(&json!("not an object")).is_none());
    }

    #[test]
    fn test_section_defaults_apply() {
        let section = HomeLayoutSection::normalize(&json!({}), 3);
        assert_eq!(section.id, "");
        assert!(section.enabled);
        assert_eq!(section.order, 3);
        assert!(section.config.is_none());
    }

    #[test]
    fn test_default_sections_are_ordered() {
        let sections = default_sections();
        assert_eq!(sections.len(), 4);
        assert_eq!(sections[0].id, "hero");
        assert_eq!(sections[3].order, 3);
    }

    #[test]
    fn test_theme_coerces_non_strings_to_empty() {
        let theme = SiteTheme::normalize(&json!({ "primaryColor": "#111", "accentColor": 5 }));
        assert_eq!(theme.primary_color, "#111");
        assert_eq!(theme.accent_color, "");
        assert_eq!(theme.font_family, "");
    }
}
