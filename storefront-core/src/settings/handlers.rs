use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::models::setting::{default_sections, HomeLayoutResponse, HomeLayoutSection, SiteTheme};
use crate::AppState;

const HOME_LAYOUT_KEY: &str = "home_layout";
const SITE_THEME_KEY: &str = "site_theme";

/// GET /api/settings/home-layout. Returns the stored sections, or the
/// defaults when nothing was ever saved. Always sorted by `order`.
pub async fn get_home_layout(
    State(state): State<AppState>,
) -> ApiResult<Json<HomeLayoutResponse>> {
    let stored = state.stores.settings.get(HOME_LAYOUT_KEY).await?;
    let mut sections = stored
        .as_ref()
        .and_then(|value| value.get("sections"))
        .and_then(Value::as_array)
        .filter(|sections| !sections.is_empty())
        .map(|raw| {
            raw.iter()
                .map(|section| HomeLayoutSection::normalize(section, 0))
                .collect::<Vec<_>>()
        })
        .unwrap_or_else(default_sections);
    sections.sort_by_key(|section| section.order);
    Ok(Json(HomeLayoutResponse { sections }))
}

/// PATCH /api/settings/home-layout
pub async fn update_home_layout(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> ApiResult<Json<HomeLayoutResponse>> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let sections = body
        .get("sections")
        .and_then(Value::as_array)
        .filter(|sections| !sections.is_empty())
        .ok_or_else(|| ApiError::bad_request("sections array required"))?;

    let sections: Vec<HomeLayoutSection> = sections
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let mut section = HomeLayoutSection::normalize(raw, index as i64);
            // Saved sections always carry a config object, even an empty one.
            section.config = Some(section.config.take().unwrap_or_default());
            section
        })
        .collect();

    let response = HomeLayoutResponse { sections };
    let value = serde_json::to_value(&response)
        .map_err(|e| ApiError::internal("serialize home layout", e))?;
    state.stores.settings.upsert(HOME_LAYOUT_KEY, value).await?;
    Ok(Json(response))
}

/// GET /api/settings/theme
pub async fn get_site_theme(State(state): State<AppState>) -> ApiResult<Json<SiteTheme>> {
    let stored = state.stores.settings.get(SITE_THEME_KEY).await?;
    let theme = stored
        .map(|value| SiteTheme::normalize(&value))
        .unwrap_or_default();
    Ok(Json(theme))
}

/// PATCH /api/settings/theme
pub async fn update_site_theme(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> ApiResult<Json<SiteTheme>> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let theme = SiteTheme::normalize(&body);
    let value =
        serde_json::to_value(&theme).map_err(|e| ApiError::internal("serialize theme", e))?;
    state.stores.settings.upsert(SITE_THEME_KEY, value).await?;
    Ok(Json(theme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::Stores;
    use serde_json::json;
    use std::sync::Arc;

    fn test_state() -> AppState {
        AppState {
            stores: Stores::in_memory(),
            config: Arc::new(Config::default()),
            pool: None,
        }
    }

    #[tokio::test]
    async fn test_home_layout_defaults_when_nothing_is_saved() {
        let state = test_state();
        let Json(layout) = get_home_layout(State(state)).await.unwrap();
        let ids: Vec<&str> = layout.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["hero", "categories", "featured", "newsletter"]);
        assert!(layout.sections.iter().all(|s| s.enabled));
        assert!(layout.sections[0].config.is_some());
    }

    #[tokio::test]
    async fn test_home_layout_round_trip_normalizes_and_sorts() {
        let state = test_state();
        let body = json!({
            "sections": [
                { "id": "hero", "enabled": false, "order": 5,
                  "config": { "title": "Hi", "unknown": 1 } },
                { "id": "featured" }
            ]
        });
        let Json(saved) = update_home_layout(State(state.clone()), Some(Json(body)))
            .await
            .unwrap();
        assert_eq!(saved.sections[0].order, 5);
        assert!(!saved.sections[0].enabled);
        assert_eq!(
            saved.sections[0]
                .config
                .as_ref()
                .unwrap()
                .title
                .as_deref(),
            Some("Hi")
        );
        // Missing order falls back to the array index.
        assert_eq!(saved.sections[1].order, 1);
        assert!(saved.sections[1].enabled);

        let Json(layout) = get_home_layout(State(state)).await.unwrap();
        let ids: Vec<&str> = layout.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["featured", "hero"]);
    }

    #[tokio::test]
    async fn test_home_layout_update_requires_sections() {
        let state = test_state();
        let missing = update_home_layout(State(state.clone()), None).await;
        assert!(matches!(missing, Err(ApiError::BadRequest(_))));

        let empty =
            update_home_layout(State(state), Some(Json(json!({ "sections": [] })))).await;
        assert!(matches!(empty, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_theme_round_trip_coerces_fields() {
        let state = test_state();
        let Json(theme) = get_site_theme(State(state.clone())).await.unwrap();
        assert_eq!(theme, SiteTheme::default());

        let body = json!({ "primaryColor": "#cc0000", "fontFamily": 7 });
        let Json(saved) = update_site_theme(State(state.clone()), Some(Json(body)))
            .await
            .unwrap();
        assert_eq!(saved.primary_color, "#cc0000");
        assert_eq!(saved.font_family, "");

        let Json(reloaded) = get_site_theme(State(state)).await.unwrap();
        assert_eq!(reloaded, saved);
    }
}
