//! Viewer option mapping
//!
//! Translates the configured viewer defaults into the option names the
//! bundled viewer understands. The result travels in the `config` field of
//! the `preview` message.

use super::schema::ViewerConfig;
use serde::Serialize;

/// Zoom level as sent to the render surface
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ZoomLevel {
    /// Named fit mode
    Mode(String),
    /// Scale factor, 1.0 = 100%
    Scale(f64),
}

/// Options object sent with `preview`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceConfig {
    pub zoom_level: ZoomLevel,
    pub spread_mode: String,
    pub tab_bar: String,
    pub initial_documents: Vec<String>,
}

impl ViewerConfig {
    /// Map configured values to render surface options
    pub fn to_surface_config(&self) -> SurfaceConfig {
        SurfaceConfig {
            zoom_level: map_zoom(&self.default_zoom_level),
            spread_mode: self.default_spread_mode.clone(),
            tab_bar: self.tab_bar.clone(),
            initial_documents: vec![],
        }
    }
}

fn map_zoom(value: &str) -> ZoomLevel {
    if let Some(percent) = value.strip_suffix('%') {
        if let Ok(percent) = percent.trim().parse::<f64>() {
            return ZoomLevel::Scale(percent / 100.0);
        }
    }

    let mapped = match value {
        "page-width" => "fit-width",
        // fit-height is not offered by the viewer
        "page-fit" | "page-height" => "fit-page",
        "auto" => "automatic",
        other => other,
    };
    ZoomLevel::Mode(mapped.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer(zoom: &str) -> ViewerConfig {
        ViewerConfig {
            default_zoom_level: zoom.to_string(),
            ..ViewerConfig::default()
        }
    }

    #[test]
    fn named_zoom_levels_map_to_viewer_modes() {
        assert_eq!(
            viewer("page-width").to_surface_config().zoom_level,
            ZoomLevel::Mode("fit-width".to_string())
        );
        assert_eq!(
            viewer("page-height").to_surface_config().zoom_level,
            ZoomLevel::Mode("fit-page".to_string())
        );
        assert_eq!(
            viewer("auto").to_surface_config().zoom_level,
            ZoomLevel::Mode("automatic".to_string())
        );
    }

    #[test]
    fn percentage_becomes_scale() {
        assert_eq!(
            viewer("125%").to_surface_config().zoom_level,
            ZoomLevel::Scale(1.25)
        );
    }

    #[test]
    fn unknown_values_pass_through() {
        assert_eq!(
            viewer("fit-width").to_surface_config().zoom_level,
            ZoomLevel::Mode("fit-width".to_string())
        );
        assert_eq!(
            viewer("abc%").to_surface_config().zoom_level,
            ZoomLevel::Mode("abc%".to_string())
        );
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(ViewerConfig::default().to_surface_config()).unwrap();
        assert_eq!(json["zoomLevel"], "fit-width");
        assert_eq!(json["spreadMode"], "none");
        assert_eq!(json["tabBar"], "never");
        assert!(json["initialDocuments"].as_array().unwrap().is_empty());
    }
}
