use crate::core::config::TileConfig;
use crate::core::constants::OSM_TILE_URL;
use crate::core::geo::TileCoord;

/// Trait representing anything that can produce tile URLs for a given coordinate.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `coord`.
    fn url(&self, coord: TileCoord) -> String;
}

/// Slippy-map server addressed by a `{s}/{z}/{x}/{y}` URL template
#[derive(Debug, Clone)]
pub struct TemplateSource {
    template: String,
    subdomains: Vec<String>,
}

impl TemplateSource {
    pub fn new(template: impl Into<String>, subdomains: Vec<String>) -> Self {
        Self {
            template: template.into(),
            subdomains,
        }
    }

    /// The default OpenStreetMap tile server
    pub fn openstreetmap() -> Self {
        Self::new(
            OSM_TILE_URL,
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
        )
    }

    pub fn from_config(config: &TileConfig) -> Self {
        Self::new(config.url_template.clone(), config.subdomains.clone())
    }
}

impl Default for TemplateSource {
    fn default() -> Self {
        Self::openstreetmap()
    }
}

impl TileSource for TemplateSource {
    fn url(&self, coord: TileCoord) -> String {
        let url = self
            .template
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string());

        // Spread requests over subdomains
        match self.subdomains.len() {
            0 => url.replace("{s}.", "").replace("{s}", ""),
            len => {
                let idx = ((coord.x + coord.y) % len as u32) as usize;
                url.replace("{s}", &self.subdomains[idx])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openstreetmap_url() {
        let source = TemplateSource::openstreetmap();
        assert_eq!(
            source.url(TileCoord::new(1, 2, 3)),
            "https://a.tile.openstreetmap.org/3/1/2.png"
        );
        assert_eq!(
            source.url(TileCoord::new(1, 3, 3)),
            "https://b.tile.openstreetmap.org/3/1/3.png"
        );
    }

    #[test]
    fn test_template_without_subdomains() {
        let source = TemplateSource::new("https://{s}.tiles.example/{z}/{x}/{y}.png", Vec::new());
        assert_eq!(
            source.url(TileCoord::new(5, 6, 7)),
            "https://tiles.example/7/5/6.png"
        );
    }
}
