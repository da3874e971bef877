use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{
    GeminiClient, HttpImageFetcher, ImageFetcher, ImageResolver, ImageSearch, OutlineGenerator, PresentationBuilder,
    SlideContentGenerator, TemplateCatalog, TextGenerator,
};

/// Service handles shared by all requests. Immutable after startup.
pub struct AppState {
    pub catalog: TemplateCatalog,
    pub outline: OutlineGenerator,
    pub slides: SlideContentGenerator,
    pub images: ImageResolver,
    pub builder: PresentationBuilder,
}

impl AppState {
    pub fn new(
        templates_dir: impl Into<PathBuf>,
        media_dir: impl Into<PathBuf>,
        generator: Arc<dyn TextGenerator>,
        search: Option<Arc<dyn ImageSearch>>,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        Self::with_resolver(templates_dir, media_dir, generator, ImageResolver::new(search), fetcher)
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_resolver(
            &config.templates_dir,
            &config.media_dir,
            Arc::new(GeminiClient::new(config)),
            ImageResolver::from_config(config),
            Arc::new(HttpImageFetcher::new(config.http_timeout)),
        )
    }

    fn with_resolver(
        templates_dir: impl Into<PathBuf>,
        media_dir: impl Into<PathBuf>,
        generator: Arc<dyn TextGenerator>,
        images: ImageResolver,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        let catalog = TemplateCatalog::new(templates_dir);
        Self {
            outline: OutlineGenerator::new(generator.clone()),
            slides: SlideContentGenerator::new(generator, images.clone()),
            builder: PresentationBuilder::new(catalog.clone(), images.clone(), fetcher, media_dir),
            catalog,
            images,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_without_search_keys_uses_placeholders() {
        let config = AppConfig { templates_dir: PathBuf::from("decks"), ..AppConfig::default() };
        let state = AppState::from_config(&config);
        assert_eq!(state.catalog.dir(), std::path::Path::new("decks"));
        assert!(!state.images.is_configured());
    }
}
