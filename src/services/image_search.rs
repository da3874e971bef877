//! Image resolution: Google Custom Search when configured, deterministic
//! placeholder images otherwise.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::config::{AppConfig, SearchCredentials};
use crate::errors::ImageError;
use crate::models::api::ImageResult;
use crate::models::{ContentMap, ImageRef, PlaceholderValue};

const CUSTOM_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";
const MAX_RESULTS: usize = 10;

#[async_trait]
pub trait ImageSearch: Send + Sync {
    async fn search(&self, query: &str, num: usize) -> Result<Vec<ImageResult>, ImageError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: Option<String>,
    #[serde(default)]
    title: String,
    image: Option<SearchImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchImage {
    thumbnail_link: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

pub struct GoogleImageSearch {
    client: reqwest::Client,
    credentials: SearchCredentials,
    base_url: String,
}

impl GoogleImageSearch {
    pub fn new(credentials: SearchCredentials, timeout: std::time::Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Failed to build HTTP client with timeout: {e}");
                reqwest::Client::new()
            });
        Self { client, credentials, base_url: CUSTOM_SEARCH_URL.to_string() }
    }
}

#[async_trait]
impl ImageSearch for GoogleImageSearch {
    async fn search(&self, query: &str, num: usize) -> Result<Vec<ImageResult>, ImageError> {
        let num = num.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", self.credentials.api_key.as_str()),
                ("cx", self.credentials.engine_id.as_str()),
                ("q", query),
                ("searchType", "image"),
                ("num", num.as_str()),
                ("safe", "active"),
                ("imgSize", "large"),
                ("fileType", "jpg|png"),
            ])
            .send()
            .await
            .map_err(|e| ImageError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Request(format!("HTTP {}", status.as_u16())));
        }
        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ImageError::Request(e.to_string()))?;

        Ok(body
            .items
            .into_iter()
            .filter_map(|item| {
                let url = item.link?;
                let image = item.image;
                Some(ImageResult {
                    thumbnail: image
                        .as_ref()
                        .and_then(|i| i.thumbnail_link.clone())
                        .unwrap_or_else(|| url.clone()),
                    width: image.as_ref().and_then(|i| i.width).unwrap_or(0),
                    height: image.as_ref().and_then(|i| i.height).unwrap_or(0),
                    title: item.title,
                    url,
                })
            })
            .collect())
    }
}

/// Stable hex key for a query: same query, same placeholder images.
fn query_seed(query: &str) -> String {
    let digest = Sha256::digest(query.trim().to_lowercase().as_bytes());
    hex::encode(&digest[..8])
}

/// Placeholder images for a query. Deterministic in the query text.
pub fn placeholder_images(query: &str, num: usize) -> Vec<ImageResult> {
    let seed = query_seed(query);
    (0..num)
        .map(|i| ImageResult {
            url: format!("https://picsum.photos/seed/{seed}-{i}/800/600"),
            title: format!("Placeholder for: {}", query.trim()),
            thumbnail: format!("https://picsum.photos/seed/{seed}-{i}/200/150"),
            width: 800,
            height: 600,
        })
        .collect()
}

#[derive(Clone, Default)]
pub struct ImageResolver {
    search: Option<Arc<dyn ImageSearch>>,
}

impl ImageResolver {
    pub fn new(search: Option<Arc<dyn ImageSearch>>) -> Self {
        Self { search }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let search = config.search.clone().map(|creds| {
            Arc::new(GoogleImageSearch::new(creds, config.http_timeout)) as Arc<dyn ImageSearch>
        });
        Self { search }
    }

    pub fn is_configured(&self) -> bool {
        self.search.is_some()
    }

    /// Up to `num` images (1 to 10). Never fails: any problem falls back to
    /// placeholders.
    pub async fn search_images(&self, query: &str, num: usize) -> Vec<ImageResult> {
        let num = num.clamp(1, MAX_RESULTS);
        let Some(search) = &self.search else {
            return placeholder_images(query, num);
        };

        match search.search(query, num).await {
            Ok(results) if !results.is_empty() => results.into_iter().take(num).collect(),
            Ok(_) => {
                log::warn!("Image search for '{query}' returned nothing, using placeholders");
                placeholder_images(query, num)
            }
            Err(e) => {
                log::warn!("Image search for '{query}' failed: {e}");
                placeholder_images(query, num)
            }
        }
    }

    pub async fn best_image(&self, query: &str) -> String {
        self.search_images(query, 1)
            .await
            .into_iter()
            .next()
            .map(|r| r.url)
            .unwrap_or_else(|| format!("https://picsum.photos/seed/{}-0/800/600", query_seed(query)))
    }

    /// Best image URL per distinct query, one search each.
    pub async fn batch_search(&self, queries: &[String]) -> HashMap<String, String> {
        let mut results = HashMap::with_capacity(queries.len());
        for query in queries {
            if !results.contains_key(query) {
                let url = self.best_image(query).await;
                results.insert(query.clone(), url);
            }
        }
        results
    }

    /// Fill in the URL of every image value that has only a query. Each
    /// distinct query across all of `contents` is searched once.
    pub async fn resolve_content<'a>(&self, contents: impl IntoIterator<Item = &'a mut ContentMap>) {
        let mut pending: Vec<&mut ImageRef> = contents
            .into_iter()
            .flat_map(|content| content.values_mut())
            .filter_map(|value| match value {
                PlaceholderValue::Image(image) if image.url.is_none() && image.query.is_some() => Some(image),
                _ => None,
            })
            .collect();
        if pending.is_empty() {
            return;
        }

        let queries: Vec<String> = pending.iter().filter_map(|image| image.query.clone()).collect();
        let urls = self.batch_search(&queries).await;
        for image in &mut pending {
            image.url = image.query.as_ref().and_then(|q| urls.get(q)).cloned();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_depend_only_on_normalised_query() {
        let a = placeholder_images("Lava Flow", 2);
        let b = placeholder_images("  lava flow ", 2);
        assert_eq!(a[0].url, b[0].url);
        assert_ne!(a[0].url, a[1].url);
        assert_ne!(a[0].url, placeholder_images("magma", 1)[0].url);
    }

    #[test]
    fn placeholder_url_shape() {
        let img = &placeholder_images("volcano", 1)[0];
        let rest = img.url.strip_prefix("https://picsum.photos/seed/").unwrap();
        let (seed, size) = rest.split_once('/').unwrap();
        assert_eq!(size, "800/600");
        let (hash, index) = seed.rsplit_once('-').unwrap();
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(index, "0");
        assert!(img.thumbnail.ends_with("/200/150"));
    }
}
