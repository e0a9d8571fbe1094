//! Stock image search with an offline fallback.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::ImageSource;

/// Default search endpoint (Unsplash photo search).
pub const DEFAULT_ENDPOINT: &str = "https://api.unsplash.com/search/photos";

/// Number of results requested and produced by the fallback.
pub const DEFAULT_PER_PAGE: u32 = 12;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    pub id: String,
    /// Full-size image, used for the card.
    pub url: String,
    /// Small preview.
    pub thumb: String,
    pub alt: String,
}

impl ImageResult {
    /// Image source for a card showing this result.
    pub fn to_source(&self) -> ImageSource {
        ImageSource::remote(self.url.clone())
    }
}

/// Where a result set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultOrigin {
    Remote,
    /// Placeholder images, used when the service fails.
    Demo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub origin: ResultOrigin,
    pub images: Vec<ImageResult>,
}

/// Placeholder results for `query`.
pub fn demo_images(query: &str, count: u32) -> Vec<ImageResult> {
    (1..=count)
        .map(|i| ImageResult {
            id: format!("demo-{}", i),
            url: format!("https://picsum.photos/800/600?random={}&q={}", i, query),
            thumb: format!("https://picsum.photos/200/150?random={}&q={}", i, query),
            alt: format!("{} image {}", query, i),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    id: String,
    urls: PhotoUrls,
    #[serde(default)]
    alt_description: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: String,
    small: String,
}

impl From<Photo> for ImageResult {
    fn from(photo: Photo) -> Self {
        let alt = photo
            .alt_description
            .or(photo.description)
            .unwrap_or_else(|| "Image".to_string());
        Self {
            id: photo.id,
            url: photo.urls.regular,
            thumb: photo.urls.small,
            alt,
        }
    }
}

/// Parse a search response body.
fn parse_response(body: &str) -> Result<Vec<ImageResult>> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response.results.into_iter().map(ImageResult::from).collect())
}

/// Client for the image search service.
#[derive(Debug, Clone)]
pub struct ImageSearchClient {
    endpoint: String,
    access_key: String,
    per_page: u32,
}

impl Default for ImageSearchClient {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_key: "demo".to_string(),
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl ImageSearchClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_access_key(mut self, key: impl Into<String>) -> Self {
        self.access_key = key.into();
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Search for images.
    ///
    /// Only a blank query is an error. Any service failure, or an empty
    /// answer, yields the demo placeholders instead.
    pub async fn search(&self, query: &str) -> Result<SearchResults> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::EmptyInput("search query is empty".to_string()));
        }

        match self.fetch(query).await {
            Ok(images) if !images.is_empty() => Ok(SearchResults {
                origin: ResultOrigin::Remote,
                images,
            }),
            Ok(_) => {
                log::info!("No remote images for '{}', using demo images", query);
                Ok(self.fallback(query))
            }
            Err(e) => {
                log::warn!("Image search failed, using demo images: {}", e);
                Ok(self.fallback(query))
            }
        }
    }

    fn fallback(&self, query: &str) -> SearchResults {
        SearchResults {
            origin: ResultOrigin::Demo,
            images: demo_images(query, self.per_page),
        }
    }

    #[cfg(feature = "network")]
    async fn fetch(&self, query: &str) -> Result<Vec<ImageResult>> {
        let per_page = self.per_page.to_string();
        let response = reqwest::Client::new()
            .get(&self.endpoint)
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("client_id", self.access_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        parse_response(&body)
    }

    #[cfg(not(feature = "network"))]
    async fn fetch(&self, _query: &str) -> Result<Vec<ImageResult>> {
        Err(Error::Network("built without network support".to_string()))
    }
}
