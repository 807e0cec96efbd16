//! xkcd JSON API adapter.
//!
//! `GET {base}/info.0.json` returns the latest comic; `GET {base}/{n}/info.0.json`
//! returns comic `n`. A random comic is a uniform pick in `1..=latest`.

use crate::provider::{ContentProvider, ProviderError, RemoteContent};
use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://xkcd.com";
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// xkcd never published a comic 404.
const MISSING_COMIC: u32 = 404;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct XkcdComic {
    num: u32,
    title: String,
    safe_title: String,
    alt: String,
    img: String,
    #[serde(default)]
    transcript: String,
}

impl From<XkcdComic> for RemoteContent {
    fn from(comic: XkcdComic) -> Self {
        Self {
            number: comic.num,
            title: comic.title,
            safe_title: comic.safe_title,
            alt: comic.alt,
            image_url: comic.img,
            transcript: comic.transcript,
        }
    }
}

#[derive(Debug, Clone)]
pub struct XkcdProvider {
    client: Client,
    base_url: String,
}

impl XkcdProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("http client setup failed: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_comic(&self, url: String) -> Result<RemoteContent, ProviderError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Unavailable(format!(
                "GET {url} returned status {status}"
            )));
        }

        let comic: XkcdComic = response
            .json()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("GET {url}: invalid payload: {e}")))?;
        Ok(comic.into())
    }
}

#[async_trait]
impl ContentProvider for XkcdProvider {
    async fn fetch_by_id(&self, number: u32) -> Result<RemoteContent, ProviderError> {
        self.get_comic(format!("{}/{number}/info.0.json", self.base_url))
            .await
    }

    async fn fetch_random(&self) -> Result<RemoteContent, ProviderError> {
        let latest = self
            .get_comic(format!("{}/info.0.json", self.base_url))
            .await?;
        let number = {
            let mut rng = rand::thread_rng();
            pick_number(latest.number, &mut rng)
        };
        if number == latest.number {
            return Ok(latest);
        }
        self.fetch_by_id(number).await
    }
}

fn pick_number(latest: u32, rng: &mut impl Rng) -> u32 {
    if latest <= 1 {
        return latest;
    }
    loop {
        let number = rng.gen_range(1..=latest);
        if number != MISSING_COMIC {
            return number;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::Router;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    const STUB_LATEST: u32 = 5;
    const STUB_MALFORMED: u32 = 6;
    const STUB_SLOW: u32 = 7;

    fn comic_json(num: u32) -> serde_json::Value {
        json!({
            "num": num,
            "title": format!("Comic {num}"),
            "safe_title": format!("Comic {num}"),
            "alt": format!("alt {num}"),
            "img": format!("https://imgs.example/{num}.png"),
            "transcript": "",
            "year": "2024",
            "month": "1",
            "day": "1"
        })
    }

    async fn latest() -> Json<serde_json::Value> {
        Json(comic_json(STUB_LATEST))
    }

    async fn by_number(Path(num): Path<u32>) -> Response {
        match num {
            STUB_MALFORMED => (StatusCode::OK, "{\"num\": ").into_response(),
            STUB_SLOW => {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(comic_json(num)).into_response()
            }
            1..=STUB_LATEST => Json(comic_json(num)).into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn spawn_stub() -> String {
        let app = Router::new()
            .route("/info.0.json", get(latest))
            .route("/{num}/info.0.json", get(by_number));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("stub should bind");
        let addr = listener.local_addr().expect("stub should have an address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}/")
    }

    fn provider(base_url: String, timeout_ms: u64) -> XkcdProvider {
        XkcdProvider::new(&ProviderConfig {
            base_url,
            timeout_ms,
        })
        .expect("provider should build")
    }

    #[tokio::test]
    async fn fetch_by_id_maps_payload_fields() {
        let provider = provider(spawn_stub().await, 2_000);
        let content = provider.fetch_by_id(2).await.expect("comic 2 should load");
        assert_eq!(content.number, 2);
        assert_eq!(content.safe_title, "Comic 2");
        assert_eq!(content.alt, "alt 2");
        assert_eq!(content.image_url, "https://imgs.example/2.png");
    }

    #[tokio::test]
    async fn out_of_range_number_is_unavailable() {
        let provider = provider(spawn_stub().await, 2_000);
        let err = provider.fetch_by_id(999).await.expect_err("999 should 404");
        assert!(matches!(err, ProviderError::Unavailable(ref msg) if msg.contains("404")));
    }

    #[tokio::test]
    async fn malformed_payload_is_unavailable() {
        let provider = provider(spawn_stub().await, 2_000);
        let err = provider
            .fetch_by_id(STUB_MALFORMED)
            .await
            .expect_err("truncated JSON should fail");
        assert!(matches!(err, ProviderError::Unavailable(ref msg) if msg.contains("invalid payload")));
    }

    #[tokio::test]
    async fn slow_response_times_out_as_unavailable() {
        let provider = provider(spawn_stub().await, 200);
        let err = provider
            .fetch_by_id(STUB_SLOW)
            .await
            .expect_err("slow comic should time out");
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }

    #[tokio::test]
    async fn unreachable_provider_is_unavailable() {
        let provider = provider("http://127.0.0.1:1".to_string(), 500);
        assert!(provider.fetch_random().await.is_err());
    }

    #[tokio::test]
    async fn fetch_random_stays_within_published_range() {
        let provider = provider(spawn_stub().await, 2_000);
        for _ in 0..10 {
            let content = provider.fetch_random().await.expect("random should load");
            assert!((1..=STUB_LATEST).contains(&content.number));
        }
    }

    #[test]
    fn pick_number_never_returns_missing_comic() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let number = pick_number(405, &mut rng);
            assert!((1..=405).contains(&number));
            assert_ne!(number, MISSING_COMIC);
        }
        assert_eq!(pick_number(1, &mut rng), 1);
        assert_eq!(pick_number(0, &mut rng), 0);
    }
}
