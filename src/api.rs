//! PokeAPI catalog client

use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::CatalogError;
use crate::state::{DetailRecord, ListEntry, ListPage};

#[derive(Clone, Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct ListResponse {
    count: u32,
    next: Option<String>,
    #[allow(dead_code)]
    previous: Option<String>,
    results: Vec<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u32,
    name: String,
    sprites: PokemonSprites,
    types: Vec<PokemonTypeSlot>,
    height: u32,
    weight: u32,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonSprites {
    front_default: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    #[serde(rename = "type")]
    type_info: NamedResource,
}

/// Everything the controller needs from the catalog.
///
/// Implemented over HTTP by [`CatalogClient`] and by in-memory fixtures in
/// tests.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// One page of the listing endpoint.
    async fn list_page(&self, limit: u32, offset: u32) -> Result<ListPage, CatalogError>;

    /// Follow an absolute `next` cursor.
    async fn list_page_at(&self, url: &str) -> Result<ListPage, CatalogError>;

    async fn fetch_detail(&self, url: &str) -> Result<DetailRecord, CatalogError>;

    /// Raw image bytes for a numeric entry id.
    async fn fetch_image(&self, id: &str) -> Result<Vec<u8>, CatalogError>;

    /// Raw image bytes from an absolute URL.
    async fn fetch_image_at(&self, url: &str) -> Result<Vec<u8>, CatalogError>;

    /// Detail URL for a name or numeric id.
    fn entry_url(&self, key: &str) -> String;
}

pub struct CatalogClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("api_base", &self.config.api_base)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    pub fn new(config: ClientConfig) -> Result<Self, CatalogError> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let http = builder
            .build()
            .map_err(|err| CatalogError::Network(err.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn list_url(&self, limit: u32, offset: u32) -> String {
        format!(
            "{}/pokemon?limit={limit}&offset={offset}",
            self.config.api_base
        )
    }

    pub fn image_url(&self, id: &str) -> String {
        format!("{}/{id}.png", self.config.image_host)
    }

    async fn fetch_list(&self, url: &str, limit: Option<u32>) -> Result<ListPage, CatalogError> {
        let response: ListResponse = self.fetch_json(url).await?;
        let mut entries: Vec<ListEntry> = response
            .results
            .into_iter()
            .map(|entry| ListEntry {
                name: entry.name,
                url: entry.url,
            })
            .collect();
        // upstream clamps limit on its own terms
        if let Some(limit) = limit {
            entries.truncate(limit as usize);
        }
        debug!(url = %url, entries = entries.len(), next = ?response.next, "list page");
        Ok(ListPage {
            count: response.count,
            entries,
            next: response.next,
        })
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        debug!(url = %url, "catalog request");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(url = %url, status = status.as_u16(), "catalog request failed");
            return Err(CatalogError::Http {
                status: status.as_u16(),
            });
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.contains("application/json") {
            return Err(CatalogError::UnexpectedContentType(content_type));
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| CatalogError::Decode(err.to_string()))
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn list_page(&self, limit: u32, offset: u32) -> Result<ListPage, CatalogError> {
        let url = self.list_url(limit, offset);
        self.fetch_list(&url, Some(limit)).await
    }

    async fn list_page_at(&self, url: &str) -> Result<ListPage, CatalogError> {
        self.fetch_list(url, None).await
    }

    async fn fetch_detail(&self, url: &str) -> Result<DetailRecord, CatalogError> {
        let response: PokemonResponse = self.fetch_json(url).await?;
        Ok(DetailRecord {
            id: response.id,
            name: response.name,
            sprite_url: response.sprites.front_default,
            types: response
                .types
                .into_iter()
                .map(|slot| slot.type_info.name)
                .collect(),
            height: response.height,
            weight: response.weight,
        })
    }

    async fn fetch_image(&self, id: &str) -> Result<Vec<u8>, CatalogError> {
        self.fetch_image_at(&self.image_url(id)).await
    }

    async fn fetch_image_at(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        debug!(url = %url, "image request");
        let response = self.http.get(url).send().await?;
        let response = response.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    fn entry_url(&self, key: &str) -> String {
        format!("{}/pokemon/{key}/", self.config.api_base)
    }
}

/// Offset query parameter of a cursor URL, 0 when absent.
pub fn offset_from_cursor(cursor: &str) -> u32 {
    reqwest::Url::parse(cursor)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "offset")
                .and_then(|(_, value)| value.parse().ok())
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn client(server: &MockServer) -> CatalogClient {
        CatalogClient::new(ClientConfig::with_base(&server.base_url())).unwrap()
    }

    fn list_body(server: &MockServer, names: &[&str], next: Option<&str>) -> serde_json::Value {
        let results: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                json!({
                    "name": name,
                    "url": server.url(format!("/pokemon/{}/", i + 1)),
                })
            })
            .collect();
        json!({
            "count": 1302,
            "next": next,
            "previous": null,
            "results": results,
        })
    }

    #[tokio::test]
    async fn list_page_maps_results_and_next() {
        let server = MockServer::start_async().await;
        let next = server.url("/pokemon?offset=2&limit=2");
        let body = list_body(&server, &["bulbasaur", "ivysaur"], Some(&next));
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/pokemon")
                .query_param("limit", "2")
                .query_param("offset", "0");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(body);
        });

        let page = client(&server).list_page(2, 0).await.unwrap();
        mock.assert();
        assert_eq!(page.count, 1302);
        assert_eq!(page.next, Some(next));
        assert_eq!(
            page.entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            vec!["bulbasaur", "ivysaur"]
        );
        assert_eq!(page.entries[1].numeric_id(), Some("2"));
    }

    #[tokio::test]
    async fn list_page_never_exceeds_limit() {
        let server = MockServer::start_async().await;
        let body = list_body(&server, &["a", "b", "c"], None);
        server.mock(|when, then| {
            when.method(GET).path("/pokemon");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(body);
        });

        let page = client(&server).list_page(2, 0).await.unwrap();
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.next, None);
    }

    #[tokio::test]
    async fn non_success_status_is_http_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pokemon");
            then.status(500);
        });

        let err = client(&server).list_page(20, 0).await.unwrap_err();
        assert_eq!(err, CatalogError::Http { status: 500 });
    }

    #[tokio::test]
    async fn html_body_is_unexpected_content_type() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pokemon/pikachu/");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html>maintenance</html>");
        });

        let c = client(&server);
        let err = c.fetch_detail(&c.entry_url("pikachu")).await.unwrap_err();
        assert!(matches!(err, CatalogError::UnexpectedContentType(ref ct) if ct == "text/html"));
    }

    #[tokio::test]
    async fn malformed_json_is_decode_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pokemon");
            then.status(200)
                .header("content-type", "application/json")
                .body("{\"count\": \"lots\"}");
        });

        let err = client(&server).list_page(20, 0).await.unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
    }

    #[tokio::test]
    async fn missing_entry_is_not_found() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pokemon/missingno/");
            then.status(404);
        });

        let c = client(&server);
        let err = c.fetch_detail(&c.entry_url("missingno")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn fetch_detail_flattens_types_and_sprite() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/pokemon/25/");
            then.status(200)
                .header("content-type", "application/json; charset=utf-8")
                .json_body(json!({
                    "id": 25,
                    "name": "pikachu",
                    "sprites": { "front_default": "https://img/25.png", "back_default": null },
                    "types": [
                        { "slot": 1, "type": { "name": "electric", "url": "https://x/type/13/" } }
                    ],
                    "height": 4,
                    "weight": 60,
                    "base_experience": 112
                }));
        });

        let c = client(&server);
        let detail = c.fetch_detail(&c.entry_url("25")).await.unwrap();
        mock.assert();
        assert_eq!(
            detail,
            DetailRecord {
                id: 25,
                name: "pikachu".into(),
                sprite_url: Some("https://img/25.png".into()),
                types: vec!["electric".into()],
                height: 4,
                weight: 60,
            }
        );
    }

    #[tokio::test]
    async fn fetch_image_reads_from_image_host() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/sprites/25.png");
            then.status(200)
                .header("content-type", "image/png")
                .body(vec![1u8, 2, 3]);
        });

        let bytes = client(&server).fetch_image("25").await.unwrap();
        mock.assert();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn missing_image_at_url_is_http_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/media/25.png");
            then.status(404);
        });

        let err = client(&server)
            .fetch_image_at(&server.url("/media/25.png"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let c = CatalogClient::new(ClientConfig::with_base("http://127.0.0.1:1")).unwrap();
        let err = c.list_page(20, 0).await.unwrap_err();
        assert!(matches!(err, CatalogError::Network(_)));
    }

    #[test]
    fn offset_is_read_from_cursor() {
        assert_eq!(
            offset_from_cursor("https://pokeapi.co/api/v2/pokemon?offset=1000&limit=1000"),
            1000
        );
        assert_eq!(offset_from_cursor("https://pokeapi.co/api/v2/pokemon"), 0);
        assert_eq!(offset_from_cursor("https://x/pokemon?offset=abc"), 0);
        assert_eq!(offset_from_cursor("not a url"), 0);
    }
}
