//! HTTP implementation of the persistence bridge.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::bridge::{BridgeError, PersistenceBridge};
use super::models::*;
use crate::collection::{CollectionId, EntryId};
use crate::view::ViewState;

/// Playlist server client.
#[derive(Debug, Clone)]
pub struct HttpBridge {
    /// HTTP client
    client: Client,

    /// Base server URL
    base_url: String,

    /// Bearer token, if the server wants one
    api_key: Option<String>,
}

impl HttpBridge {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// Build the URL for a playlist entries endpoint with query parameters.
    fn build_url(
        &self,
        collection_id: CollectionId,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> String {
        let mut url = format!("{}/api/playlists/{}/entries", self.base_url, collection_id);
        if !endpoint.is_empty() {
            url.push('/');
            url.push_str(endpoint);
        }

        if !params.is_empty() {
            let query: Vec<String> = params
                .iter()
                .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
                .collect();
            url.push('?');
            url.push_str(&query.join("&"));
        }
        url
    }

    /// Query parameters describing a view.
    fn view_params(view: &ViewState) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("sort", view.sort_column().as_str().to_string()),
            ("dir", view.sort_direction.as_str().to_string()),
            ("show_hidden", view.show_hidden.to_string()),
        ];
        if view.has_filter() {
            params.push(("filter", view.filter.trim().to_string()));
        }
        if let Some(seed) = view.random_seed() {
            params.push(("seed", seed.to_string()));
        }
        params
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Turn non-2xx responses into errors, using the server's message if it
    /// sent one.
    async fn check(response: Response) -> Result<Response, BridgeError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| body.error)
            .unwrap_or_else(|_| text.chars().take(200).collect());
        Err(BridgeError::Server {
            status: status.as_u16(),
            message,
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, BridgeError> {
        debug!("GET {}", url);
        let response = Self::check(self.request(Method::GET, url).send().await?).await?;
        let text = response.text().await?;

        serde_json::from_str(&text).map_err(|e| {
            BridgeError::InvalidResponse(format!(
                "Failed to parse response: {}. Body: {}",
                e,
                text.chars().take(500).collect::<String>()
            ))
        })
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: &B,
    ) -> Result<(), BridgeError> {
        debug!("{} {}", method, url);
        let response = self.request(method, url).json(body).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

impl PersistenceBridge for HttpBridge {
    async fn get_count(
        &self,
        collection_id: CollectionId,
        view: &ViewState,
    ) -> Result<usize, BridgeError> {
        let url = self.build_url(collection_id, "count", &Self::view_params(view));
        let response: CountResponse = self.get(&url).await?;
        Ok(response.total)
    }

    async fn get_range(
        &self,
        collection_id: CollectionId,
        view: &ViewState,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ApiEntry>, BridgeError> {
        let mut params = Self::view_params(view);
        params.push(("offset", offset.to_string()));
        params.push(("limit", limit.to_string()));

        let url = self.build_url(collection_id, "", &params);
        let response: RangeResponse = self.get(&url).await?;
        Ok(response.entries)
    }

    async fn add_entries(
        &self,
        collection_id: CollectionId,
        entries: &[ApiEntry],
    ) -> Result<(), BridgeError> {
        let url = self.build_url(collection_id, "add", &[]);
        self.send(Method::POST, &url, &EntriesBody { entries }).await
    }

    async fn remove_entries(
        &self,
        collection_id: CollectionId,
        entries: &[ApiEntry],
    ) -> Result<(), BridgeError> {
        let url = self.build_url(collection_id, "remove", &[]);
        self.send(Method::POST, &url, &EntriesBody { entries }).await
    }

    async fn reorder_entries(
        &self,
        collection_id: CollectionId,
        entries: &[ApiEntry],
        destination: usize,
    ) -> Result<(), BridgeError> {
        let url = self.build_url(collection_id, "reorder", &[]);
        let body = ReorderBody {
            entries,
            new_position: destination,
        };
        self.send(Method::POST, &url, &body).await
    }

    async fn set_hidden(
        &self,
        collection_id: CollectionId,
        entry_ids: &[EntryId],
        hidden: bool,
    ) -> Result<(), BridgeError> {
        let url = self.build_url(collection_id, "hide", &[]);
        let body = HideBody {
            entry_ids,
            is_hidden: hidden,
        };
        self.send(Method::POST, &url, &body).await
    }

    async fn update_notes(
        &self,
        collection_id: CollectionId,
        entry_id: EntryId,
        notes: &str,
    ) -> Result<(), BridgeError> {
        let url = self.build_url(collection_id, &format!("{}/notes", entry_id), &[]);
        self.send(Method::PATCH, &url, &NotesBody { notes }).await
    }

    async fn replace_entry(
        &self,
        collection_id: CollectionId,
        entry_id: EntryId,
        entry: &ApiEntry,
    ) -> Result<(), BridgeError> {
        let url = self.build_url(collection_id, &entry_id.to_string(), &[]);
        self.send(Method::PUT, &url, entry).await
    }
}
