//! [`PersistenceGateway`] over the JSON CRUD API.
//!
//! | Call   | Request                               | Response body            |
//! |--------|---------------------------------------|--------------------------|
//! | create | `POST   {api}/tours/{tour}/blocks`    | `{"block": WireBlock}`   |
//! | update | `PATCH  {api}/blocks/{id}`            | `{"block": WireBlock}`   |
//! | delete | `DELETE {api}/blocks/{id}`            | ignored                  |
//! | list   | `GET    {api}/tours/{tour}/blocks`    | `{"blocks": [WireBlock]}`|
//!
//! Every request carries `Authorization: Bearer <token>`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use tourbook_blocks::wire::{NewBlockBody, UpdateBlockBody};
use tourbook_blocks::{Block, BlockContent, BlockId, TourId, WireBlock};

use crate::auth::AccessToken;
use crate::config::ClientConfig;
use crate::gateway::{GatewayError, PersistenceGateway};

#[derive(Deserialize)]
struct BlockEnvelope {
    block: WireBlock,
}

/// Listed blocks stay raw until each is decoded on its own, so one entry
/// with an unknown type or a missing id cannot sink the whole listing.
#[derive(Deserialize)]
struct BlocksEnvelope {
    #[serde(default)]
    blocks: Option<Vec<serde_json::Value>>,
}

impl BlocksEnvelope {
    fn into_blocks(self) -> Vec<Block> {
        self.blocks
            .unwrap_or_default()
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<WireBlock>(raw) {
                Ok(wire) => Some(wire.into_block()),
                Err(e) => {
                    warn!("skipping unreadable block in listing: {e}");
                    None
                }
            })
            .collect()
    }
}

/// HTTP client for the block CRUD API.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    api_url: String,
}

impl HttpGateway {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, GatewayError> {
        Self::new(config.api_url.clone(), config.timeout())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }

    async fn send(&self, request: RequestBuilder, token: &AccessToken) -> Result<Response, GatewayError> {
        let response = request
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(%status, url = %response.url(), "block api response");
        match status {
            s if s.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(GatewayError::NotFound),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(GatewayError::Unauthorized),
            s => Err(GatewayError::Status {
                status: s.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        token: &AccessToken,
    ) -> Result<T, GatewayError> {
        self.send(request, token)
            .await?
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PersistenceGateway for HttpGateway {
    async fn create(
        &self,
        token: &AccessToken,
        tour_id: TourId,
        order_index: i64,
        content: &BlockContent,
    ) -> Result<Block, GatewayError> {
        let body = NewBlockBody::new(tour_id, order_index, content);
        let request = self
            .client
            .post(self.url(&format!("tours/{tour_id}/blocks")))
            .json(&body);
        let envelope: BlockEnvelope = self.send_json(request, token).await?;
        Ok(envelope.block.into_block())
    }

    async fn update(
        &self,
        token: &AccessToken,
        id: BlockId,
        content: &BlockContent,
        order_index: i64,
    ) -> Result<Block, GatewayError> {
        let body = UpdateBlockBody::new(content, order_index);
        let request = self.client.patch(self.url(&format!("blocks/{id}"))).json(&body);
        let envelope: BlockEnvelope = self.send_json(request, token).await?;
        Ok(envelope.block.into_block())
    }

    async fn delete(&self, token: &AccessToken, id: BlockId) -> Result<(), GatewayError> {
        let request = self.client.delete(self.url(&format!("blocks/{id}")));
        self.send(request, token).await?;
        Ok(())
    }

    async fn list(&self, token: &AccessToken, tour_id: TourId) -> Result<Vec<Block>, GatewayError> {
        let request = self.client.get(self.url(&format!("tours/{tour_id}/blocks")));
        let envelope: BlocksEnvelope = self.send_json(request, token).await?;
        Ok(envelope.into_blocks())
    }
}
