//! Account session backed by an HTTP/WebSocket gateway.
//!
//! The gateway is a sidecar that holds the authorized messaging-network
//! session. Lookups go over HTTP; the live status feed is a WebSocket of
//! JSON text frames.

use async_trait::async_trait;
use futures::{StreamExt, future};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{StatusCode, Url};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tracing::{debug, info, warn};

use relay_core::config::GatewayConfig;
use relay_core::error::{AppError, ErrorKind};
use relay_core::events::AccountStatus;
use relay_core::result::AppResult;
use relay_core::traits::{AccountSession, StatusEventStream};
use relay_core::types::Identity;

use crate::wire::{GatewayStatus, ImportContactRequest, ImportContactResponse, parse_update};

const API_ID_HEADER: &str = "x-api-id";
const API_HASH_HEADER: &str = "x-api-hash";
const SESSION_HEADER: &str = "x-session-name";

/// Account session client for the gateway.
#[derive(Debug, Clone)]
pub struct GatewaySession {
    /// HTTP client with credentials attached as default headers.
    client: reqwest::Client,
    /// Base URL without trailing slash.
    base_url: String,
    /// WebSocket URL of the update feed.
    updates_url: String,
    /// Credential headers, replayed on the WebSocket handshake.
    headers: HeaderMap,
}

impl GatewaySession {
    /// Build a client from configuration. No request is made until the
    /// first lookup.
    pub fn new(config: &GatewayConfig) -> AppResult<Self> {
        let headers = credential_headers(config)?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers.clone())
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build gateway client: {e}"),
                    e,
                )
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            updates_url: config.resolved_updates_url(),
            headers,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> AppResult<T> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| request_error(&url, e))?;
        decode(response).await
    }
}

#[async_trait]
impl AccountSession for GatewaySession {
    async fn resolve_identity(&self, identifier: &str) -> AppResult<Identity> {
        let url = Url::parse_with_params(
            &self.endpoint("/v1/contacts/resolve"),
            &[("identifier", identifier)],
        )
        .map_err(|e| AppError::configuration(format!("Invalid gateway URL: {e}")))?;

        let identity: Identity = self.get_json(url).await.map_err(|e| {
            if e.kind == ErrorKind::NotFound {
                AppError::resolution(format!("Identity '{identifier}' could not be resolved"))
            } else {
                e
            }
        })?;

        debug!(account_id = %identity.id, "Identity resolved directly");
        Ok(identity)
    }

    async fn import_and_resolve(
        &self,
        identifier: &str,
        display_name: &str,
    ) -> AppResult<Identity> {
        let url = self.endpoint("/v1/contacts/import");
        let body = ImportContactRequest {
            identifier: identifier.to_string(),
            first_name: display_name.to_string(),
            last_name: String::new(),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("Gateway request to {url} failed: {e}")))?;

        let imported: ImportContactResponse = decode(response).await?;
        let identity = imported.users.into_iter().next().ok_or_else(|| {
            AppError::resolution(format!(
                "Importing '{identifier}' as a contact did not yield an account"
            ))
        })?;

        info!(account_id = %identity.id, "Identity resolved through contact import");
        Ok(identity)
    }

    async fn current_status(&self, identity: &Identity) -> AppResult<AccountStatus> {
        let url = Url::parse(&self.endpoint(&format!("/v1/users/{}/status", identity.id)))
            .map_err(|e| AppError::configuration(format!("Invalid gateway URL: {e}")))?;
        let status: GatewayStatus = self.get_json(url).await?;
        Ok(status.into_account_status())
    }

    async fn status_events(&self) -> AppResult<StatusEventStream> {
        let mut request = self.updates_url.as_str().into_client_request().map_err(|e| {
            AppError::configuration(format!("Invalid updates URL '{}': {e}", self.updates_url))
        })?;
        for (name, value) in &self.headers {
            request.headers_mut().insert(name.clone(), value.clone());
        }

        let (socket, _) = tokio_tungstenite::connect_async(request).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Failed to connect to update feed {}: {e}", self.updates_url),
                e,
            )
        })?;

        info!(url = %self.updates_url, "Subscribed to gateway update feed");

        let events = socket
            .take_while(|frame| {
                let open = match frame {
                    Ok(Message::Close(reason)) => {
                        info!(reason = ?reason, "Gateway closed the update feed");
                        false
                    }
                    Ok(_) => true,
                    Err(e) => {
                        warn!(error = %e, "Update feed error");
                        false
                    }
                };
                future::ready(open)
            })
            .filter_map(|frame| {
                let event = match frame {
                    Ok(Message::Text(text)) => parse_update(text.as_str()),
                    _ => None,
                };
                future::ready(event)
            });

        Ok(events.boxed())
    }
}

fn credential_headers(config: &GatewayConfig) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    let pairs = [
        (API_ID_HEADER, config.api_id.to_string()),
        (API_HASH_HEADER, config.api_hash.clone()),
        (SESSION_HEADER, config.session_name.clone()),
    ];

    for (name, value) in pairs {
        if value.is_empty() {
            continue;
        }
        let value = HeaderValue::from_str(&value)
            .map_err(|_| AppError::configuration(format!("Invalid value for {name}")))?;
        headers.insert(HeaderName::from_static(name), value);
    }

    Ok(headers)
}

fn request_error(url: &Url, err: reqwest::Error) -> AppError {
    AppError::external_service(format!("Gateway request to {url} failed: {err}"))
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(AppError::not_found(format!(
            "Gateway returned 404 for {}",
            response.url()
        )));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::external_service(format!(
            "Gateway returned {status}: {body}"
        )));
    }

    response.json::<T>().await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Serialization,
            format!("Invalid gateway response: {e}"),
            e,
        )
    })
}
