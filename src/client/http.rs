use super::changes::changed_fields;
use super::{CredentialTypeApi, DeleteResult, ModifyResult, PingResult, RemoteError};
use crate::connection::{ConnectionError, ConnectionSettings};
use crate::descriptor::{CredentialKind, CredentialTypeDescriptor};
use crate::utils::{API_PREFIX, CREDENTIAL_TYPES_ENDPOINT, PING_ENDPOINT};
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

enum Auth {
    Basic {
        username: String,
        password: Option<String>,
    },
    Bearer {
        token: String,
    },
}

/// Tower REST client for the credential type endpoints
pub struct TowerClient {
    http: reqwest::Client,
    base_url: String,
    auth: Option<Auth>,
}

#[derive(Deserialize)]
struct ListPage {
    count: usize,
    results: Vec<Value>,
}

#[derive(Deserialize)]
struct PingBody {
    version: String,
}

impl TowerClient {
    /// Build a client for the given settings. Makes no network calls.
    pub fn new(settings: &ConnectionSettings) -> Result<Self, ConnectionError> {
        let base_url = api_base_url(&settings.host)?;

        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!settings.verify_ssl)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let auth = match (&settings.oauth_token, &settings.username) {
            (Some(token), _) => Some(Auth::Bearer {
                token: token.clone(),
            }),
            (None, Some(username)) => Some(Auth::Basic {
                username: username.clone(),
                password: settings.password.clone(),
            }),
            (None, None) => None,
        };

        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn record_url(&self, id: u64) -> String {
        self.url(&format!("{}{}/", CREDENTIAL_TYPES_ENDPOINT, id))
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let req = self.http.request(method, url);
        let req = match &self.auth {
            Some(Auth::Basic { username, password }) => req.basic_auth(username, password.as_ref()),
            Some(Auth::Bearer { token }) => req.bearer_auth(token),
            None => req,
        };
        req.header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<Value, RemoteError> {
        let resp = req.send().await?;
        handle_response(resp).await
    }

    /// Find the single record with this identity
    async fn lookup(&self, name: &str, kind: CredentialKind) -> Result<Option<Value>, RemoteError> {
        let url = self.url(CREDENTIAL_TYPES_ENDPOINT);
        let body = self
            .send(
                self.request(Method::GET, &url)
                    .query(&[("name", name), ("kind", kind.as_str())]),
            )
            .await?;
        let page: ListPage = serde_json::from_value(body)?;

        match page.results.len() {
            0 => Ok(None),
            1 => Ok(page.results.into_iter().next()),
            _ => Err(RemoteError::MultipleResults {
                name: name.to_string(),
                kind: kind.to_string(),
                count: page.count,
            }),
        }
    }

    async fn create(&self, descriptor: &CredentialTypeDescriptor) -> Result<u64, RemoteError> {
        let body = serde_json::to_value(descriptor)?;
        let url = self.url(CREDENTIAL_TYPES_ENDPOINT);
        let created = self
            .send(self.request(Method::POST, &url).json(&body))
            .await?;
        record_id(&created)
    }

    async fn update(&self, id: u64, changes: &Map<String, Value>) -> Result<(), RemoteError> {
        let url = self.record_url(id);
        self.send(self.request(Method::PATCH, &url).json(changes))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialTypeApi for TowerClient {
    async fn modify(
        &self,
        descriptor: &CredentialTypeDescriptor,
        create_on_missing: bool,
    ) -> Result<ModifyResult, RemoteError> {
        let Some(existing) = self.lookup(&descriptor.name, descriptor.kind).await? else {
            if !create_on_missing {
                return Err(RemoteError::NotFound(format!(
                    "credential type {:?} of kind {}",
                    descriptor.name, descriptor.kind
                )));
            }
            let id = self.create(descriptor).await?;
            info!(name = %descriptor.name, kind = %descriptor.kind, id, "Created credential type");
            return Ok(ModifyResult { id, changed: true });
        };

        let id = record_id(&existing)?;
        let desired = descriptor.managed_fields()?;
        let changes = changed_fields(&desired, &existing);

        if changes.is_empty() {
            debug!(name = %descriptor.name, id, "Credential type already up to date");
            return Ok(ModifyResult { id, changed: false });
        }

        let fields: Vec<&str> = changes.keys().map(String::as_str).collect();
        info!(name = %descriptor.name, id, fields = ?fields, "Updating credential type");
        self.update(id, &changes).await?;
        Ok(ModifyResult { id, changed: true })
    }

    async fn delete(&self, name: &str, kind: CredentialKind) -> Result<DeleteResult, RemoteError> {
        let Some(existing) = self.lookup(name, kind).await? else {
            debug!(name, %kind, "Credential type already absent");
            return Ok(DeleteResult {
                id: None,
                changed: false,
            });
        };

        let id = record_id(&existing)?;
        let url = self.record_url(id);
        self.send(self.request(Method::DELETE, &url)).await?;
        info!(name, %kind, id, "Deleted credential type");
        Ok(DeleteResult {
            id: Some(id),
            changed: true,
        })
    }

    async fn ping(&self) -> Result<PingResult, RemoteError> {
        let url = self.url(PING_ENDPOINT);
        let body = self.send(self.request(Method::GET, &url)).await?;
        let ping: PingBody = serde_json::from_value(body)?;
        Ok(PingResult {
            version: ping.version,
        })
    }
}

/// `https://` is assumed when the host has no scheme, as tower-cli does
fn api_base_url(host: &str) -> Result<String, ConnectionError> {
    let host = host.trim().trim_end_matches('/');
    let with_scheme = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    };
    let base = format!("{}/{}", with_scheme, API_PREFIX);

    Url::parse(&base).map_err(|e| ConnectionError::InvalidHost(host.to_string(), e))?;
    Ok(base)
}

fn record_id(record: &Value) -> Result<u64, RemoteError> {
    record
        .get("id")
        .and_then(Value::as_u64)
        .ok_or_else(|| RemoteError::Decode("credential type record has no id".to_string()))
}

async fn handle_response(resp: reqwest::Response) -> Result<Value, RemoteError> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(RemoteError::from_status(status, &body));
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_url_defaults_to_https() {
        assert_eq!(
            api_base_url("tower.example.com").unwrap(),
            "https://tower.example.com/api/v2/"
        );
    }

    #[test]
    fn test_api_base_url_keeps_scheme_and_path() {
        assert_eq!(
            api_base_url("http://10.0.0.5:8052/tower/").unwrap(),
            "http://10.0.0.5:8052/tower/api/v2/"
        );
    }

    #[test]
    fn test_api_base_url_rejects_garbage() {
        assert!(matches!(
            api_base_url("http://exa mple.com"),
            Err(ConnectionError::InvalidHost(_, _))
        ));
    }

    #[test]
    fn test_record_id_requires_numeric_id() {
        assert_eq!(record_id(&serde_json::json!({"id": 12})).unwrap(), 12);
        assert!(record_id(&serde_json::json!({"id": "12"})).is_err());
    }
}
