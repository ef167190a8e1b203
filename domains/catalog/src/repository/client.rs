//! Remote Entity Repository Implementation
//!
//! Talks to the Atrium REST backend:
//! - `GET    {base_url}/tenants/{tenant}/{collection}`
//! - `PATCH  {base_url}/entities/{id}`
//! - `DELETE {base_url}/entities/{id}`
//! - `POST   {base_url}/entities/{id}/status`
//!
//! Every decoded entity is validated before it leaves this module.

use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use atrium_common::RepositoryError;

use crate::domain::entities::{Entity, EntityPatch, ScopeId};
use crate::repository::EntityRepository;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusChangeRequest<'a> {
    status: &'a str,
}

/// HTTP client for the entity REST backend.
pub struct RemoteEntityRepository {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl RemoteEntityRepository {
    /// Create a new remote repository.
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Append path segments to the base URL. Each segment is percent-encoded,
    /// so ids containing `/`, `?` or `#` stay a single segment.
    fn url(&self, segments: &[&str]) -> Result<Url, RepositoryError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            RepositoryError::Transport(format!("Invalid base URL '{}': {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                RepositoryError::Transport(format!(
                    "Base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, RepositoryError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| RepositoryError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response body".to_string());
        tracing::warn!(status = %status, body = %body, "Entity backend returned an error");

        Err(match status {
            StatusCode::NOT_FOUND => RepositoryError::NotFound,
            StatusCode::CONFLICT => RepositoryError::Conflict(body),
            _ => RepositoryError::Rejected {
                status: status.as_u16(),
                message: body,
            },
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RepositoryError> {
        response
            .json::<T>()
            .await
            .map_err(|e| RepositoryError::InvalidData(format!("Malformed response body: {e}")))
    }
}

fn checked(entity: Entity) -> Result<Entity, RepositoryError> {
    entity
        .validate()
        .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;
    Ok(entity)
}

#[async_trait::async_trait]
impl EntityRepository for RemoteEntityRepository {
    async fn fetch_collection(&self, scope: &ScopeId) -> Result<Vec<Entity>, RepositoryError> {
        let url = self.url(&[
            "tenants",
            scope.tenant_id.as_str(),
            scope.entity_type.collection_path(),
        ])?;
        let response = self.send(self.http.get(url)).await?;
        let entities: Vec<Entity> = Self::decode(response).await?;

        let entities = entities
            .into_iter()
            .map(|entity| {
                if entity.entity_type != scope.entity_type {
                    return Err(RepositoryError::InvalidData(format!(
                        "Entity '{}' has type {} in a {} collection",
                        entity.id, entity.entity_type, scope.entity_type
                    )));
                }
                checked(entity)
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(scope = %scope, count = entities.len(), "Fetched entity collection");
        Ok(entities)
    }

    async fn mutate(
        &self,
        entity_id: &str,
        patch: &EntityPatch,
    ) -> Result<Entity, RepositoryError> {
        let response = self
            .send(self.http.patch(self.url(&["entities", entity_id])?).json(patch))
            .await?;
        checked(Self::decode(response).await?)
    }

    async fn remove(&self, entity_id: &str) -> Result<(), RepositoryError> {
        self.send(self.http.delete(self.url(&["entities", entity_id])?))
            .await?;
        tracing::debug!(entity_id = %entity_id, "Entity removed");
        Ok(())
    }

    async fn change_status(
        &self,
        entity_id: &str,
        new_status: &str,
    ) -> Result<Entity, RepositoryError> {
        let url = self.url(&["entities", entity_id, "status"])?;
        let response = self
            .send(
                self.http
                    .post(url)
                    .json(&StatusChangeRequest { status: new_status }),
            )
            .await?;
        checked(Self::decode(response).await?)
    }
}
