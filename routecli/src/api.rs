//! API client
//!
//! Centralizes all HTTP calls to the backend REST API. Every call attaches
//! the stored bearer token; a 401 anywhere clears the local session and
//! surfaces as `ClientError::SessionExpired`, forcing the user back to login.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

use crate::editor::RouteBackend;
use crate::models::{Coordinate, RouteSummary, UserSummary};
use crate::session::SessionStore;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Any 401: the local session has already been cleared
    #[error("Sessão expirada")]
    SessionExpired,
    /// The server answered with success=false; carries its message
    #[error("{0}")]
    Api(String),
    /// Client-side rejection before any request was made
    #[error("{0}")]
    Invalid(String),
    #[error("erro de rede: {0}")]
    Http(#[from] reqwest::Error),
}

pub struct ApiClient {
    base: String,
    http: Client,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(base: String, session: SessionStore) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            http: Client::new(),
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        let mut req = self
            .http
            .request(method, format!("{}/api{}", self.base, path));

        if let Some(token) = self.session.token() {
            req = req.bearer_auth(token);
        }
        if let Some(b) = body {
            req = req.json(&b);
        }

        let res = req.send().await?;

        if res.status() == StatusCode::UNAUTHORIZED {
            if let Err(e) = self.session.clear() {
                warn!(error = %e, "Failed to clear session file after 401");
            }
            return Err(ClientError::SessionExpired);
        }

        let data: Value = res.json().await?;

        if !data["success"].as_bool().unwrap_or(false) {
            let message = data["message"]
                .as_str()
                .unwrap_or("Erro desconhecido")
                .to_string();
            return Err(ClientError::Api(message));
        }

        Ok(data)
    }

    fn store_session(&self, data: &Value) -> Result<UserSummary, ClientError> {
        let token = data["token"]
            .as_str()
            .ok_or_else(|| ClientError::Api("resposta sem token".to_string()))?;
        let user: UserSummary = serde_json::from_value(data["user"].clone())
            .map_err(|e| ClientError::Api(format!("resposta inválida: {}", e)))?;

        self.session
            .store(token, &user)
            .map_err(|e| ClientError::Invalid(format!("falha ao gravar sessão: {}", e)))?;

        Ok(user)
    }

    // ---- Auth ----

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserSummary, ClientError> {
        let data = self
            .request(
                Method::POST,
                "/auth/register",
                Some(json!({ "name": name, "email": email, "password": password })),
            )
            .await?;
        self.store_session(&data)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserSummary, ClientError> {
        let data = self
            .request(
                Method::POST,
                "/auth/login",
                Some(json!({ "email": email, "password": password })),
            )
            .await?;
        self.store_session(&data)
    }

    /// Purely client-side: the server keeps no session table
    pub fn logout(&self) -> Result<(), ClientError> {
        self.session
            .clear()
            .map_err(|e| ClientError::Invalid(format!("falha ao limpar sessão: {}", e)))
    }

    pub async fn me(&self) -> Result<UserSummary, ClientError> {
        let data = self.request(Method::GET, "/auth/me", None).await?;
        serde_json::from_value(data["user"].clone())
            .map_err(|e| ClientError::Api(format!("resposta inválida: {}", e)))
    }

    // ---- Routes ----

    pub async fn get_routes(&self) -> Result<Vec<RouteSummary>, ClientError> {
        let data = self.request(Method::GET, "/routes", None).await?;
        serde_json::from_value(data["data"].clone())
            .map_err(|e| ClientError::Api(format!("resposta inválida: {}", e)))
    }

    pub async fn get_route(&self, id: &str) -> Result<RouteSummary, ClientError> {
        let data = self
            .request(Method::GET, &format!("/routes/{}", id), None)
            .await?;
        serde_json::from_value(data["data"].clone())
            .map_err(|e| ClientError::Api(format!("resposta inválida: {}", e)))
    }

    pub async fn create_route(
        &self,
        name: &str,
        coordinates: &[Coordinate],
    ) -> Result<RouteSummary, ClientError> {
        let data = self
            .request(
                Method::POST,
                "/routes",
                Some(json!({ "name": name, "coordinates": coordinates })),
            )
            .await?;
        serde_json::from_value(data["data"].clone())
            .map_err(|e| ClientError::Api(format!("resposta inválida: {}", e)))
    }

    pub async fn update_route(
        &self,
        id: &str,
        name: &str,
        coordinates: &[Coordinate],
    ) -> Result<RouteSummary, ClientError> {
        let data = self
            .request(
                Method::PUT,
                &format!("/routes/{}", id),
                Some(json!({ "name": name, "coordinates": coordinates })),
            )
            .await?;
        serde_json::from_value(data["data"].clone())
            .map_err(|e| ClientError::Api(format!("resposta inválida: {}", e)))
    }

    pub async fn delete_route(&self, id: &str) -> Result<String, ClientError> {
        let data = self
            .request(Method::DELETE, &format!("/routes/{}", id), None)
            .await?;
        Ok(data["message"]
            .as_str()
            .unwrap_or("Rota excluída com sucesso")
            .to_string())
    }
}

#[async_trait]
impl RouteBackend for ApiClient {
    async fn list_routes(&self) -> Result<Vec<RouteSummary>, ClientError> {
        self.get_routes().await
    }

    async fn create_route(
        &self,
        name: &str,
        coordinates: &[Coordinate],
    ) -> Result<RouteSummary, ClientError> {
        ApiClient::create_route(self, name, coordinates).await
    }

    async fn delete_route(&self, id: &str) -> Result<(), ClientError> {
        ApiClient::delete_route(self, id).await.map(|_| ())
    }
}
