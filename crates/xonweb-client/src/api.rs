//! Typed client for the remote REST API
//!
//! Every request carries the stored bearer token when there is one. Error
//! responses are turned into [`ClientError::Api`] with the server's `detail`
//! text, and a 401 on an authenticated request drops the stored token.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use urlencoding::encode;
use xonweb_config::ApiConfig;
use xonweb_core::models::{
    GoogleAuthRequest, ItemNamesResponse, LoginRequest, RegisterRequest, SuppliersResponse,
    TaskStatusUpdate,
};
use xonweb_core::{
    Category, ItemStatus, LoginResponse, MessageResponse, Project, Task, TaskStatus, Transaction,
    TransactionSubmission, User, WorkReportInput,
};

use crate::backend::TransactionBackend;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionStore;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ==================== Plumbing ====================

    async fn execute(&self, request: RequestBuilder) -> ClientResult<reqwest::Response> {
        let token = self.session.token().await;
        let request = match &token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        log::debug!(target: "xonweb::api", "{} {}", status.as_u16(), response.url().path());

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = detail_from_body(&body);

        if status == StatusCode::UNAUTHORIZED {
            self.session.clear_token().await?;
            if token.is_some() {
                log::warn!(target: "xonweb::api", "session rejected by server, token cleared");
                return Err(ClientError::Unauthorized);
            }
        }

        Err(ClientError::Api {
            status: status.as_u16(),
            detail,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = self.execute(request).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode {
            message: e.to_string(),
        })
    }

    // ==================== Auth ====================

    pub async fn me(&self) -> ClientResult<User> {
        self.fetch(self.http.get(self.url("/auth/me"))).await
    }

    pub async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
        self.fetch(self.http.post(self.url("/auth/login")).json(request))
            .await
    }

    pub async fn google_login(&self, request: &GoogleAuthRequest) -> ClientResult<LoginResponse> {
        self.fetch(self.http.post(self.url("/auth/google")).json(request))
            .await
    }

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<MessageResponse> {
        self.fetch(self.http.post(self.url("/auth/register")).json(request))
            .await
    }

    pub async fn logout(&self) -> ClientResult<MessageResponse> {
        self.fetch(self.http.post(self.url("/auth/logout"))).await
    }

    // ==================== Projects & inventory ====================

    pub async fn projects(&self) -> ClientResult<Vec<Project>> {
        self.fetch(self.http.get(self.url("/projects"))).await
    }

    /// Known item names, optionally narrowed by category and project type
    pub async fn item_names(
        &self,
        category: Option<&Category>,
        project_type: Option<&str>,
    ) -> ClientResult<Vec<String>> {
        let mut query: Vec<(&str, &str)> = vec![];
        if let Some(category) = category {
            query.push(("category", category.as_str()));
        }
        if let Some(project_type) = project_type {
            query.push(("project_type", project_type));
        }
        let response: ItemNamesResponse = self
            .fetch(self.http.get(self.url("/inventory/item-names")).query(&query))
            .await?;
        Ok(response.item_names)
    }

    pub async fn suppliers(&self) -> ClientResult<Vec<String>> {
        let response: SuppliersResponse = self
            .fetch(self.http.get(self.url("/inventory/suppliers")))
            .await?;
        Ok(response.suppliers)
    }

    // ==================== Transactions ====================

    pub async fn transactions(&self) -> ClientResult<Vec<Transaction>> {
        self.fetch(self.http.get(self.url("/transactions"))).await
    }

    pub async fn create_transaction(
        &self,
        submission: &TransactionSubmission,
    ) -> ClientResult<MessageResponse> {
        self.fetch(self.http.post(self.url("/transactions")).json(submission))
            .await
    }

    pub async fn update_transaction(
        &self,
        id: &str,
        submission: &TransactionSubmission,
    ) -> ClientResult<MessageResponse> {
        let url = self.url(&format!("/transactions/{}", encode(id)));
        self.fetch(self.http.patch(url).json(submission)).await
    }

    pub async fn delete_transaction(&self, id: &str) -> ClientResult<MessageResponse> {
        let url = self.url(&format!("/transactions/{}", encode(id)));
        self.fetch(self.http.delete(url)).await
    }

    /// Move one line item between warehouse states; the server adjusts stock
    pub async fn update_item_status(
        &self,
        id: &str,
        item_index: usize,
        status: ItemStatus,
    ) -> ClientResult<MessageResponse> {
        let url = self.url(&format!("/transactions/{}/item-status", encode(id)));
        let index = item_index.to_string();
        let query = [("item_index", index.as_str()), ("new_status", status.as_str())];
        self.fetch(self.http.put(url).query(&query)).await
    }

    // ==================== Tasks ====================

    pub async fn tasks(&self, assigned_to: Option<&str>) -> ClientResult<Vec<Task>> {
        let mut request = self.http.get(self.url("/tasks"));
        if let Some(user_id) = assigned_to {
            request = request.query(&[("assigned_to", user_id)]);
        }
        self.fetch(request).await
    }

    pub async fn update_task_status(&self, id: &str, status: TaskStatus) -> ClientResult<MessageResponse> {
        let url = self.url(&format!("/tasks/{}", encode(id)));
        self.fetch(self.http.patch(url).json(&TaskStatusUpdate { status }))
            .await
    }

    pub async fn submit_report(&self, report: &WorkReportInput) -> ClientResult<MessageResponse> {
        let url = self.url(&format!("/tasks/{}/report", encode(&report.task_id)));
        self.fetch(self.http.post(url).json(report)).await
    }
}

#[async_trait]
impl TransactionBackend for ApiClient {
    async fn list_transactions(&self) -> ClientResult<Vec<Transaction>> {
        self.transactions().await
    }

    async fn delete_transaction(&self, id: &str) -> ClientResult<()> {
        ApiClient::delete_transaction(self, id).await.map(|_| ())
    }

    async fn update_item_status(
        &self,
        id: &str,
        item_index: usize,
        status: ItemStatus,
    ) -> ClientResult<()> {
        ApiClient::update_item_status(self, id, item_index, status)
            .await
            .map(|_| ())
    }
}

/// Pull the `detail` text out of an error body
///
/// Falls back to the raw body when it is not the usual `{"detail": ...}`.
fn detail_from_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("detail") {
            Some(serde_json::Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => body.trim().to_string(),
        },
        Err(_) => body.trim().to_string(),
    }
}
