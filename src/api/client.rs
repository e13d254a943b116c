//! JIRA API client implementation.
//!
//! This module provides the client for the JIRA REST API v2. It handles
//! authentication, request/response processing and error extraction.
//! Every call is a single request; nothing is retried.

use std::time::Duration;

use reqwest::{header, multipart, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use super::auth::Auth;
use super::error::{ApiError, FieldErrors, Result, SaveOutcome};
use super::types::{
    Attachment, Comment, CreateMeta, CreatedIssue, Field, Issue, Project, SearchResult,
};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// REST API prefix appended to the site and context path.
const API_PREFIX: &str = "/rest/api/2";

/// The JIRA API client.
#[derive(Debug)]
pub struct JiraClient {
    /// The HTTP client.
    client: Client,
    /// `{site}{context_path}/rest/api/2`.
    api_url: String,
    /// Authentication credentials.
    auth: Auth,
}

impl JiraClient {
    /// Create a new JIRA client with explicit credentials.
    ///
    /// Does NOT contact the server.
    ///
    /// # Arguments
    ///
    /// * `site` - The JIRA instance URL
    /// * `context_path` - Path prefix of the JIRA web app (often empty)
    /// * `username` - The login name
    /// * `token` - The API token
    pub fn new(site: &str, context_path: &str, username: &str, token: &str) -> Result<Self> {
        let auth = Auth::new(username, token);
        let client = Self::build_http_client()?;
        let api_url = format!(
            "{}{}{}",
            normalize_base_url(site),
            normalize_context_path(context_path),
            API_PREFIX
        );

        info!(%api_url, "JIRA client created");
        Ok(Self {
            client,
            api_url,
            auth,
        })
    }

    /// Build the HTTP client with appropriate settings.
    fn build_http_client() -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::Network)
    }

    /// The REST API root this client talks to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// The login name used for authentication.
    pub fn username(&self) -> &str {
        self.auth.username()
    }

    /// Get a project by key.
    #[instrument(skip(self))]
    pub async fn get_project(&self, key: &str) -> Result<Project> {
        let url = format!("{}/project/{}", self.api_url, urlencoding::encode(key));
        self.fetch(Method::GET, &url, None).await
    }

    /// List every project visible to the user.
    #[instrument(skip(self))]
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let url = format!("{}/project", self.api_url);
        self.fetch(Method::GET, &url, None).await
    }

    /// Get a single issue by key.
    ///
    /// # Arguments
    ///
    /// * `key` - The issue key, already normalized (e.g., "PROJ-123")
    /// * `expand` - Optional expansions (e.g., `["transitions"]`)
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn get_issue(&self, key: &str, expand: &[&str]) -> Result<Issue> {
        let mut url = format!("{}/issue/{}", self.api_url, urlencoding::encode(key));
        if !expand.is_empty() {
            url.push_str("?expand=");
            url.push_str(&urlencoding::encode(&expand.join(",")));
        }

        let issue: Issue = self.fetch(Method::GET, &url, None).await?;
        debug!("Fetched issue: {}", issue.key);
        Ok(issue)
    }

    /// Create an issue from a field set.
    #[instrument(skip(self, field_set))]
    pub async fn create_issue(
        &self,
        field_set: serde_json::Map<String, Value>,
    ) -> Result<SaveOutcome<CreatedIssue>> {
        let url = format!("{}/issue", self.api_url);
        let body = json!({ "fields": field_set });
        let response = self.send(Method::POST, &url, Some(&body)).await?;
        match Self::rejection(response).await? {
            Ok(response) => Ok(SaveOutcome::Saved(Self::parse(response).await?)),
            Err(errors) => Ok(SaveOutcome::Rejected(errors)),
        }
    }

    /// Apply a partial edit (`fields` and/or `update` verbs) to an issue.
    #[instrument(skip(self, body), fields(issue_key = %key))]
    pub async fn edit_issue(&self, key: &str, body: &Value) -> Result<SaveOutcome<()>> {
        let url = format!("{}/issue/{}", self.api_url, urlencoding::encode(key));
        let response = self.send(Method::PUT, &url, Some(body)).await?;
        match Self::rejection(response).await? {
            Ok(_) => Ok(SaveOutcome::Saved(())),
            Err(errors) => Ok(SaveOutcome::Rejected(errors)),
        }
    }

    /// Delete an issue.
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn delete_issue(&self, key: &str) -> Result<()> {
        let url = format!("{}/issue/{}", self.api_url, urlencoding::encode(key));
        self.execute(Method::DELETE, &url, None).await
    }

    /// Execute a workflow transition on an issue.
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn transition_issue(&self, key: &str, transition_id: &str) -> Result<()> {
        let url = format!(
            "{}/issue/{}/transitions",
            self.api_url,
            urlencoding::encode(key)
        );
        let body = json!({ "transition": { "id": transition_id } });
        self.execute(Method::POST, &url, Some(&body)).await
    }

    /// Append a comment to an issue.
    #[instrument(skip(self, body), fields(issue_key = %key))]
    pub async fn add_comment(&self, key: &str, body: &str) -> Result<Comment> {
        let url = format!("{}/issue/{}/comment", self.api_url, urlencoding::encode(key));
        let body = json!({ "body": body });
        self.fetch(Method::POST, &url, Some(&body)).await
    }

    /// Upload a file as an attachment.
    #[instrument(skip(self, content), fields(issue_key = %key, size = content.len()))]
    pub async fn add_attachment(
        &self,
        key: &str,
        file_name: &str,
        mime_type: &str,
        content: Vec<u8>,
    ) -> Result<Vec<Attachment>> {
        let url = format!(
            "{}/issue/{}/attachments",
            self.api_url,
            urlencoding::encode(key)
        );
        let part = multipart::Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str(mime_type)?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, self.auth.header_value())
            .header(header::ACCEPT, "application/json")
            .header("X-Atlassian-Token", "nocheck")
            .multipart(form)
            .send()
            .await?;

        Self::parse(Self::check(response).await?).await
    }

    /// List field metadata (storage keys and display names).
    #[instrument(skip(self))]
    pub async fn list_fields(&self) -> Result<Vec<Field>> {
        let url = format!("{}/field", self.api_url);
        self.fetch(Method::GET, &url, None).await
    }

    /// Run a JQL search.
    ///
    /// `max_results` is passed through as-is; the server truncates anything
    /// beyond it and no further pages are requested.
    #[instrument(skip(self, projection), fields(jql = %jql))]
    pub async fn search(
        &self,
        jql: &str,
        projection: &[String],
        max_results: u32,
    ) -> Result<SearchResult> {
        let url = format!("{}/search", self.api_url);
        let body = json!({
            "jql": jql,
            "fields": projection,
            "maxResults": max_results,
        });

        let result: SearchResult = self.fetch(Method::POST, &url, Some(&body)).await?;
        debug!(
            "Found {} issues (total: {})",
            result.issues.len(),
            result.total
        );
        Ok(result)
    }

    /// Get creation metadata for a project, optionally for one issue type.
    #[instrument(skip(self))]
    pub async fn create_meta(&self, project: &str, issue_type: Option<&str>) -> Result<CreateMeta> {
        let mut url = format!(
            "{}/issue/createmeta?projectKeys={}&expand=projects.issuetypes.fields",
            self.api_url,
            urlencoding::encode(project)
        );
        if let Some(issue_type) = issue_type {
            url.push_str("&issuetypeNames=");
            url.push_str(&urlencoding::encode(issue_type));
        }
        self.fetch(Method::GET, &url, None).await
    }

    /// Attach authentication and JSON headers to a request.
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(header::AUTHORIZATION, self.auth.header_value())
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
    }

    /// Send a request and return the raw response.
    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<Response> {
        debug!(%method, %url, "Sending request");
        let mut request = self.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Send a request and parse a JSON answer.
    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        let response = self.send(method, url, body).await?;
        Self::parse(Self::check(response).await?).await
    }

    /// Send a request whose answer carries no useful body.
    async fn execute(&self, method: Method, url: &str, body: Option<&Value>) -> Result<()> {
        let response = self.send(method, url, body).await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Pass successful responses through; turn everything else into an error.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let error_body = response.text().await.unwrap_or_default();
        debug!("Error response body: {}", error_body);
        Err(ApiError::from_response(status.as_u16(), &url, &error_body))
    }

    /// Like [`Self::check`], but a 400 carrying field errors is a rejection.
    async fn rejection(response: Response) -> Result<std::result::Result<Response, FieldErrors>> {
        let status = response.status();
        if status.is_success() {
            return Ok(Ok(response));
        }

        let url = response.url().to_string();
        let error_body = response.text().await.unwrap_or_default();
        debug!("Error response body: {}", error_body);

        let errors = FieldErrors::from_body(&error_body);
        if status == StatusCode::BAD_REQUEST && errors.has_field_errors() {
            warn!(?errors, "JIRA rejected field values");
            return Ok(Err(errors));
        }
        Err(ApiError::from_response(status.as_u16(), &url, &error_body))
    }

    /// Parse a JSON body.
    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

/// Normalize the site URL: default to HTTPS and drop trailing slashes.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    let url = if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    };

    // Warn if not HTTPS (but don't enforce for localhost/testing)
    if !url.starts_with("https://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    url
}

/// Normalize a context path to either empty or `/segment` without a trailing slash.
fn normalize_context_path(path: &str) -> String {
    let path = path.trim().trim_matches('/');
    if path.is_empty() {
        String::new()
    } else {
        format!("/{}", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client_for(server: &Server) -> JiraClient {
        JiraClient::new(&server.url(), "", "jdoe", "token").unwrap()
    }

    #[test]
    fn test_normalize_base_url_removes_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://company.atlassian.net/"),
            "https://company.atlassian.net"
        );
    }

    #[test]
    fn test_normalize_base_url_handles_multiple_slashes() {
        assert_eq!(
            normalize_base_url("https://company.atlassian.net///"),
            "https://company.atlassian.net"
        );
    }

    #[test]
    fn test_normalize_base_url_adds_scheme() {
        assert_eq!(
            normalize_base_url("jira.example.com"),
            "https://jira.example.com"
        );
    }

    #[test]
    fn test_normalize_context_path() {
        assert_eq!(normalize_context_path(""), "");
        assert_eq!(normalize_context_path("/"), "");
        assert_eq!(normalize_context_path("jira"), "/jira");
        assert_eq!(normalize_context_path("/jira/"), "/jira");
    }

    #[test]
    fn test_api_url_includes_context_path() {
        let client = JiraClient::new("https://jira.example.com/", "/jira", "u", "t").unwrap();
        assert_eq!(client.api_url(), "https://jira.example.com/jira/rest/api/2");
    }

    #[tokio::test]
    async fn test_get_issue_with_expand() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/2/issue/ABC-1")
            .match_query(Matcher::UrlEncoded("expand".into(), "transitions".into()))
            .match_header("authorization", Matcher::Regex("^Basic ".into()))
            .with_status(200)
            .with_body(r#"{"id": "1", "key": "ABC-1", "fields": {"summary": "s"},
                           "transitions": [{"id": "21", "name": "In Progress"}]}"#)
            .create_async()
            .await;

        let issue = client_for(&server)
            .get_issue("ABC-1", &["transitions"])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(issue.transitions[0].id, "21");
    }

    #[tokio::test]
    async fn test_get_issue_not_found_joins_messages() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/rest/api/2/issue/ABC-9")
            .with_status(404)
            .with_body(r#"{"errorMessages": ["Issue Does Not Exist"], "errors": {}}"#)
            .create_async()
            .await;

        let err = client_for(&server).get_issue("ABC-9", &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "Issue Does Not Exist (404)");
    }

    #[tokio::test]
    async fn test_create_issue_rejected() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/rest/api/2/issue")
            .with_status(400)
            .with_body(r#"{"errorMessages": [], "errors": {"issuetype": "valid issue type is required"}}"#)
            .create_async()
            .await;

        let outcome = client_for(&server)
            .create_issue(serde_json::Map::new())
            .await
            .unwrap();
        match outcome {
            SaveOutcome::Rejected(errors) => {
                assert_eq!(errors.field("issuetype"), Some("valid issue type is required"))
            }
            SaveOutcome::Saved(_) => panic!("Expected rejection"),
        }
    }

    #[tokio::test]
    async fn test_edit_issue_saved_on_no_content() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/rest/api/2/issue/ABC-1")
            .match_body(Matcher::PartialJson(json!({"fields": {"summary": "new"}})))
            .with_status(204)
            .create_async()
            .await;

        let outcome = client_for(&server)
            .edit_issue("ABC-1", &json!({"fields": {"summary": "new"}}))
            .await
            .unwrap();
        mock.assert_async().await;
        assert!(outcome.is_saved());
    }

    #[tokio::test]
    async fn test_edit_issue_server_error_is_error() {
        let mut server = Server::new_async().await;
        server
            .mock("PUT", "/rest/api/2/issue/ABC-1")
            .with_status(500)
            .with_body(r#"{"errorMessages": ["boom"]}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .edit_issue("ABC-1", &json!({"fields": {}}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_search_posts_jql_fields_and_cap() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/api/2/search")
            .match_body(Matcher::Json(json!({
                "jql": "project = \"ABC\"",
                "fields": ["summary", "status"],
                "maxResults": 5000
            })))
            .with_status(200)
            .with_body(r#"{"startAt": 0, "maxResults": 5000, "total": 1,
                           "issues": [{"key": "ABC-1", "fields": {"summary": "s"}}]}"#)
            .create_async()
            .await;

        let result = client_for(&server)
            .search(
                "project = \"ABC\"",
                &["summary".to_string(), "status".to_string()],
                5000,
            )
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(result.issues.len(), 1);
    }

    #[tokio::test]
    async fn test_add_attachment_sends_nocheck_header() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/api/2/issue/ABC-1/attachments")
            .match_header("x-atlassian-token", "nocheck")
            .match_header("content-type", Matcher::Regex("^multipart/form-data".into()))
            .with_status(200)
            .with_body(r#"[{"id": "5", "filename": "notes.txt", "size": 5}]"#)
            .create_async()
            .await;

        let attachments = client_for(&server)
            .add_attachment("ABC-1", "notes.txt", "text/plain", b"hello".to_vec())
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(attachments[0].filename, "notes.txt");
    }
}
