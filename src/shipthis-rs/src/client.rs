use crate::collection::Collection;
use crate::headers::merge_headers;
use crate::response::{interpret, ApiResponse};
use crate::{Result, ShipthisError};
use reqwest::{Client as HttpClient, Method};
use serde_json::Value;
use shipthis_core::models::conversation_body;
use shipthis_core::{
    BulkEdit, ClientConfig, ConnectInfo, ConversationQuery, CreateOptions, ListQuery,
    PrimaryWorkflowAction, ReportQuery, RequestSpec, Route, SecondaryWorkflowAction, Verb,
};
use std::sync::Arc;

/// Shipthis REST API client.
///
/// Cheap to clone; clones share one connection pool and an immutable
/// configuration. Each operation is a single round trip with no retries. A call
/// that fails at the transport level (including timeouts) may or may not have
/// been applied by the server.
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    api_root: String,
    client: HttpClient,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client from validated configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = HttpClient::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            api_root: config.api_root(),
            config: Arc::new(config),
            client,
        })
    }

    /// Create a client from `SHIPTHIS_*` environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::new(ClientConfig::from_env()?)?)
    }

    /// Configuration this client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// A client for another region/location sharing this client's connection pool
    pub fn with_region_location(
        &self,
        region_id: impl Into<String>,
        location_id: impl Into<String>,
    ) -> Self {
        let config = (*self.config)
            .clone()
            .with_region_location(region_id, location_id);
        Self {
            config: Arc::new(config),
            api_root: self.api_root.clone(),
            client: self.client.clone(),
        }
    }

    /// Operations bound to one collection
    pub fn collection<'a>(&'a self, name: &'a str) -> Collection<'a> {
        Collection::new(self, name)
    }

    pub(crate) fn http(&self) -> &HttpClient {
        &self.client
    }

    /// Send one request and map the response.
    ///
    /// Every named operation goes through here.
    #[tracing::instrument(skip(self, spec), fields(verb = %spec.verb, path = %spec.path))]
    pub async fn request(&self, spec: RequestSpec) -> Result<ApiResponse> {
        let url = format!("{}{}", self.api_root, spec.path);
        let headers = merge_headers(&self.config, &spec.headers)?;

        let mut builder = self
            .client
            .request(method(spec.verb), &url)
            .headers(headers);
        if !spec.query.is_empty() {
            builder = builder.query(&spec.query);
        }
        if let Some(body) = &spec.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(timeout = e.is_timeout(), error = %e, "Transport failure");
                return Err(ShipthisError::Transport(e));
            }
        };

        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Response received");

        let result = interpret(status, &body);
        if let Err(e) = &result {
            tracing::debug!(status = status.as_u16(), error = %e, "Request rejected");
        }
        result
    }

    async fn send(&self, spec: RequestSpec) -> Result<Value> {
        Ok(self.request(spec).await?.data)
    }

    // ==================== Connection ====================

    /// Check credentials and resolve the working region/location.
    ///
    /// When region or location is not configured, the first region and its
    /// first location listed by the server are reported. The client itself is
    /// not changed; use [`Client::with_region_location`] to apply them.
    pub async fn connect(&self) -> Result<ConnectInfo> {
        let info = self.info().await?;
        let connect = ConnectInfo::resolve(
            &info,
            self.config.region_id.as_deref(),
            self.config.location_id.as_deref(),
        );
        tracing::info!(
            organisation = %self.config.organisation,
            region = ?connect.region_id,
            location = ?connect.location_id,
            "Connected to Shipthis"
        );
        Ok(connect)
    }

    /// Organisation and user information
    pub async fn info(&self) -> Result<Value> {
        self.send(RequestSpec::new(Verb::Get, Route::UserInfo)?)
            .await
    }

    // ==================== Collection CRUD ====================

    /// List documents in a collection. A collection with no matches yields an empty `Vec`.
    pub async fn get_list(&self, collection_name: &str, query: &ListQuery) -> Result<Vec<Value>> {
        let spec = RequestSpec::new(
            Verb::Get,
            Route::Collection {
                collection: collection_name,
            },
        )?;
        let spec = with_query(spec, query.to_query_pairs());
        Ok(items(self.send(spec).await?))
    }

    /// Full-text search within a collection
    pub async fn search(
        &self,
        collection_name: &str,
        query: &str,
        page: u32,
        count: u32,
        only_fields: Option<&str>,
    ) -> Result<Vec<Value>> {
        let mut list = ListQuery::new().search(query).page(page).count(count);
        if let Some(only) = only_fields {
            list = list.only(only);
        }
        self.get_list(collection_name, &list).await
    }

    /// Fetch one document by id. A missing document is a not-found request error.
    pub async fn get_item(&self, collection_name: &str, doc_id: &str) -> Result<Value> {
        self.get_item_fields(collection_name, doc_id, None).await
    }

    /// Fetch one document, restricted to a comma-separated field list
    pub async fn get_item_fields(
        &self,
        collection_name: &str,
        doc_id: &str,
        only_fields: Option<&str>,
    ) -> Result<Value> {
        let spec = RequestSpec::new(
            Verb::Get,
            Route::Item {
                collection: collection_name,
                id: doc_id,
            },
        )?
        .query_opt("only", only_fields.filter(|f| !f.is_empty()));

        let response = self.request(spec).await?;
        if response.data.is_null() {
            return Err(ShipthisError::Request {
                status: 404,
                message: format!("Document {} not found in {}", doc_id, collection_name),
                details: Value::Null,
            });
        }
        Ok(response.data)
    }

    /// First document matching `filters`, if any
    pub async fn get_one_item(
        &self,
        collection_name: &str,
        filters: Option<Value>,
        only_fields: Option<&str>,
    ) -> Result<Option<Value>> {
        let mut spec = RequestSpec::new(
            Verb::Get,
            Route::Collection {
                collection: collection_name,
            },
        )?;
        if let Some(filters) = filters.filter(|f| !f.is_null()) {
            spec = spec.query("query_filter_v2", filters);
        }
        let spec = spec.query_opt("only", only_fields.filter(|f| !f.is_empty()));
        Ok(items(self.send(spec).await?).into_iter().next())
    }

    /// Create a document; returns it with its server-assigned `_id`
    pub async fn create_item(
        &self,
        collection_name: &str,
        fields: Value,
        options: &CreateOptions,
    ) -> Result<Value> {
        let spec = RequestSpec::new(
            Verb::Post,
            Route::Collection {
                collection: collection_name,
            },
        )?
        .json(options.body(fields));
        let spec = with_query(spec, options.to_query_pairs());
        Ok(unwrap_data(self.send(spec).await?))
    }

    /// Replace a document
    pub async fn update_item(
        &self,
        collection_name: &str,
        doc_id: &str,
        data: Value,
    ) -> Result<Value> {
        let spec = RequestSpec::new(
            Verb::Put,
            Route::Item {
                collection: collection_name,
                id: doc_id,
            },
        )?
        .json(serde_json::json!({ "reqbody": data }));
        Ok(unwrap_data(self.send(spec).await?))
    }

    /// Update selected fields of a document.
    ///
    /// The server runs field validation, workflow triggers and audit logging
    /// for the change.
    pub async fn patch_item(
        &self,
        collection_name: &str,
        doc_id: &str,
        update_fields: Value,
    ) -> Result<Value> {
        let spec = RequestSpec::new(
            Verb::Patch,
            Route::Item {
                collection: collection_name,
                id: doc_id,
            },
        )?
        .json(serde_json::json!({ "update_fields": update_fields }));
        self.send(spec).await
    }

    /// Delete a document by id
    pub async fn delete_item(&self, collection_name: &str, doc_id: &str) -> Result<Value> {
        let spec = RequestSpec::new(
            Verb::Delete,
            Route::Item {
                collection: collection_name,
                id: doc_id,
            },
        )?;
        self.send(spec).await
    }

    // ==================== Workflow ====================

    /// Current job status of a document
    pub async fn get_job_status(&self, collection_name: &str, doc_id: &str) -> Result<Value> {
        let spec = RequestSpec::new(
            Verb::Get,
            Route::JobStatus {
                collection: collection_name,
                id: doc_id,
            },
        )?;
        self.send(spec).await
    }

    /// Move a document's job status along the workflow action at `action_index`
    pub async fn set_job_status(
        &self,
        collection_name: &str,
        doc_id: &str,
        action_index: u32,
    ) -> Result<Value> {
        let spec = RequestSpec::new(
            Verb::Post,
            Route::JobStatus {
                collection: collection_name,
                id: doc_id,
            },
        )?
        .json(serde_json::json!({ "action_index": action_index }));
        self.send(spec).await
    }

    /// Workflow configuration by id
    pub async fn get_workflow(&self, workflow_id: &str) -> Result<Value> {
        self.send(RequestSpec::new(Verb::Get, Route::Workflow { id: workflow_id })?)
            .await
    }

    /// Trigger a primary status transition on a record
    pub async fn primary_workflow_action(
        &self,
        collection_name: &str,
        action: &PrimaryWorkflowAction,
    ) -> Result<Value> {
        let spec = RequestSpec::new(
            Verb::Post,
            Route::WorkflowAction {
                collection: collection_name,
                workflow_id: &action.workflow_id,
                id: &action.object_id,
            },
        )?
        .json(action.body());
        self.send(spec).await
    }

    /// Trigger a sub-status transition on a record
    pub async fn secondary_workflow_action(
        &self,
        collection_name: &str,
        action: &SecondaryWorkflowAction,
    ) -> Result<Value> {
        let spec = RequestSpec::new(
            Verb::Post,
            Route::SecondaryWorkflowAction {
                collection: collection_name,
                workflow_id: &action.workflow_id,
                id: &action.object_id,
                target_state: &action.target_state,
            },
        )?
        .json(action.body());
        self.send(spec).await
    }

    /// Apply the same field updates to many documents
    pub async fn bulk_edit(&self, collection_name: &str, edit: &BulkEdit) -> Result<Value> {
        let spec = RequestSpec::new(
            Verb::Post,
            Route::GroupEdit {
                collection: collection_name,
            },
        )?
        .json(edit.body());
        self.send(spec).await
    }

    // ==================== Reports ====================

    /// Run a report for a date range, scoped to the configured location
    pub async fn get_report_view(&self, report_name: &str, query: &ReportQuery) -> Result<Value> {
        let spec = RequestSpec::new(
            Verb::Post,
            Route::ReportView {
                report: report_name,
            },
        )?;
        let mut spec = with_query(spec, query.to_query_pairs())
            .query_opt("location", self.location());
        if let Some(body) = &query.post_data {
            spec = spec.json(body.clone());
        }
        self.send(spec).await
    }

    // ==================== Third-party lookups ====================

    /// Exchange rate between two currencies; `date_ms` defaults to now
    pub async fn get_exchange_rate(
        &self,
        source_currency: &str,
        target_currency: &str,
        date_ms: Option<i64>,
    ) -> Result<Value> {
        let date = date_ms.unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
        let spec = RequestSpec::new(Verb::Get, Route::ExchangeRate)?
            .query("source", source_currency)
            .query("target", target_currency)
            .query("date", date);
        self.send(spec).await
    }

    /// Suggestions for a reference field such as `port` or `airport`
    pub async fn autocomplete(&self, reference_name: &str, data: Value) -> Result<Value> {
        let spec = RequestSpec::new(
            Verb::Post,
            Route::Autocomplete {
                reference: reference_name,
            },
        )?
        .query_opt("location", self.location())
        .json(data);
        self.send(spec).await
    }

    /// Place suggestions for free text
    pub async fn search_location(&self, query: &str) -> Result<Value> {
        let spec = RequestSpec::new(Verb::Get, Route::PlaceSearch)?.query("query", query);
        self.send(spec).await
    }

    /// Details of a place picked from [`Client::search_location`]
    pub async fn get_place_details(&self, place_id: &str, description: &str) -> Result<Value> {
        let spec = RequestSpec::new(Verb::Get, Route::PlaceDetails)?
            .query("query", place_id)
            .query("description", description);
        self.send(spec).await
    }

    // ==================== Conversations ====================

    /// Post a message on a document's conversation thread
    pub async fn create_conversation(
        &self,
        view_name: &str,
        document_id: &str,
        conversation: Value,
    ) -> Result<Value> {
        let spec = RequestSpec::new(Verb::Post, Route::Conversation)?
            .json(conversation_body(view_name, document_id, conversation));
        self.send(spec).await
    }

    /// Messages on a document's conversation thread
    pub async fn get_conversations(
        &self,
        view_name: &str,
        document_id: &str,
        query: &ConversationQuery,
    ) -> Result<Value> {
        let spec = RequestSpec::new(Verb::Get, Route::Conversation)?
            .query("view_name", view_name)
            .query("document_id", document_id)
            .query("page", query.page)
            .query("count", query.count)
            .query("message_type", &query.message_type)
            .query("version", 2);
        self.send(spec).await
    }

    // ==================== Reference linked fields ====================

    /// Create a document referenced from a field of another document
    pub async fn create_reference_linked_field(
        &self,
        collection_name: &str,
        doc_id: &str,
        payload: Value,
    ) -> Result<Value> {
        let spec = RequestSpec::new(
            Verb::Post,
            Route::ReferenceLinkedField {
                collection: collection_name,
                id: doc_id,
            },
        )?
        .json(payload);
        self.send(spec).await
    }

    fn location(&self) -> Option<&str> {
        self.config.location_id.as_deref().filter(|l| !l.is_empty())
    }
}

fn method(verb: Verb) -> Method {
    match verb {
        Verb::Get => Method::GET,
        Verb::Post => Method::POST,
        Verb::Put => Method::PUT,
        Verb::Patch => Method::PATCH,
        Verb::Delete => Method::DELETE,
    }
}

fn with_query(spec: RequestSpec, pairs: Vec<(String, String)>) -> RequestSpec {
    pairs
        .into_iter()
        .fold(spec, |spec, (key, value)| spec.query(key, value))
}

/// The `items` array of a listing payload; anything else lists as empty
fn items(data: Value) -> Vec<Value> {
    match data {
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Unwrap a nested `data` key when the server sends one
fn unwrap_data(data: Value) -> Value {
    match data {
        Value::Object(mut map) if map.get("data").is_some_and(|d| !d.is_null()) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
