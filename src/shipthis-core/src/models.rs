use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Upper bound the API accepts for `replicate_count`
pub const MAX_REPLICATE_COUNT: u32 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub order: SortOrder,
}

/// Listing options for a collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_count")]
    pub count: u32,
    /// Sent JSON-encoded as `query_filter_v2`
    #[serde(default)]
    pub filters: Option<Value>,
    #[serde(default)]
    pub search_query: Option<String>,
    /// Comma-separated field projection
    #[serde(default)]
    pub only_fields: Option<String>,
    #[serde(default)]
    pub sort: Vec<SortField>,
    #[serde(default)]
    pub output_type: Option<String>,
    #[serde(default = "default_true")]
    pub meta: bool,
}

fn default_page() -> u32 {
    1
}

fn default_count() -> u32 {
    20
}

fn default_true() -> bool {
    true
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            count: default_count(),
            filters: None,
            search_query: None,
            only_fields: None,
            sort: Vec::new(),
            output_type: None,
            meta: true,
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn filters(mut self, filters: Value) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    pub fn only(mut self, fields: impl Into<String>) -> Self {
        self.only_fields = Some(fields.into());
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort.push(SortField {
            field: field.into(),
            order,
        });
        self
    }

    pub fn output_type(mut self, output_type: impl Into<String>) -> Self {
        self.output_type = Some(output_type.into());
        self
    }

    pub fn without_meta(mut self) -> Self {
        self.meta = false;
        self
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("count".to_string(), self.count.to_string()),
        ];
        if let Some(filters) = self.filters.as_ref().filter(|f| !is_blank(f)) {
            pairs.push(("query_filter_v2".to_string(), filters.to_string()));
        }
        if let Some(search) = self.search_query.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("search_query".to_string(), search.clone()));
        }
        if let Some(only) = self.only_fields.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("only".to_string(), only.clone()));
        }
        if !self.sort.is_empty() {
            let sort: Vec<Value> = self
                .sort
                .iter()
                .map(|s| json!({"field": s.field, "order": s.order.as_str()}))
                .collect();
            pairs.push(("multi_sort".to_string(), Value::Array(sort).to_string()));
        }
        if let Some(output_type) = self.output_type.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("output_type".to_string(), output_type.clone()));
        }
        if !self.meta {
            pairs.push(("meta".to_string(), "false".to_string()));
        }
        pairs
    }
}

/// Options accompanying a document creation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateOptions {
    #[serde(default)]
    pub ignore_new_required: bool,
    #[serde(default)]
    pub skip_sequence_if_exists: bool,
    /// Number of copies to create; capped at [`MAX_REPLICATE_COUNT`]
    #[serde(default)]
    pub replicate_count: u32,
    #[serde(default)]
    pub input_filters: Option<Value>,
    #[serde(default)]
    pub action_op_data: Option<Value>,
}

impl CreateOptions {
    pub fn body(&self, fields: Value) -> Value {
        let mut body = Map::new();
        body.insert("reqbody".to_string(), fields);
        body.insert(
            "ignore_new_required".to_string(),
            Value::Bool(self.ignore_new_required),
        );
        body.insert(
            "skip_sequence_if_exists".to_string(),
            Value::Bool(self.skip_sequence_if_exists),
        );
        if let Some(data) = self.action_op_data.as_ref().filter(|v| !is_blank(v)) {
            body.insert("action_op_data".to_string(), data.clone());
        }
        Value::Object(body)
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if self.replicate_count > 0 {
            pairs.push((
                "replicate_count".to_string(),
                self.replicate_count.min(MAX_REPLICATE_COUNT).to_string(),
            ));
        }
        if let Some(filters) = self.input_filters.as_ref().filter(|v| !is_blank(v)) {
            pairs.push(("input_filters".to_string(), filters.to_string()));
        }
        pairs
    }
}

/// Primary status transition on a record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrimaryWorkflowAction {
    /// Status key, e.g. `job_status`
    pub workflow_id: String,
    pub object_id: String,
    pub action_index: u32,
    pub intended_state_id: String,
    #[serde(default)]
    pub start_state_id: Option<String>,
}

impl PrimaryWorkflowAction {
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert("action_index".to_string(), Value::from(self.action_index));
        body.insert(
            "intended_state_id".to_string(),
            Value::String(self.intended_state_id.clone()),
        );
        if let Some(start) = self.start_state_id.as_ref().filter(|s| !s.is_empty()) {
            body.insert("start_state_id".to_string(), Value::String(start.clone()));
        }
        Value::Object(body)
    }
}

/// Sub-status transition, e.g. `driver_status` to `to_pick_up`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecondaryWorkflowAction {
    pub workflow_id: String,
    pub object_id: String,
    pub target_state: String,
    #[serde(default)]
    pub additional_data: Option<Value>,
}

impl SecondaryWorkflowAction {
    pub fn body(&self) -> Value {
        match &self.additional_data {
            Some(data) if !data.is_null() => data.clone(),
            _ => Value::Object(Map::new()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BulkEdit {
    pub ids: Vec<String>,
    /// Dotted field paths to new values, e.g. `{"address.state": "California"}`
    pub update_data: Value,
    #[serde(default)]
    pub external_update_data: Option<Value>,
}

impl BulkEdit {
    pub fn body(&self) -> Value {
        let mut data = Map::new();
        data.insert("ids".to_string(), Value::from(self.ids.clone()));
        data.insert("update_data".to_string(), self.update_data.clone());
        if let Some(external) = self.external_update_data.as_ref().filter(|v| !is_blank(v)) {
            data.insert("external_update_data".to_string(), external.clone());
        }
        json!({ "data": data })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportQuery {
    /// `YYYY-MM-DD` or epoch timestamp
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub post_data: Option<Value>,
    #[serde(default = "default_output_type")]
    pub output_type: String,
    #[serde(default = "default_true")]
    pub skip_meta: bool,
}

fn default_output_type() -> String {
    "json".to_string()
}

impl ReportQuery {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
            post_data: None,
            output_type: default_output_type(),
            skip_meta: true,
        }
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("start_date".to_string(), self.start_date.clone()),
            ("end_date".to_string(), self.end_date.clone()),
            ("output_type".to_string(), self.output_type.clone()),
            ("skip_meta".to_string(), self.skip_meta.to_string()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationQuery {
    #[serde(default = "default_message_type")]
    pub message_type: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_conversation_count")]
    pub count: u32,
}

fn default_message_type() -> String {
    "all".to_string()
}

fn default_conversation_count() -> u32 {
    100
}

impl Default for ConversationQuery {
    fn default() -> Self {
        Self {
            message_type: default_message_type(),
            page: default_page(),
            count: default_conversation_count(),
        }
    }
}

/// Body for posting a message on a document
pub fn conversation_body(view_name: &str, document_id: &str, conversation: Value) -> Value {
    let message_type = conversation
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    json!({
        "conversation": conversation,
        "document_id": document_id,
        "view_name": view_name,
        "message_type": message_type,
    })
}

/// Result of a successful `connect`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectInfo {
    pub region_id: Option<String>,
    pub location_id: Option<String>,
    pub organisation: Value,
}

impl ConnectInfo {
    /// Resolve the working region/location from a `user-auth/info` payload.
    ///
    /// Configured values win when both are present; otherwise the first region
    /// and its first location are taken.
    pub fn resolve(info: &Value, region_id: Option<&str>, location_id: Option<&str>) -> Self {
        let organisation = info.get("organisation").cloned().unwrap_or(Value::Null);
        let (mut region, mut location) = (
            region_id.map(str::to_string),
            location_id.map(str::to_string),
        );

        if region.is_none() || location.is_none() {
            let first_region = organisation
                .get("regions")
                .and_then(Value::as_array)
                .and_then(|regions| regions.first());
            if let Some(first) = first_region {
                region = first
                    .get("region_id")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                location = first
                    .get("locations")
                    .and_then(Value::as_array)
                    .and_then(|locations| locations.first())
                    .and_then(|l| l.get("location_id"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .or(location);
            }
        }

        Self {
            region_id: region,
            location_id: location,
            organisation,
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_list_query_defaults() {
        let pairs = ListQuery::new().to_query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "1".to_string()),
                ("count".to_string(), "20".to_string())
            ]
        );
    }

    #[test]
    fn test_list_query_all_options() {
        let pairs = ListQuery::new()
            .page(3)
            .count(50)
            .filters(json!({"status": "open"}))
            .search("ACME")
            .only("name,status")
            .sort_by("created_at", SortOrder::Desc)
            .output_type("csv")
            .without_meta()
            .to_query_pairs();

        assert_eq!(lookup(&pairs, "page"), Some("3"));
        assert_eq!(lookup(&pairs, "query_filter_v2"), Some(r#"{"status":"open"}"#));
        assert_eq!(lookup(&pairs, "search_query"), Some("ACME"));
        assert_eq!(lookup(&pairs, "only"), Some("name,status"));
        assert_eq!(
            lookup(&pairs, "multi_sort"),
            Some(r#"[{"field":"created_at","order":"desc"}]"#)
        );
        assert_eq!(lookup(&pairs, "output_type"), Some("csv"));
        assert_eq!(lookup(&pairs, "meta"), Some("false"));
    }

    #[test]
    fn test_empty_filters_are_not_sent() {
        let pairs = ListQuery::new().filters(json!({})).to_query_pairs();
        assert_eq!(lookup(&pairs, "query_filter_v2"), None);
    }

    #[test]
    fn test_create_options_cap_replicate_count() {
        let options = CreateOptions {
            replicate_count: 250,
            ..Default::default()
        };
        let pairs = options.to_query_pairs();
        assert_eq!(lookup(&pairs, "replicate_count"), Some("100"));

        assert!(CreateOptions::default().to_query_pairs().is_empty());
    }

    #[test]
    fn test_create_body() {
        let options = CreateOptions {
            ignore_new_required: true,
            action_op_data: Some(json!({"op": "copy"})),
            ..Default::default()
        };
        let body = options.body(json!({"name": "ACME"}));
        assert_eq!(
            body,
            json!({
                "reqbody": {"name": "ACME"},
                "ignore_new_required": true,
                "skip_sequence_if_exists": false,
                "action_op_data": {"op": "copy"}
            })
        );
    }

    #[test]
    fn test_primary_workflow_body_omits_missing_start_state() {
        let action = PrimaryWorkflowAction {
            workflow_id: "job_status".to_string(),
            object_id: "68a4f906743189ad061429a7".to_string(),
            action_index: 0,
            intended_state_id: "ops_complete".to_string(),
            start_state_id: None,
        };
        assert_eq!(
            action.body(),
            json!({"action_index": 0, "intended_state_id": "ops_complete"})
        );
    }

    #[test]
    fn test_secondary_workflow_body_defaults_to_empty_object() {
        let action = SecondaryWorkflowAction {
            workflow_id: "driver_status".to_string(),
            object_id: "67ed10859b7cf551a19f813e".to_string(),
            target_state: "to_pick_up".to_string(),
            additional_data: None,
        };
        assert_eq!(action.body(), json!({}));
    }

    #[test]
    fn test_bulk_edit_body() {
        let edit = BulkEdit {
            ids: vec!["a1".to_string(), "b2".to_string()],
            update_data: json!({"address.state": "California"}),
            external_update_data: None,
        };
        assert_eq!(
            edit.body(),
            json!({"data": {"ids": ["a1", "b2"], "update_data": {"address.state": "California"}}})
        );
    }

    #[test]
    fn test_report_query_pairs() {
        let pairs = ReportQuery::new("2024-01-01", "2024-01-31").to_query_pairs();
        assert_eq!(lookup(&pairs, "output_type"), Some("json"));
        assert_eq!(lookup(&pairs, "skip_meta"), Some("true"));
    }

    #[test]
    fn test_conversation_body_uses_message_type() {
        let body = conversation_body("sea_shipment", "abc", json!({"type": "note", "message": "hi"}));
        assert_eq!(body["message_type"], "note");
        let body = conversation_body("sea_shipment", "abc", json!({"message": "hi"}));
        assert_eq!(body["message_type"], "");
    }

    #[test]
    fn test_connect_info_picks_first_region_and_location() {
        let info = json!({
            "organisation": {
                "regions": [
                    {"region_id": "usa", "locations": [{"location_id": "new_york"}, {"location_id": "miami"}]},
                    {"region_id": "eu", "locations": [{"location_id": "rotterdam"}]}
                ]
            }
        });
        let resolved = ConnectInfo::resolve(&info, None, None);
        assert_eq!(resolved.region_id.as_deref(), Some("usa"));
        assert_eq!(resolved.location_id.as_deref(), Some("new_york"));

        let configured = ConnectInfo::resolve(&info, Some("eu"), Some("rotterdam"));
        assert_eq!(configured.region_id.as_deref(), Some("eu"));
        assert_eq!(configured.location_id.as_deref(), Some("rotterdam"));
    }

    #[test]
    fn test_connect_info_without_regions() {
        let resolved = ConnectInfo::resolve(&json!({"organisation": {}}), None, None);
        assert!(resolved.region_id.is_none());
        assert!(resolved.location_id.is_none());
    }
}
