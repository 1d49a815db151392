use serde_json::Value;
use shipthis_core::{CreateOptions, ListQuery};

use crate::{Client, Result};

/// CRUD operations bound to one collection name
///
/// ```rust,no_run
/// # async fn run(client: &shipthis_rs::Client) -> shipthis_rs::Result<()> {
/// let loads = client.collection("fcl_load");
/// loads
///     .patch("68a4f906743189ad061429a7", serde_json::json!({"container_no": "CONT123"}))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Collection<'a> {
    client: &'a Client,
    name: &'a str,
}

impl<'a> Collection<'a> {
    pub(crate) fn new(client: &'a Client, name: &'a str) -> Self {
        Self { client, name }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Value>> {
        self.client.get_list(self.name, query).await
    }

    pub async fn get(&self, doc_id: &str) -> Result<Value> {
        self.client.get_item(self.name, doc_id).await
    }

    pub async fn find_one(&self, filters: Value) -> Result<Option<Value>> {
        self.client.get_one_item(self.name, Some(filters), None).await
    }

    pub async fn create(&self, fields: Value, options: &CreateOptions) -> Result<Value> {
        self.client.create_item(self.name, fields, options).await
    }

    pub async fn update(&self, doc_id: &str, data: Value) -> Result<Value> {
        self.client.update_item(self.name, doc_id, data).await
    }

    pub async fn patch(&self, doc_id: &str, update_fields: Value) -> Result<Value> {
        self.client.patch_item(self.name, doc_id, update_fields).await
    }

    pub async fn delete(&self, doc_id: &str) -> Result<Value> {
        self.client.delete_item(self.name, doc_id).await
    }
}
