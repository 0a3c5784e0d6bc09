#![allow(dead_code)]

use std::{
    collections::HashMap,
    env,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Result;
use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::{
    config::Region,
    types::{AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType},
    Client, Config,
};
use lambda_http::Body;
use line_group_url_webhook::{
    mapping::{GroupUrlMapping, MappingStore, PutOutcome},
    messaging::{Messenger, TextMessage},
    signature::LineSignatureVerifier,
    AppContext, AppError,
};
use serde_json::{json, Value};
use uuid::Uuid;

pub const CHANNEL_SECRET: &str = "integration-channel-secret";
pub const BASE_URL: &str = "https://groups.example.com/g";

pub fn body_as_string(body: &Body) -> String {
    match body {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => String::new(),
    }
}

pub fn sign(body: &str) -> String {
    LineSignatureVerifier::new(CHANNEL_SECRET).sign(body.as_bytes())
}

pub fn join_body(group_id: &str, reply_token: &str) -> String {
    json!({
        "destination": "Ubot",
        "events": [join_event(group_id, reply_token)]
    })
    .to_string()
}

pub fn join_event(group_id: &str, reply_token: &str) -> Value {
    json!({
        "type": "join",
        "mode": "active",
        "timestamp": 1_700_000_000_000_i64,
        "source": { "type": "group", "groupId": group_id },
        "webhookEventId": Uuid::new_v4().simple().to_string(),
        "deliveryContext": { "isRedelivery": false },
        "replyToken": reply_token
    })
}

pub fn webhook_request(body: &str, signature: Option<&str>) -> lambda_http::Request {
    let mut builder = lambda_http::http::Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("X-Line-Signature", signature);
    }
    builder
        .body(Body::Text(body.to_string()))
        .expect("webhook request")
}

/// In-memory store that counts calls so tests can assert on side effects.
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, GroupUrlMapping>>,
    pub gets: Mutex<usize>,
    pub puts: Mutex<usize>,
    /// Mapping that appears just before the next put, simulating a concurrent writer.
    pub racing_writer: Mutex<Option<GroupUrlMapping>>,
    pub fail: Mutex<bool>,
}

impl MemoryStore {
    pub fn with(mappings: impl IntoIterator<Item = GroupUrlMapping>) -> Self {
        let store = Self::default();
        store.items.lock().unwrap().extend(
            mappings
                .into_iter()
                .map(|mapping| (mapping.group_id.clone(), mapping)),
        );
        store
    }

    pub fn snapshot(&self) -> HashMap<String, GroupUrlMapping> {
        self.items.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        *self.gets.lock().unwrap() + *self.puts.lock().unwrap()
    }
}

#[async_trait]
impl MappingStore for MemoryStore {
    async fn get(&self, group_id: &str) -> Result<Option<GroupUrlMapping>, AppError> {
        *self.gets.lock().unwrap() += 1;
        if *self.fail.lock().unwrap() {
            return Err(AppError::Dynamo("table unavailable".into()));
        }
        Ok(self.items.lock().unwrap().get(group_id).cloned())
    }

    async fn put(&self, mapping: &GroupUrlMapping) -> Result<PutOutcome, AppError> {
        *self.puts.lock().unwrap() += 1;
        let mut items = self.items.lock().unwrap();
        if let Some(winner) = self.racing_writer.lock().unwrap().take() {
            items.insert(winner.group_id.clone(), winner);
        }
        if items.contains_key(&mapping.group_id) {
            return Ok(PutOutcome::Exists);
        }
        items.insert(mapping.group_id.clone(), mapping.clone());
        Ok(PutOutcome::Created)
    }
}

/// Messenger that records replies instead of calling LINE.
#[derive(Default)]
pub struct RecordingMessenger {
    pub replies: Mutex<Vec<(String, Vec<TextMessage>)>>,
    pub fail: Mutex<bool>,
}

impl RecordingMessenger {
    pub fn replies(&self) -> Vec<(String, Vec<TextMessage>)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn reply_message(
        &self,
        reply_token: &str,
        messages: Vec<TextMessage>,
    ) -> Result<(), AppError> {
        if *self.fail.lock().unwrap() {
            return Err(AppError::Messaging("reply API returned 500".into()));
        }
        self.replies
            .lock()
            .unwrap()
            .push((reply_token.to_string(), messages));
        Ok(())
    }
}

pub struct FakeSetup {
    pub ctx: Arc<AppContext>,
    pub store: Arc<MemoryStore>,
    pub messenger: Arc<RecordingMessenger>,
}

pub fn fake_context(store: MemoryStore) -> FakeSetup {
    let store = Arc::new(store);
    let messenger = Arc::new(RecordingMessenger::default());
    let ctx = Arc::new(AppContext::new(
        Arc::new(LineSignatureVerifier::new(CHANNEL_SECRET)),
        store.clone(),
        messenger.clone(),
        BASE_URL,
    ));
    FakeSetup {
        ctx,
        store,
        messenger,
    }
}

pub struct DynamoSetup {
    pub client: Client,
    pub table: String,
    _guard: TableGuard,
}

struct TableGuard {
    client: Client,
    table: String,
}

impl TableGuard {
    async fn new(client: Client, table: String) -> Result<Self> {
        client
            .create_table()
            .table_name(&table)
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name("groupId")
                    .attribute_type(ScalarAttributeType::S)
                    .build()?,
            )
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name("groupId")
                    .key_type(KeyType::Hash)
                    .build()?,
            )
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await?;

        tokio::time::sleep(Duration::from_millis(500)).await;

        Ok(Self { client, table })
    }
}

impl Drop for TableGuard {
    fn drop(&mut self) {
        let client = self.client.clone();
        let table = self.table.clone();
        tokio::spawn(async move {
            let _ = client.delete_table().table_name(&table).send().await;
        });
    }
}

/// Connect to DynamoDB Local and create a scratch table, or `None` when unreachable.
pub async fn setup_dynamo() -> Option<DynamoSetup> {
    let endpoint =
        env::var("DYNAMODB_ENDPOINT").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());
    let region = Region::new(env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()));
    let config = Config::builder()
        .endpoint_url(endpoint)
        .region(region)
        .credentials_provider(Credentials::new("test", "test", None, None, "integration-tests"))
        .behavior_version_latest()
        .build();
    let client = Client::from_conf(config);

    if client.list_tables().send().await.is_err() {
        eprintln!("skipping integration test: DynamoDB not reachable");
        return None;
    }

    let table = format!("GroupUrls_IntegrationTest_{}", Uuid::new_v4().simple());
    let guard = TableGuard::new(client.clone(), table.clone()).await.ok()?;

    Some(DynamoSetup {
        client,
        table,
        _guard: guard,
    })
}
