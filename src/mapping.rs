use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::{types::AttributeValue, Client};
use chrono::{DateTime, Utc};

use crate::error::AppError;

/// Short URL registered for a group chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupUrlMapping {
    pub group_id: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl GroupUrlMapping {
    pub fn new(group_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            token: token.into(),
            created_at: Utc::now(),
        }
    }

    /// Public URL for this mapping under `base_url`.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.token)
    }

    /// Convert the mapping into a DynamoDB attribute map.
    pub fn into_item(self) -> HashMap<String, AttributeValue> {
        let mut map = HashMap::new();
        map.insert("groupId".into(), AttributeValue::S(self.group_id));
        map.insert("token".into(), AttributeValue::S(self.token));
        map.insert(
            "createdAt".into(),
            AttributeValue::S(self.created_at.to_rfc3339()),
        );
        map
    }

    /// Rehydrate a mapping from a DynamoDB attribute map.
    ///
    /// `createdAt` is optional so that rows written by hand still load.
    pub fn from_item(item: HashMap<String, AttributeValue>) -> Result<Self, AppError> {
        let get_str = |key: &str| -> Result<String, AppError> {
            item.get(key)
                .and_then(|v| v.as_s().ok())
                .map(|s| s.to_string())
                .ok_or_else(|| AppError::Dynamo(format!("missing attribute `{key}`")))
        };
        let created_at = match item.get("createdAt").and_then(|v| v.as_s().ok()) {
            Some(raw) => raw
                .parse::<DateTime<Utc>>()
                .map_err(|_| AppError::Dynamo("invalid createdAt timestamp".into()))?,
            None => DateTime::<Utc>::UNIX_EPOCH,
        };
        Ok(Self {
            group_id: get_str("groupId")?,
            token: get_str("token")?,
            created_at,
        })
    }
}

/// Result of a conditional insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Created,
    /// Another writer registered the group first; nothing was written.
    Exists,
}

/// Key-value persistence for group URL mappings.
#[async_trait]
pub trait MappingStore: Send + Sync {
    async fn get(&self, group_id: &str) -> Result<Option<GroupUrlMapping>, AppError>;

    /// Insert `mapping` unless its group already has one.
    async fn put(&self, mapping: &GroupUrlMapping) -> Result<PutOutcome, AppError>;
}

/// DynamoDB-backed store keyed by `groupId`.
#[derive(Clone)]
pub struct DynamoMappingStore {
    client: Client,
    table_name: String,
}

impl DynamoMappingStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl MappingStore for DynamoMappingStore {
    async fn get(&self, group_id: &str) -> Result<Option<GroupUrlMapping>, AppError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("groupId", AttributeValue::S(group_id.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| AppError::Dynamo(e.to_string()))?;

        output.item.map(GroupUrlMapping::from_item).transpose()
    }

    async fn put(&self, mapping: &GroupUrlMapping) -> Result<PutOutcome, AppError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(mapping.clone().into_item()))
            .condition_expression("attribute_not_exists(groupId)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(PutOutcome::Created),
            Err(err)
                if err
                    .as_service_error()
                    .map_or(false, |e| e.is_conditional_check_failed_exception()) =>
            {
                Ok(PutOutcome::Exists)
            }
            Err(err) => Err(AppError::Dynamo(err.to_string())),
        }
    }
}
