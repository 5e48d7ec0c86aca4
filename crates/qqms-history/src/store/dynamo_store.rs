//! Amazon DynamoDB persistence.
//!
//! Each table is expected to exist with partition key `QubitNumber` (N) and
//! sort key `Timestamp` (S). Items carry the fitted value under an attribute
//! named after the model kind (`T1Value` or `T2Value`).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, SecondsFormat, Utc};
use qqms_hal::DecayModel;

use crate::error::{HistoryError, HistoryResult, validate_table};
use crate::record::{HistoryRecord, RecordFilter};
use crate::store::TimeSeriesStore;

const ATTR_QUBIT: &str = "QubitNumber";
const ATTR_TIMESTAMP: &str = "Timestamp";
const ATTR_MODEL: &str = "Model";
const ATTR_STD_DEV: &str = "StandardDeviation";

/// Value attribute name for a model kind.
fn value_attr(model: DecayModel) -> String {
    format!("{}Value", model.result_name())
}

/// DynamoDB-backed time-series store.
pub struct DynamoStore {
    client: aws_sdk_dynamodb::Client,
    region: String,
}

impl std::fmt::Debug for DynamoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoStore")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl DynamoStore {
    /// Connect using the default AWS credential chain
    /// (environment, SSO, config files, IAM role).
    pub async fn connect(region: impl Into<String>) -> Self {
        let region = region.into();

        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.clone()))
            .timeout_config(
                aws_config::timeout::TimeoutConfig::builder()
                    .operation_timeout(Duration::from_secs(30))
                    .connect_timeout(Duration::from_secs(10))
                    .build(),
            )
            .load()
            .await;

        Self {
            client: aws_sdk_dynamodb::Client::new(&config),
            region,
        }
    }

    /// Region this store writes to.
    pub fn region(&self) -> &str {
        &self.region
    }
}

fn to_item(record: &HistoryRecord) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (ATTR_QUBIT.to_string(), AttributeValue::N(record.qubit.to_string())),
        (
            ATTR_TIMESTAMP.to_string(),
            AttributeValue::S(record.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)),
        ),
        (
            ATTR_MODEL.to_string(),
            AttributeValue::S(record.model.result_name().to_string()),
        ),
        (value_attr(record.model), AttributeValue::N(record.value.to_string())),
        (ATTR_STD_DEV.to_string(), AttributeValue::N(record.std_dev.to_string())),
    ])
}

fn from_item(item: &HashMap<String, AttributeValue>) -> HistoryResult<HistoryRecord> {
    let n = |key: &str| -> HistoryResult<&String> {
        item.get(key)
            .and_then(|v| v.as_n().ok())
            .ok_or_else(|| HistoryError::Persistence(format!("item missing numeric {key}")))
    };
    let s = |key: &str| -> HistoryResult<&String> {
        item.get(key)
            .and_then(|v| v.as_s().ok())
            .ok_or_else(|| HistoryError::Persistence(format!("item missing string {key}")))
    };
    let parse = |key: &str, raw: &str| -> HistoryResult<f64> {
        raw.parse()
            .map_err(|_| HistoryError::Persistence(format!("{key} is not a number: {raw}")))
    };

    let model: DecayModel = s(ATTR_MODEL)?
        .parse()
        .map_err(|e: qqms_hal::HalError| HistoryError::Persistence(e.to_string()))?;
    let value_key = value_attr(model);
    let timestamp = s(ATTR_TIMESTAMP)?;

    Ok(HistoryRecord {
        qubit: n(ATTR_QUBIT)?
            .parse()
            .map_err(|_| HistoryError::Persistence("QubitNumber out of range".into()))?,
        timestamp: DateTime::parse_from_rfc3339(timestamp)
            .map_err(|e| HistoryError::Persistence(format!("bad timestamp {timestamp}: {e}")))?
            .with_timezone(&Utc),
        value: parse(&value_key, n(&value_key)?)?,
        std_dev: parse(ATTR_STD_DEV, n(ATTR_STD_DEV)?)?,
        model,
    })
}

#[async_trait]
impl TimeSeriesStore for DynamoStore {
    fn name(&self) -> &str {
        "dynamodb"
    }

    async fn append(&self, table: &str, record: &HistoryRecord) -> HistoryResult<()> {
        validate_table(table)?;
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(to_item(record)))
            .send()
            .await
            .map_err(|e| HistoryError::Persistence(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    async fn query(&self, table: &str, filter: &RecordFilter) -> HistoryResult<Vec<HistoryRecord>> {
        validate_table(table)?;
        let mut records = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let resp = self
                .client
                .scan()
                .table_name(table)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| HistoryError::Persistence(DisplayErrorContext(&e).to_string()))?;

            for item in resp.items() {
                match from_item(item) {
                    Ok(record) => records.push(record),
                    Err(e) => tracing::warn!("Skipping unreadable item in {}: {}", table, e),
                }
            }

            match resp.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(filter.apply(records))
    }
}
