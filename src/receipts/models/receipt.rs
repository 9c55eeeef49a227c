use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{types::Json, FromRow};

use crate::{
    app::{models::api_error::ApiError, util::time},
    minting::structs::minting_receipt_response::{MintingReceiptResponse, ReceiptBody},
    receipts::{enums::receipt_type::ReceiptType, errors::ReceiptsApiError},
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Receipt {
    pub hash: String,
    pub node_id: u32,
    pub receipt_type: String,
    pub period_start: i64,
    pub period_end: i64,
    pub measured_uptime: Option<i64>,
    pub tft_minted: Option<i64>,
    /// The flattened receipt: the API body with `type` and `hash` added.
    pub receipt_data: Json<Value>,
    #[serde(skip_serializing)]
    pub fetched_at: i64,
}

impl Receipt {
    /// Lifts `body`, the value under the `Minting`/`Fixup` tag, out of its
    /// tag. `response` is the same item read for the indexed columns.
    pub fn new(response: MintingReceiptResponse, body: Option<Value>) -> Result<Self, ApiError> {
        if response.hash.trim().is_empty() {
            tracing::warn!("receipt without hash: {:?}", response);
            return Err(ReceiptsApiError::MalformedReceipt.value());
        }

        let (receipt_type, node_id, period, measured_uptime, tft_minted) = match &response.receipt
        {
            ReceiptBody::Minting(body) => (
                ReceiptType::Minting,
                body.node_id,
                body.period,
                body.measured_uptime.map(|uptime| uptime as i64),
                body.reward
                    .as_ref()
                    .and_then(|reward| reward.tft)
                    .map(|tft| tft as i64),
            ),
            ReceiptBody::Fixup(body) => {
                (ReceiptType::Fixup, body.node_id, body.period, None, None)
            }
        };

        let Some(Value::Object(mut data)) = body else {
            tracing::warn!("receipt {} could not be flattened", response.hash);
            return Err(ReceiptsApiError::MalformedReceipt.value());
        };

        data.insert("type".to_string(), Value::String(receipt_type.value()));
        data.insert("hash".to_string(), Value::String(response.hash.to_string()));

        Ok(Self {
            hash: response.hash,
            node_id,
            receipt_type: receipt_type.value(),
            period_start: period.start,
            period_end: period.end,
            measured_uptime,
            tft_minted,
            receipt_data: Json(Value::Object(data)),
            fetched_at: time::current_time_in_secs() as i64,
        })
    }

    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        let response = match MintingReceiptResponse::deserialize(&value) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("unrecognized receipt: {}", e);
                return Err(ReceiptsApiError::MalformedReceipt.value());
            }
        };

        let tag = match response.receipt {
            ReceiptBody::Minting(_) => ReceiptType::Minting,
            ReceiptBody::Fixup(_) => ReceiptType::Fixup,
        };
        let body = match value {
            Value::Object(mut item) => match item.remove("receipt") {
                Some(Value::Object(mut tagged)) => tagged.remove(&tag.value()),
                _ => None,
            },
            _ => None,
        };

        Self::new(response, body)
    }

    pub fn kind(&self) -> Option<ReceiptType> {
        ReceiptType::from_value(&self.receipt_type)
    }

    /// Fixup only: hash of the receipt that was originally minted.
    pub fn minted_receipt(&self) -> Option<&str> {
        self.receipt_data.0.get("minted_receipt")?.as_str()
    }

    /// Fixup only: hash of the receipt holding the corrected values.
    pub fn correct_receipt(&self) -> Option<&str> {
        self.receipt_data.0.get("correct_receipt")?.as_str()
    }

    pub fn sortable_fields() -> [&'static str; 2] {
        return ["period_end", "fetched_at"];
    }
}
