use axum::http::StatusCode;

use crate::app::models::api_error::ApiError;

#[derive(Debug)]
pub enum ReceiptsApiError {
    ReceiptNotFound,
    MalformedReceipt,
    InvalidNodeId,
}

impl ReceiptsApiError {
    pub fn value(&self) -> ApiError {
        match *self {
            Self::ReceiptNotFound => ApiError {
                code: StatusCode::NOT_FOUND,
                message: "Receipt not found.".to_string(),
            },
            Self::MalformedReceipt => ApiError {
                code: StatusCode::BAD_GATEWAY,
                message: "Malformed receipt.".to_string(),
            },
            Self::InvalidNodeId => ApiError {
                code: StatusCode::BAD_REQUEST,
                message: "Please enter a valid node id".to_string(),
            },
        }
    }
}
