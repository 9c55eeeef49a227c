use axum::http::StatusCode;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::{
    app::models::api_error::ApiError,
    receipts::{enums::receipt_type::ReceiptType, models::receipt::Receipt},
};

#[derive(Debug, Default, Deserialize, Validate)]
pub struct GetReceiptsFilterDto {
    pub node_id: Option<u32>,
    #[validate(custom(function = "validate_receipt_type"))]
    pub receipt_type: Option<String>,
    pub sort: Option<String>,
    pub cursor: Option<String>,
    #[validate(range(min = 1, max = 100, message = "limit must equal or less than 100."))]
    pub limit: Option<u8>,
}

fn validate_receipt_type(value: &str) -> Result<(), ValidationError> {
    if ReceiptType::from_value(value).is_none() {
        return Err(ValidationError::new("validate_receipt_type"));
    }

    Ok(())
}

impl GetReceiptsFilterDto {
    /// Builds the query; parameters are bound by the caller in the order
    /// node_id, receipt_type, cursor value, cursor hash.
    pub fn to_sql(&self) -> Result<String, ApiError> {
        let mut sql = "SELECT receipts.* FROM receipts".to_string();

        let mut clauses = Vec::new();

        let mut sort_field = "period_end".to_string();
        let mut sort_order = "DESC".to_string();
        let mut page_limit: u8 = 50;

        // WHERE CLAUSES
        if self.node_id.is_some() {
            clauses.push("receipts.node_id = ?".to_string());
        }
        if self.receipt_type.is_some() {
            clauses.push("receipts.receipt_type = ?".to_string());
        }

        // SORT
        if let Some(sort) = &self.sort {
            let sort_params: Vec<&str> = sort.split(",").collect();

            if sort_params.len() != 2 {
                return Err(ApiError {
                    code: StatusCode::BAD_REQUEST,
                    message: "Malformed sort query.".to_string(),
                });
            }
            if !Receipt::sortable_fields().contains(&sort_params[0]) {
                return Err(ApiError {
                    code: StatusCode::BAD_REQUEST,
                    message: "Invalid sort field.".to_string(),
                });
            }

            sort_field = sort_params[0].to_string();
            sort_order = sort_params[1].to_uppercase();
        }

        let direction = match sort_order.as_str() {
            "ASC" => ">",
            "DESC" => "<",
            _ => {
                return Err(ApiError {
                    code: StatusCode::BAD_REQUEST,
                    message: "Malformed sort query.".to_string(),
                })
            }
        };

        if self.cursor_params()?.is_some() {
            clauses.push(
                [
                    "(receipts.",
                    &sort_field,
                    ", receipts.hash) ",
                    direction,
                    " (?, ?)",
                ]
                .concat(),
            );
        }

        // CLAUSES BUILDER
        let mut has_inserted_where = false;

        for clause in clauses {
            if !has_inserted_where {
                sql.push_str(" WHERE ");
                has_inserted_where = true;
            } else {
                sql.push_str(" AND ");
            }

            sql.push_str(&clause);
        }

        // ORDER BY
        sql.push_str(
            &[
                " ORDER BY receipts.",
                &sort_field,
                " ",
                &sort_order,
                ", receipts.hash ",
                &sort_order,
            ]
            .concat(),
        );

        // LIMIT
        if let Some(limit) = self.limit {
            page_limit = limit;
        }

        sql.push_str(&[" LIMIT ", &page_limit.to_string()].concat());

        tracing::debug!(sql);

        Ok(sql)
    }

    /// Cursor is `<sort value>,<hash>` of the last receipt of the previous page.
    pub fn cursor_params(&self) -> Result<Option<(i64, String)>, ApiError> {
        let Some(cursor) = &self.cursor else {
            return Ok(None);
        };

        let malformed = || ApiError {
            code: StatusCode::BAD_REQUEST,
            message: "Malformed cursor.".to_string(),
        };

        let Some((value, hash)) = cursor.split_once(",") else {
            return Err(malformed());
        };
        let Ok(value) = value.parse::<i64>() else {
            return Err(malformed());
        };
        if hash.is_empty() {
            return Err(malformed());
        }

        Ok(Some((value, hash.to_string())))
    }
}
