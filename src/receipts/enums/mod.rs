pub mod receipt_type;
