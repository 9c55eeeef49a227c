pub mod get_receipts_filter_dto;
