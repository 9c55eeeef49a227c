pub mod api_error;
pub mod from_request;
