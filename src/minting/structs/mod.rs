pub mod minting_receipt_response;
