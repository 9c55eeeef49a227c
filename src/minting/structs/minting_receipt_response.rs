use serde::Deserialize;

/// One item of `/node/{id}`, or the body of `/{hash}`. Only the fields
/// stored in their own columns are read here; the receipt itself is kept
/// as returned.
#[derive(Debug, Clone, Deserialize)]
pub struct MintingReceiptResponse {
    pub hash: String,
    pub receipt: ReceiptBody,
}

#[derive(Debug, Clone, Deserialize)]
pub enum ReceiptBody {
    Minting(MintingBody),
    Fixup(FixupBody),
}

#[derive(Debug, Clone, Deserialize)]
pub struct MintingBody {
    pub node_id: u32,
    pub period: ReceiptPeriod,
    pub measured_uptime: Option<u64>,
    pub reward: Option<Reward>,
}

/// Issued when a minting run is corrected. It links the receipt that was
/// minted to the one with the correct values; both live in the same period.
#[derive(Debug, Clone, Deserialize)]
pub struct FixupBody {
    pub node_id: u32,
    pub period: ReceiptPeriod,
    pub minted_receipt: String,
    pub correct_receipt: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReceiptPeriod {
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Reward {
    pub tft: Option<u64>,
}
