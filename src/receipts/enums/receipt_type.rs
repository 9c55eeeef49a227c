#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptType {
    Minting,
    Fixup,
}

impl ReceiptType {
    pub fn value(&self) -> String {
        match *self {
            Self::Minting => "Minting".to_string(),
            Self::Fixup => "Fixup".to_string(),
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "Minting" => Some(Self::Minting),
            "Fixup" => Some(Self::Fixup),
            _ => None,
        }
    }
}
