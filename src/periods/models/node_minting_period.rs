use serde::Serialize;

use crate::{
    app::models::api_error::ApiError,
    receipts::{errors::ReceiptsApiError, models::receipt::Receipt},
};

use super::period::Period;

/// All receipts of one node in one period.
///
/// A fixup run produces two more receipts for every node it touches: a
/// second `Minting` receipt with the correct values, and a `Fixup` receipt
/// linking it to the one originally minted. So a period holds either one
/// receipt or three. Periods whose receipts are not published yet hold none.
#[derive(Debug, Clone, Serialize)]
pub struct NodeMintingPeriod {
    pub node_id: u32,
    pub period: Period,
    pub minted_receipt: Option<Receipt>,
    pub correct_receipt: Option<Receipt>,
    pub fixup_receipt: Option<Receipt>,
    pub has_receipt: bool,
    pub empty: bool,
}

impl NodeMintingPeriod {
    pub fn from_receipts(
        minted_receipt: Option<Receipt>,
        correct_receipt: Option<Receipt>,
        fixup_receipt: Option<Receipt>,
    ) -> Result<Self, ApiError> {
        let Some(source) = minted_receipt.as_ref().or(fixup_receipt.as_ref()) else {
            tracing::warn!("period without minted or fixup receipt");
            return Err(ReceiptsApiError::MalformedReceipt.value());
        };

        let node_id = source.node_id;
        let period = Period::containing(source.period_start);

        let has_receipt =
            minted_receipt.is_some() || correct_receipt.is_some() || fixup_receipt.is_some();
        let empty = Self::is_empty(&minted_receipt, &correct_receipt, &fixup_receipt);

        Ok(Self {
            node_id,
            period,
            minted_receipt,
            correct_receipt,
            fixup_receipt,
            has_receipt,
            empty,
        })
    }

    pub fn for_unpublished_period(node_id: u32, period: Period) -> Self {
        Self {
            node_id,
            period,
            minted_receipt: None,
            correct_receipt: None,
            fixup_receipt: None,
            has_receipt: false,
            empty: false,
        }
    }

    fn is_empty(
        minted_receipt: &Option<Receipt>,
        correct_receipt: &Option<Receipt>,
        fixup_receipt: &Option<Receipt>,
    ) -> bool {
        let zero = |receipt: &Receipt| receipt.measured_uptime.unwrap_or(0) == 0;

        if fixup_receipt.is_some() {
            match (minted_receipt, correct_receipt) {
                (Some(minted), Some(correct)) => zero(minted) && zero(correct),
                (None, Some(correct)) => zero(correct),
                _ => false,
            }
        } else {
            match minted_receipt {
                Some(minted) => zero(minted),
                None => false,
            }
        }
    }

    /// The receipt whose values count: the corrected one when there was a fixup.
    pub fn effective_receipt(&self) -> Option<&Receipt> {
        self.correct_receipt.as_ref().or(self.minted_receipt.as_ref())
    }

    pub fn uptime(&self) -> i64 {
        self.effective_receipt()
            .and_then(|receipt| receipt.measured_uptime)
            .unwrap_or(0)
    }

    pub fn tft_minted(&self) -> Option<i64> {
        self.effective_receipt()?.tft_minted
    }

    /// Receipt bounds when published; a receipt start is later than the
    /// period start for nodes created during the period.
    pub fn bounds(&self) -> (i64, i64) {
        match self.effective_receipt().or(self.fixup_receipt.as_ref()) {
            Some(receipt) => (receipt.period_start, receipt.period_end),
            None => (self.period.start, self.period.end),
        }
    }

    pub fn status(&self) -> &'static str {
        if !self.has_receipt {
            "Unpublished"
        } else if self.fixup_receipt.is_some() {
            "Fixup"
        } else if self.empty {
            "No uptime"
        } else {
            "Minted"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{fixup_receipt_json, minting_receipt_json};

    fn minting(hash: &str, uptime: u64) -> Receipt {
        let period = Period::at_offset(70);
        Receipt::from_value(minting_receipt_json(
            hash,
            9,
            period.start,
            period.end,
            uptime,
            uptime * 10,
        ))
        .unwrap()
    }

    fn fixup() -> Receipt {
        let period = Period::at_offset(70);
        Receipt::from_value(fixup_receipt_json("f", 9, period.start, period.end, "m", "c"))
            .unwrap()
    }

    #[test]
    fn single_minting_receipt() {
        let period = NodeMintingPeriod::from_receipts(Some(minting("m", 100)), None, None).unwrap();

        assert_eq!(period.node_id, 9);
        assert_eq!(period.period, Period::at_offset(70));
        assert!(period.has_receipt);
        assert!(!period.empty);
        assert_eq!(period.uptime(), 100);
        assert_eq!(period.tft_minted(), Some(1_000));
        assert_eq!(period.status(), "Minted");
    }

    #[test]
    fn zero_uptime_is_empty() {
        let period = NodeMintingPeriod::from_receipts(Some(minting("m", 0)), None, None).unwrap();

        assert!(period.empty);
        assert_eq!(period.status(), "No uptime");
    }

    #[test]
    fn fixup_prefers_correct_receipt() {
        let period = NodeMintingPeriod::from_receipts(
            Some(minting("m", 0)),
            Some(minting("c", 250)),
            Some(fixup()),
        )
        .unwrap();

        assert!(!period.empty);
        assert_eq!(period.uptime(), 250);
        assert_eq!(period.status(), "Fixup");
    }

    #[test]
    fn fixup_empty_rules() {
        let both_zero = NodeMintingPeriod::from_receipts(
            Some(minting("m", 0)),
            Some(minting("c", 0)),
            Some(fixup()),
        )
        .unwrap();
        let only_correct =
            NodeMintingPeriod::from_receipts(None, Some(minting("c", 0)), Some(fixup())).unwrap();
        let neither = NodeMintingPeriod::from_receipts(None, None, Some(fixup())).unwrap();

        assert!(both_zero.empty);
        assert!(only_correct.empty);
        assert!(!neither.empty);
        assert_eq!(neither.uptime(), 0);
        assert_eq!(neither.bounds(), (Period::at_offset(70).start, Period::at_offset(70).end));
    }

    #[test]
    fn requires_minted_or_fixup() {
        assert!(NodeMintingPeriod::from_receipts(None, Some(minting("c", 1)), None).is_err());
    }

    #[test]
    fn unpublished_period() {
        let period = NodeMintingPeriod::for_unpublished_period(9, Period::at_offset(90));

        assert!(!period.has_receipt);
        assert!(!period.empty);
        assert_eq!(period.uptime(), 0);
        assert_eq!(period.tft_minted(), None);
        assert_eq!(period.status(), "Unpublished");
    }
}
