use std::collections::BTreeMap;

use chrono::DateTime;
use sqlx::SqlitePool;

use crate::{
    app::{models::api_error::ApiError, util::time},
    receipts::{self, enums::receipt_type::ReceiptType, models::receipt::Receipt},
};

use super::models::{
    node_minting_period::NodeMintingPeriod,
    period::{Period, STANDARD_PERIOD_DURATION},
};

/// Decimal places of TFT on tfchain.
pub const TFT_DIVISOR: f64 = 1e7;

#[derive(Default)]
struct PeriodReceipts {
    minting: Vec<Receipt>,
    fixup: Option<Receipt>,
}

/// Groups a node's receipts into periods, oldest first.
///
/// Receipts are published a few days after a period ends, so the current
/// period never has receipts and the previous one may not have them yet.
/// Those are included as unpublished periods.
pub fn make_node_minting_periods(
    node_id: u32,
    receipts: Vec<Receipt>,
    now: i64,
) -> Vec<NodeMintingPeriod> {
    let mut by_period: BTreeMap<i64, PeriodReceipts> = BTreeMap::new();
    let mut last_end = 0;

    for receipt in receipts {
        last_end = last_end.max(receipt.period_end);

        let entry = by_period.entry(receipt.period_end).or_default();
        match receipt.kind() {
            Some(ReceiptType::Minting) => entry.minting.push(receipt),
            Some(ReceiptType::Fixup) => entry.fixup = Some(receipt),
            None => tracing::warn!("skipping receipt {} of unknown type", receipt.hash),
        }
    }

    let mut periods = Vec::new();

    for (_, mut receipts) in by_period {
        let result = match receipts.fixup.take() {
            Some(fixup) => {
                // Some hashes referenced by fixups are not returned by the API.
                let minted = find_by_hash(&receipts.minting, fixup.minted_receipt());
                let correct = find_by_hash(&receipts.minting, fixup.correct_receipt());

                NodeMintingPeriod::from_receipts(minted, correct, Some(fixup))
            }
            None => NodeMintingPeriod::from_receipts(receipts.minting.pop(), None, None),
        };

        if let Ok(period) = result {
            periods.push(period);
        }
    }

    let this_period = Period::containing(now);
    let previous_period = this_period.previous();

    let mut unpublished = vec![this_period];
    if last_end < previous_period.end {
        unpublished.push(previous_period);
    }

    for period in unpublished {
        if !periods.iter().any(|p| p.period.offset == period.offset) {
            periods.push(NodeMintingPeriod::for_unpublished_period(node_id, period));
        }
    }

    periods.sort_by_key(|p| p.period.start);

    periods
}

fn find_by_hash(receipts: &[Receipt], hash: Option<&str>) -> Option<Receipt> {
    let hash = hash?;
    receipts.iter().find(|receipt| receipt.hash == hash).cloned()
}

pub async fn get_node_minting_periods(
    node_id: u32,
    pool: &SqlitePool,
) -> Result<Vec<NodeMintingPeriod>, ApiError> {
    let receipts = receipts::service::get_node_receipts(node_id, pool).await?;

    Ok(make_node_minting_periods(
        node_id,
        receipts,
        time::current_time_in_secs() as i64,
    ))
}

/// Share of the period the node was up, in percent, two decimals.
pub fn uptime_percent(uptime: i64) -> f64 {
    (uptime as f64 / STANDARD_PERIOD_DURATION as f64 * 100.0 * 100.0).round() / 100.0
}

pub fn tft(raw: i64) -> f64 {
    raw as f64 / TFT_DIVISOR
}

pub fn format_date(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{fixup_receipt_json, minting_receipt_json, test_pool};

    fn minting(hash: &str, offset: i64, uptime: u64) -> Receipt {
        let period = Period::at_offset(offset);
        Receipt::from_value(minting_receipt_json(
            hash,
            3,
            period.start,
            period.end,
            uptime,
            uptime,
        ))
        .unwrap()
    }

    fn fixup(offset: i64, minted: &str, correct: &str) -> Receipt {
        let period = Period::at_offset(offset);
        Receipt::from_value(fixup_receipt_json(
            "fixup",
            3,
            period.start,
            period.end,
            minted,
            correct,
        ))
        .unwrap()
    }

    fn now_in(offset: i64) -> i64 {
        Period::at_offset(offset).start + 10
    }

    #[test]
    fn groups_receipts_and_adds_current_period() {
        let receipts = vec![minting("a", 10, 100), minting("b", 11, 200)];

        let periods = make_node_minting_periods(3, receipts, now_in(12));
        let offsets: Vec<i64> = periods.iter().map(|p| p.period.offset).collect();

        assert_eq!(offsets, vec![10, 11, 12]);
        assert_eq!(periods[1].uptime(), 200);
        assert!(!periods[2].has_receipt);
    }

    #[test]
    fn adds_previous_period_when_not_yet_published() {
        let receipts = vec![minting("a", 10, 100)];

        let periods = make_node_minting_periods(3, receipts, now_in(12));
        let offsets: Vec<i64> = periods.iter().map(|p| p.period.offset).collect();

        assert_eq!(offsets, vec![10, 11, 12]);
        assert_eq!(periods[1].status(), "Unpublished");
        assert_eq!(periods[2].status(), "Unpublished");
    }

    #[test]
    fn links_fixup_receipts_by_hash() {
        let receipts = vec![
            minting("orig", 10, 0),
            minting("fixed", 10, 300),
            fixup(10, "orig", "fixed"),
        ];

        let periods = make_node_minting_periods(3, receipts, now_in(11));

        assert_eq!(periods.len(), 2);
        let fixed = &periods[0];
        assert_eq!(fixed.minted_receipt.as_ref().unwrap().hash, "orig");
        assert_eq!(fixed.correct_receipt.as_ref().unwrap().hash, "fixed");
        assert_eq!(fixed.uptime(), 300);
        assert!(!fixed.empty);
    }

    #[test]
    fn fixup_with_unknown_hashes() {
        let receipts = vec![fixup(10, "gone", "also-gone")];

        let periods = make_node_minting_periods(3, receipts, now_in(11));

        assert!(periods[0].has_receipt);
        assert!(periods[0].minted_receipt.is_none());
        assert!(periods[0].correct_receipt.is_none());
        assert_eq!(periods[0].uptime(), 0);
    }

    #[test]
    fn no_receipts_yields_only_unpublished_periods() {
        let periods = make_node_minting_periods(3, vec![], now_in(12));
        let offsets: Vec<i64> = periods.iter().map(|p| p.period.offset).collect();

        assert_eq!(offsets, vec![11, 12]);
        assert!(periods.iter().all(|p| p.node_id == 3 && !p.has_receipt));
    }

    #[test]
    fn formats_values_for_display() {
        assert_eq!(uptime_percent(STANDARD_PERIOD_DURATION), 100.0);
        assert_eq!(uptime_percent(STANDARD_PERIOD_DURATION / 3), 33.33);
        assert_eq!(uptime_percent(0), 0.0);
        assert_eq!(tft(25_000_000), 2.5);
        assert_eq!(format_date(1_522_501_000), "2018-03-31");
    }

    #[tokio::test]
    async fn reads_periods_from_database() {
        let (_dir, pool) = test_pool().await;
        receipts::service::save_receipts(&[minting("a", 10, 100)], &pool)
            .await
            .unwrap();

        let periods = get_node_minting_periods(3, &pool).await.unwrap();

        assert_eq!(periods[0].period.offset, 10);
        let current = Period::containing(time::current_time_in_secs() as i64);
        assert_eq!(periods.last().unwrap().period, current);
    }

    #[tokio::test]
    async fn last_stored_minting_receipt_wins_without_fixup() {
        let (_dir, pool) = test_pool().await;
        receipts::service::save_receipts(&[minting("z", 10, 111), minting("a", 10, 222)], &pool)
            .await
            .unwrap();

        let periods = get_node_minting_periods(3, &pool).await.unwrap();

        let minted = periods[0].minted_receipt.as_ref().unwrap();
        assert_eq!(minted.hash, "a");
        assert_eq!(periods[0].uptime(), 222);
    }
}
