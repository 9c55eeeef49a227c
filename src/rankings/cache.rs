use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::{app::models::api_error::ApiError, periods::models::period::Period, receipts};

use super::{models::node_ranking::NodeRanking, service::rank_nodes};

/// What a ranking was computed from. Receipts are only ever added, so the
/// count moves whenever the stored data does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RankingSignature {
    receipt_count: i64,
    period_offset: i64,
}

#[derive(Debug)]
struct CachedRankings {
    signature: RankingSignature,
    rankings: Vec<NodeRanking>,
}

/// Last full ranking, reused until the receipts or the current period change.
#[derive(Debug, Default)]
pub struct RankingsCache {
    cached: Mutex<Option<CachedRankings>>,
}

impl RankingsCache {
    pub async fn top(
        &self,
        top: usize,
        now: i64,
        pool: &SqlitePool,
    ) -> Result<Vec<NodeRanking>, ApiError> {
        let signature = RankingSignature {
            receipt_count: receipts::service::count_receipts(pool).await?,
            period_offset: Period::containing(now).offset,
        };

        let mut cached = self.cached.lock().await;

        let fresh = matches!(cached.as_ref(), Some(entry) if entry.signature == signature);
        if !fresh {
            tracing::debug!("ranking {} receipt(s)", signature.receipt_count);
            *cached = Some(CachedRankings {
                signature,
                rankings: rank_nodes(pool, now).await?,
            });
        }

        Ok(cached
            .as_ref()
            .map(|entry| entry.rankings.iter().take(top).cloned().collect())
            .unwrap_or_default())
    }

    #[cfg(test)]
    async fn is_cached(&self) -> bool {
        self.cached.lock().await.is_some()
    }
}
