use std::collections::BTreeMap;

use sqlx::SqlitePool;

use crate::{
    app::{config::Config, models::api_error::ApiError, util},
    periods::{
        models::node_minting_period::NodeMintingPeriod,
        service::{make_node_minting_periods, uptime_percent},
    },
    receipts::{self, models::receipt::Receipt},
};

use super::models::node_ranking::NodeRanking;

/// Mean uptime over the periods that had any, and how many those were.
pub fn average_uptime(periods: &[NodeMintingPeriod]) -> (f64, usize) {
    let uptimes: Vec<i64> = periods
        .iter()
        .map(|period| period.uptime())
        .filter(|uptime| *uptime > 0)
        .collect();

    if uptimes.is_empty() {
        return (0.0, 0);
    }

    let total: i64 = uptimes.iter().sum();

    (total as f64 / uptimes.len() as f64, uptimes.len())
}

/// Nodes with any uptime, best first. Ties go to the lower node id.
pub fn rank(receipts: Vec<Receipt>, now: i64) -> Vec<NodeRanking> {
    let mut by_node: BTreeMap<u32, Vec<Receipt>> = BTreeMap::new();
    for receipt in receipts {
        by_node.entry(receipt.node_id).or_default().push(receipt);
    }

    let mut rankings: Vec<NodeRanking> = by_node
        .into_iter()
        .filter_map(|(node_id, receipts)| {
            let periods = make_node_minting_periods(node_id, receipts, now);
            let (average, counted) = average_uptime(&periods);

            if average <= 0.0 {
                return None;
            }

            Some(NodeRanking {
                rank: 0,
                node_id,
                average_uptime: average,
                uptime_percent: uptime_percent(average.round() as i64),
                periods_counted: counted,
            })
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.average_uptime
            .total_cmp(&a.average_uptime)
            .then(a.node_id.cmp(&b.node_id))
    });

    for (index, ranking) in rankings.iter_mut().enumerate() {
        ranking.rank = index + 1;
    }

    rankings
}

pub async fn rank_nodes(pool: &SqlitePool, now: i64) -> Result<Vec<NodeRanking>, ApiError> {
    let receipts = receipts::service::get_all_receipts(pool).await?;

    Ok(rank(receipts, now))
}

pub async fn get_top_rankings(top: usize, pool: &SqlitePool) -> Result<Vec<NodeRanking>, ApiError> {
    let mut rankings = rank_nodes(pool, util::time::current_time_in_secs() as i64).await?;
    rankings.truncate(top);

    Ok(rankings)
}

pub fn rankings_table(rankings: &[NodeRanking]) -> String {
    let mut table = format!(
        "Top {} Nodes by Average Uptime:\nRank\tNode ID\t\tAverage Uptime\n----------------------------------\n",
        rankings.len()
    );

    for ranking in rankings {
        table.push_str(&format!(
            "{}\t{}\t\t{:.2}%\n",
            ranking.rank, ranking.node_id, ranking.uptime_percent
        ));
    }

    table
}

/// `rank` subcommand.
pub async fn print_rankings(config: Config, top: usize) -> Result<(), ApiError> {
    let pool = util::sqlx::connect(&config.db_path).await?;
    let rankings = get_top_rankings(top, &pool).await?;

    print!("{}", rankings_table(&rankings));

    Ok(())
}
