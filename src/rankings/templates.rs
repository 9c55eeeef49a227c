use super::models::node_ranking::NodeRanking;

pub fn rankings_template(rankings: &[NodeRanking]) -> String {
    if rankings.is_empty() {
        return "<p>No nodes with recorded uptime yet.</p>".to_string();
    }

    let mut rows = String::new();

    for ranking in rankings {
        rows.push_str(&format!(
            "
        <tr>
          <td>{}</td>
          <td><a href=\"/nodes/{}\">{}</a></td>
          <td>{:.2}%</td>
          <td>{}</td>
        </tr>",
            ranking.rank,
            ranking.node_id,
            ranking.node_id,
            ranking.uptime_percent,
            ranking.periods_counted
        ));
    }

    format!(
        "
    <table>
      <thead>
        <tr>
          <th><strong>Rank</strong></th>
          <th><strong>Node ID</strong></th>
          <th><strong>Average Uptime</strong></th>
          <th><strong>Periods</strong></th>
        </tr>
      </thead>
      <tbody>{}
      </tbody>
    </table>
    ",
        rows
    )
}
