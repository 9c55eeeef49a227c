use crate::app::templates::node_form::node_form_template;

use super::{
    models::node_minting_period::NodeMintingPeriod,
    service::{format_date, tft, uptime_percent},
};

pub fn node_periods_template(node_id: u32, periods: &[NodeMintingPeriod]) -> String {
    let mut rows = String::new();

    for period in periods {
        let (start, end) = period.bounds();

        let (uptime, minted) = if period.has_receipt {
            (
                format!("{}%", uptime_percent(period.uptime())),
                match period.tft_minted() {
                    Some(raw) => tft(raw).to_string(),
                    None => "-".to_string(),
                },
            )
        } else {
            ("-".to_string(), "-".to_string())
        };

        rows.push_str(&format!(
            "
        <tr>
          <td>{}</td>
          <td>{}</td>
          <td>{}</td>
          <td>{}</td>
          <td>{}</td>
        </tr>",
            format_date(start),
            format_date(end),
            uptime,
            minted,
            period.status()
        ));
    }

    let notice = if periods.iter().any(|p| p.has_receipt) {
        String::new()
    } else {
        format!(
            "<p>No receipts stored for node {} yet.</p>",
            node_id
        )
    };

    format!(
        "
    {}
    {}
    <table>
      <thead>
        <tr>
          <th><strong>Period Start</strong></th>
          <th><strong>Period End</strong></th>
          <th><strong>Uptime</strong></th>
          <th><strong>TFT Minted</strong></th>
          <th><strong>Status</strong></th>
        </tr>
      </thead>
      <tbody>{}
      </tbody>
    </table>
    ",
        node_form_template(Some(&node_id.to_string()), None),
        notice,
        rows
    )
}
