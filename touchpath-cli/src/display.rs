//! Terminal tables. Money is rounded to cents here and nowhere else.

use comfy_table::{
    Cell, CellAlignment, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED,
};
use rust_decimal::Decimal;
use touchpath_core::{AttributionReport, ChannelSummary, ModelId, PathwaySummary};

/// Format a currency amount with two decimals
pub fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

fn percent(value: Decimal) -> String {
    format!("{:.1}%", value.round_dp(1))
}

fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    table
}

fn number(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Headline numbers for a run
pub fn summary_table(report: &AttributionReport) -> Table {
    let totals = &report.totals;
    let ingest = &report.ingest;
    let mut table = table(&["Metric", "Value"]);

    let rows: Vec<(&str, String)> = vec![
        ("Conversions", totals.conversions.to_string()),
        ("Total revenue", money(totals.total)),
        ("Attributed conversions", totals.attributed_conversions.to_string()),
        ("Attributed revenue", money(totals.attributed)),
        (
            "Unattributed conversions",
            totals.unattributed_conversions.to_string(),
        ),
        ("Unattributed revenue", money(totals.unattributed)),
        ("Attribution rows", report.rows.len().to_string()),
        ("Distinct pathways", report.pathway_summary.len().to_string()),
        ("Sessions accepted", ingest.sessions.accepted.to_string()),
        ("Impressions accepted", ingest.impressions.accepted.to_string()),
        ("Non-viewable impressions", ingest.impressions.filtered.to_string()),
        ("Records dropped", ingest.total_dropped().to_string()),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), number(value)]);
    }
    table
}

/// Grouped pathways, at most `limit` rows when given
pub fn pathway_table(summaries: &[PathwaySummary], limit: Option<usize>) -> Table {
    let mut table = table(&[
        "Path",
        "Conversions",
        "Revenue",
        "Avg revenue",
        "Avg length",
        "Share",
    ]);
    let shown = limit.unwrap_or(summaries.len());
    for summary in summaries.iter().take(shown) {
        table.add_row(vec![
            Cell::new(&summary.path),
            number(summary.conversion_count.to_string()),
            number(money(summary.total_revenue)),
            number(money(summary.avg_revenue)),
            number(format!("{:.1}", summary.avg_journey_length.round_dp(1))),
            number(percent(summary.pct_of_conversions)),
        ]);
    }
    table
}

/// One row per channel, one column per model
pub fn channel_table(summaries: &[ChannelSummary]) -> Table {
    let mut headers = vec!["Channel", "Touches"];
    headers.extend(ModelId::all().iter().map(ModelId::as_str));
    let mut table = table(&headers);

    for summary in summaries {
        let mut row = vec![
            Cell::new(&summary.channel),
            number(summary.touchpoints.to_string()),
        ];
        row.extend(
            ModelId::all()
                .iter()
                .map(|model| number(money(summary.credit(*model)))),
        );
        table.add_row(row);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use touchpath_core::Credits;

    #[test]
    fn test_money_rounds_to_cents() {
        assert_eq!(money(Decimal::new(333333, 4)), "33.33");
        assert_eq!(money(Decimal::from(40)), "40.00");
        assert_eq!(money(Decimal::new(6667, 3)), "6.67");
    }

    #[test]
    fn test_pathway_table_respects_limit() {
        let summaries: Vec<PathwaySummary> = ["direct", "email", "referral"]
            .iter()
            .map(|path| PathwaySummary {
                path: path.to_string(),
                conversion_count: 2,
                total_revenue: Decimal::from(20),
                avg_revenue: Decimal::from(10),
                avg_journey_length: Decimal::ONE,
                pct_of_conversions: Decimal::new(3333, 2),
            })
            .collect();

        let mut table = pathway_table(&summaries, Some(2));
        table.force_no_tty();
        let rendered = table.to_string();
        assert!(rendered.contains("direct"));
        assert!(rendered.contains("email"));
        assert!(!rendered.contains("referral"));
        assert!(rendered.contains("33.3%"));
    }

    #[test]
    fn test_channel_table_has_model_columns() {
        let summaries = vec![ChannelSummary {
            channel: "google_organic".into(),
            touchpoints: 3,
            credits: Credits {
                first_touch: Decimal::from(100),
                last_touch: Decimal::ZERO,
                linear: Decimal::new(3333, 2),
                position_based: Decimal::from(40),
            },
        }];
        let mut table = channel_table(&summaries);
        table.force_no_tty();
        let rendered = table.to_string();
        for model in ModelId::all() {
            assert!(rendered.contains(model.as_str()));
        }
        assert!(rendered.contains("google_organic"));
        assert!(rendered.contains("100.00"));
        assert!(rendered.contains("33.33"));
    }
}
