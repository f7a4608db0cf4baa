//! Terminal formatters for reports
//!
//! Every formatter renders either a comfy-table (human) or pretty JSON.

use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Row, Table};
use stageledger_types::{AssociationEarnings, CoordinatorEarnings, CostBreakdown, Report};

// ============================================================================
// Formatters
// ============================================================================

fn new_table(headers: &[&str], no_color: bool) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    // Apply colors only if enabled
    if no_color {
        table.set_header(headers.to_vec());
    } else {
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
    table
}

fn money_cell(amount: f64) -> Cell {
    Cell::new(format_money(amount)).set_alignment(CellAlignment::Right)
}

/// Format the full report: totals, associations and (if present) event details
pub fn format_report(report: &Report, json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
    }

    let totals = &report.overall_totals;
    let mut sections = vec![];

    let mut lines = vec![];
    lines.push(format!("Events:             {}", totals.total_events));
    lines.push(format!(
        "Revenue:            {}",
        format_money(totals.total_revenue)
    ));
    lines.push(format!(
        "Coordinator:        {}",
        format_money(totals.total_coordinator_earnings)
    ));
    lines.push(format!(
        "Associations:       {}",
        format_money(totals.total_association_earnings)
    ));
    lines.push(format!(
        "Certification:      {}",
        format_money(totals.total_certification_costs)
    ));
    if totals.undistributed() > 0.005 {
        lines.push(format!(
            "Undistributed:      {}",
            format_money(totals.undistributed())
        ));
    }
    sections.push(lines.join("\n"));

    if report.association_earnings.is_empty() {
        sections.push("No association earnings.".to_string());
    } else {
        let mut table = new_table(&["ID", "Association", "Events", "Earnings"], no_color);
        for association in &report.association_earnings {
            table.add_row(Row::from(vec![
                Cell::new(association.association_id),
                Cell::new(&association.association_name),
                Cell::new(association.events_count),
                money_cell(association.total_earnings),
            ]));
        }
        sections.push(table.to_string());
    }

    if let Some(details) = &report.events_with_earnings {
        if !details.is_empty() {
            let mut table = new_table(
                &["Event", "Title", "Cost", "Coordinator", "Cert.", "Split"],
                no_color,
            );
            for detail in details {
                let split = if detail.associations.is_empty() {
                    "-".to_string()
                } else {
                    detail
                        .associations
                        .iter()
                        .map(|a| {
                            format!(
                                "{} ({}): {}",
                                a.association_name,
                                a.volunteer_count,
                                format_money(a.earnings)
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                table.add_row(Row::from(vec![
                    Cell::new(detail.event_id),
                    Cell::new(truncate(&detail.event_title, 30)),
                    money_cell(detail.total_cost),
                    money_cell(detail.coordinator_share),
                    money_cell(detail.certification_cost),
                    Cell::new(split),
                ]));
            }
            sections.push(table.to_string());
        }
    }

    sections.join("\n\n")
}

/// Format one association's earnings
pub fn format_association(earnings: &AssociationEarnings, json: bool) -> String {
    if json {
        return serde_json::to_string_pretty(earnings).unwrap_or_else(|_| "{}".to_string());
    }

    let mut lines = vec![];
    lines.push(format!(
        "Association:      {} (#{})",
        earnings.association_name, earnings.association_id
    ));
    lines.push(format!("Events:           {}", earnings.events_count));
    lines.push(format!(
        "Earnings:         {}",
        format_money(earnings.total_earnings)
    ));
    lines.join("\n")
}

/// Format the coordinator's earnings
pub fn format_coordinator(earnings: &CoordinatorEarnings, json: bool) -> String {
    if json {
        return serde_json::to_string_pretty(earnings).unwrap_or_else(|_| "{}".to_string());
    }

    format!(
        "Coordinator:      Pro Loco\nEvents:           {}\nEarnings:         {}",
        earnings.events_count,
        format_money(earnings.total_earnings)
    )
}

/// Format a cost breakdown for one stage size
pub fn format_breakdown(breakdown: &CostBreakdown, json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(breakdown).unwrap_or_else(|_| "{}".to_string());
    }

    let mut table = new_table(&["Item", "Amount"], no_color);
    let rows = [
        (
            format!(
                "Stage {} m² × {}/m² + {} base",
                breakdown.stage_size, breakdown.rate_per_sqm, breakdown.base_cost
            ),
            breakdown.total_cost,
        ),
        (
            format!(
                "Coordinator ({:.0}%)",
                breakdown.coordinator_percentage * 100.0
            ),
            breakdown.coordinator_share,
        ),
        (
            "Certification".to_string(),
            breakdown.certification_fee,
        ),
        (
            "Available for associations".to_string(),
            breakdown.available_for_associations,
        ),
    ];
    for (label, amount) in rows {
        table.add_row(Row::from(vec![Cell::new(label), money_cell(amount)]));
    }
    table.to_string()
}

// ============================================================================
// Utilities
// ============================================================================

/// Two decimals with thousands separators: 1234.5 -> "1,234.50"
pub fn format_money(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && formatted != "0.00" {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, frac_part)
}

fn truncate(s: &str, max: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max {
        s.to_string()
    } else {
        s.chars().take(max - 1).collect::<String>() + "…"
    }
}

// ============================================================================
// Tests
// ============================================================================
