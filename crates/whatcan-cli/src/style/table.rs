//! Table formatting using comfy-table.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use whatcan_rbac::RuleRow;

const COLUMNS: [&str; 4] = ["RESOURCE NAME", "RESOURCE", "API GROUP", "VERBS"];

/// Creates a styled table with one row per compacted rule.
pub fn rule_table(rows: &[RuleRow]) -> Table {
    let mut table = Table::new();

    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    // Add header row with bold styling
    let header_cells: Vec<Cell> = COLUMNS
        .iter()
        .map(|col| {
            if super::no_color() {
                Cell::new(col)
            } else {
                Cell::new(col)
                    .add_attribute(Attribute::Bold)
                    .fg(Color::Cyan)
            }
        })
        .collect();
    table.set_header(header_cells);

    for row in rows {
        table.add_row(vec![
            Cell::new(&row.resource_name),
            Cell::new(&row.resource),
            Cell::new(&row.api_group),
            Cell::new(row.verbs.join(" ")),
        ]);
    }

    table
}

/// Prints compacted rules as a formatted table.
pub fn print_rule_table(rows: &[RuleRow]) {
    println!("{}", rule_table(rows));
}
