//! Table formatting for CLI reports, built on `comfy-table`

use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets};

use crate::cli::style;

/// Create a table with a bold header row
pub fn table_with_columns(columns: &[&str]) -> Table {
    let use_color = style::colors_enabled();

    let mut table = Table::new();
    if use_color {
        table.load_preset(presets::UTF8_FULL);
        table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    } else {
        table.load_preset(presets::ASCII_FULL);
    }
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let header: Vec<Cell> = columns
        .iter()
        .map(|col| {
            let cell = Cell::new(*col);
            if use_color {
                cell.add_attribute(Attribute::Bold)
            } else {
                cell
            }
        })
        .collect();
    table.set_header(header);
    table
}

/// Add a row whose cells may carry a foreground color
pub fn add_colored_row(table: &mut Table, cells: &[(&str, Option<Color>)]) {
    let use_color = style::colors_enabled();

    let row: Vec<Cell> = cells
        .iter()
        .map(|(text, color)| {
            let cell = Cell::new(*text);
            match color {
                Some(c) if use_color => cell.fg(*c),
                _ => cell,
            }
        })
        .collect();
    table.add_row(row);
}
