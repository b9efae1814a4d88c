use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use roundtrip_core::RunReport;
use roundtrip_state::SaveOutcome;

pub fn print_summary(report: &RunReport) {
    println!("Category: {}", report.category);
    println!(
        "Revision: {} -> {}",
        report.previous_revision.as_deref().unwrap_or("(none)"),
        report.revision
    );
    if report.dry_run {
        println!("Dry run: {} file(s) would be processed", report.work_set.len());
        for path in &report.work_set {
            println!("  {}", path.display());
        }
    }
    println!("{}", summary_table(report));
}

/// Build the run summary table.
pub fn summary_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Step"), header_cell("Detail"), header_cell("Files")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);

    match report.changes {
        Some(changes) => table.add_row(vec![
            Cell::new("Changes"),
            Cell::new(format!(
                "{} added, {} modified, {} deleted",
                changes.added, changes.modified, changes.deleted
            )),
            Cell::new(changes.added + changes.modified),
        ]),
        None => table.add_row(vec![
            Cell::new("Changes"),
            dim_cell("revision unchanged"),
            dim_cell("-"),
        ]),
    };
    table.add_row(vec![
        Cell::new("Output scan"),
        Cell::new(format!(
            "{} scanned, {} complete, {} failed earlier",
            report.gaps.scanned, report.gaps.outputs_present, report.gaps.skipped_failures
        )),
        Cell::new(report.gaps.selected),
    ]);
    table.add_row(vec![
        Cell::new("Work set").add_attribute(Attribute::Bold),
        Cell::new("changed ∪ missing outputs"),
        Cell::new(report.work_set.len()).add_attribute(Attribute::Bold),
    ]);

    if !report.dry_run {
        table.add_row(vec![
            Cell::new("Converted"),
            Cell::new("outputs written"),
            count_cell(report.succeeded, Color::Green),
        ]);
        table.add_row(vec![
            Cell::new("Skipped"),
            Cell::new("no matching fragment"),
            count_cell(report.skipped_no_fragment, Color::Yellow),
        ]);
        table.add_row(vec![
            Cell::new("Failed"),
            Cell::new("failure marker written"),
            count_cell(report.failed, Color::Red),
        ]);
        table.add_row(vec![
            Cell::new("State"),
            state_cell(report.state),
            dim_cell("-"),
        ]);
    }
    table
}

fn state_cell(state: Option<SaveOutcome>) -> Cell {
    match state {
        Some(SaveOutcome::Written) => Cell::new("revision recorded").fg(Color::Green),
        Some(SaveOutcome::Unchanged) => dim_cell("revision already recorded"),
        Some(SaveOutcome::Failed) => Cell::new("could not be saved")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
