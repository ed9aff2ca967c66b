pub mod json;
pub mod table;

use crate::model::{HistoryResponse, SnapshotRecord};

pub fn print_history(response: &HistoryResponse, json_output: bool) {
    if json_output {
        println!("{}", json::render(response));
    } else {
        print!("{}", table::render(response));
    }
}

pub fn print_items(records: &[SnapshotRecord], json_output: bool) {
    if json_output {
        println!("{}", json::render_items(records));
    } else {
        print!("{}", table::render_items(records));
    }
}

pub fn print_diagnostics(diagnostics: &[String], verbose: bool) {
    if diagnostics.is_empty() {
        return;
    }

    println!();
    if verbose {
        println!("Diagnostics:");
        println!("{}", "-".repeat(40));
        for diagnostic in diagnostics {
            println!("  {diagnostic}");
        }
    } else {
        for diagnostic in diagnostics {
            println!("[diagnostic] {diagnostic}");
        }
    }
}
