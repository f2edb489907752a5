//! The `votesort validate` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use votesort_core::dataset::{filter_records, FilterConfig};
use votesort_core::model::Variant;
use votesort_core::traits::DataProvider;
use votesort_providers::FileProvider;

pub async fn execute(data: PathBuf) -> Result<()> {
    let records = FileProvider::new(&data).load().await?;
    let config = FilterConfig::default();

    println!("Data file: {} ({} records)", data.display(), records.len());

    let mut table = Table::new();
    table.set_header(vec![
        "Variant",
        "Kept",
        "Malformed",
        "Duplicate ids",
        "Too few answers",
        "Short top answer",
        "Playable",
    ]);

    let mut playable = 0;
    for variant in Variant::ALL {
        let (kept, report) = filter_records(records.clone(), variant, &config);
        let ok = kept.len() >= variant.min_playable();
        if ok {
            playable += 1;
        }
        table.add_row(vec![
            Cell::new(variant),
            Cell::new(format!("{}/{}", report.kept, report.total)),
            Cell::new(report.malformed),
            Cell::new(report.duplicate_ids),
            Cell::new(report.too_few_answers),
            Cell::new(report.short_top_answer),
            Cell::new(if ok { "yes" } else { "no" }),
        ]);
    }

    println!("{table}");
    if playable == Variant::ALL.len() {
        println!("All variants playable.");
    } else {
        println!("{playable}/{} variant(s) playable.", Variant::ALL.len());
    }

    Ok(())
}
