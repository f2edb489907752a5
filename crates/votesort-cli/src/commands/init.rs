//! The `votesort init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create votesort.toml
    if std::path::Path::new("votesort.toml").exists() {
        println!("votesort.toml already exists, skipping.");
    } else {
        std::fs::write("votesort.toml", SAMPLE_CONFIG)?;
        println!("Created votesort.toml");
    }

    // Create sample data
    std::fs::create_dir_all("data")?;
    let sample_path = std::path::Path::new("data/sample_data.json");
    if sample_path.exists() {
        println!("data/sample_data.json already exists, skipping.");
    } else {
        std::fs::write(sample_path, SAMPLE_DATA)?;
        println!("Created data/sample_data.json");
    }

    println!("\nNext steps:");
    println!("  1. Run: votesort validate --data data/sample_data.json");
    println!("  2. Run: votesort play --variant rank");
    println!("  3. Drop a daily export into data/ as YYYYMMDD_data.js and unset data_path");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# votesort configuration

# match, pair, rank or rank-once
variant = "rank"

# Fixed seed for reproducible deals; remove for a fresh game every run.
# seed = 42

# Explicit data file. Without it, today's <data_dir>/YYYYMMDD_data.js is used.
data_path = "data/sample_data.json"
data_dir = "data"

[filter]
min_answers = 3
min_top_answer_chars = 10
# by-votes sorts answers by votes; as-ingested trusts the file order.
answer_order = "by-votes"
"#;

const SAMPLE_DATA: &str = include_str!("../../../../data/sample_data.json");
