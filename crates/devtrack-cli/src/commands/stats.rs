use chrono::Utc;
use clap::Subcommand;
use devtrack_core::analytics;
use devtrack_core::storage::Database;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Full analytics report (hourly/weekday/weekly rollups, trend)
    Report,
    /// Aggregate counters, with today's slice broken out
    Summary,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        StatsAction::Report => {
            let report = analytics::analyze(&db.list_activities()?, &db.list_sessions()?);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        StatsAction::Summary => {
            let stats = db.stats(Utc::now().date_naive())?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
