use chrono::Utc;
use clap::Subcommand;
use devtrack_core::storage::Database;
use devtrack_core::xp::xp_to_next_level;
use devtrack_core::{compute_streak, ProductivityEngine};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Level, XP and unlocked achievements
    Show,
    /// Progress for every achievement in the catalog
    Achievements,
    /// Current and longest streak
    Streak,
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        ProfileAction::Show => {
            let profile = db.load_profile()?;
            let output = serde_json::json!({
                "profile": profile,
                "xp_to_next_level": xp_to_next_level(profile.xp),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        ProfileAction::Achievements => {
            let engine = ProductivityEngine::new().with_history(
                db.list_activities()?,
                db.list_sessions()?,
                db.load_profile()?,
            );
            let progress = engine.achievement_progress();
            println!("{}", serde_json::to_string_pretty(&progress)?);
        }
        ProfileAction::Streak => {
            let streak = compute_streak(&db.list_activities()?, Utc::now().date_naive());
            println!("{}", serde_json::to_string_pretty(&streak)?);
        }
    }
    Ok(())
}
