use clap::Subcommand;
use devtrack_core::storage::Database;
use devtrack_core::{calendar, ActivityCategory, ActivityDraft, Config, ProductivityEngine};

use super::parse_enum;

#[derive(Subcommand)]
pub enum ActivityAction {
    /// Log a completed activity
    Log {
        /// Category, snake_case (e.g. "coding", "bug_fix", "code_review")
        category: String,
        /// What was done
        description: String,
        /// Duration in minutes
        #[arg(long)]
        duration: Option<u32>,
        /// Self-reported focus score, 1-10
        #[arg(long)]
        focus: Option<u8>,
        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        /// Project to attribute the work to
        #[arg(long)]
        project_id: Option<String>,
    },
    /// List logged activities
    List {
        /// Restrict to one calendar day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// List available categories with their XP bonus
    Categories,
}

pub fn run(action: ActivityAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        ActivityAction::Log {
            category,
            description,
            duration,
            focus,
            tags,
            project_id,
        } => {
            let category: ActivityCategory = parse_enum(&category)?;
            let mut draft = ActivityDraft::new(category, description).with_tags(tags);
            if let Some(minutes) = duration {
                draft = draft.with_duration(minutes);
            }
            if let Some(score) = focus {
                draft = draft.with_focus(score);
            }
            if let Some(id) = project_id {
                draft = draft.with_project(id);
            }

            let config = Config::load()?;
            let mut engine = ProductivityEngine::new()
                .with_rates(config.xp_rates())
                .with_history(db.list_activities()?, db.list_sessions()?, db.load_profile()?);

            let outcome = engine.log_activity(draft)?;
            db.insert_activity(&outcome.activity)?;
            db.save_profile(engine.profile())?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        ActivityAction::List { date } => {
            let activities = match date {
                Some(raw) => db.activities_on(calendar::parse_date(&raw)?)?,
                None => db.list_activities()?,
            };
            println!("{}", serde_json::to_string_pretty(&activities)?);
        }
        ActivityAction::Categories => {
            let listing: Vec<serde_json::Value> = ActivityCategory::ALL
                .iter()
                .map(|cat| {
                    serde_json::json!({
                        "category": cat,
                        "label": cat.label(),
                        "xp_bonus": cat.xp_bonus(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
    }
    Ok(())
}
