//! Project and milestone commands.

use chrono::Utc;
use clap::Subcommand;
use devtrack_core::storage::Database;
use devtrack_core::{Goal, Milestone, Project};

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a new project
    Add {
        /// Project name
        name: String,
    },
    /// List all projects
    List,
    /// Add a milestone with its tasks to a project
    AddMilestone {
        /// Project ID
        project_id: String,
        /// Milestone name
        name: String,
        /// Comma-separated task names
        #[arg(long, value_delimiter = ',')]
        tasks: Vec<String>,
    },
    /// Add a measurable goal to a project
    AddGoal {
        /// Project ID
        project_id: String,
        /// Target value
        target: u64,
        /// Unit, e.g. "hours", "sessions"
        unit: String,
    },
    /// Record progress toward a goal
    RecordGoal {
        /// Project ID
        project_id: String,
        /// Goal index within the project
        goal: usize,
        /// Amount to add
        amount: u64,
    },
    /// Mark a milestone task complete
    CompleteTask {
        /// Project ID
        project_id: String,
        /// Milestone index within the project
        milestone: usize,
        /// Task index within the milestone
        task: usize,
    },
}

fn find_project<'a>(
    projects: &'a mut [Project],
    id: &str,
) -> Result<&'a mut Project, Box<dyn std::error::Error>> {
    projects
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| format!("no project with id {id}").into())
}

pub fn run(action: ProjectAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut projects = db.load_projects()?;

    match action {
        ProjectAction::Add { name } => {
            let project = Project::new(name, Utc::now());
            println!("{}", serde_json::to_string_pretty(&project)?);
            projects.push(project);
            db.save_projects(&projects)?;
        }
        ProjectAction::List => {
            println!("{}", serde_json::to_string_pretty(&projects)?);
        }
        ProjectAction::AddMilestone {
            project_id,
            name,
            tasks,
        } => {
            let project = find_project(&mut projects, &project_id)?;
            project.milestones.push(Milestone::new(name, tasks));
            println!("{}", serde_json::to_string_pretty(&project)?);
            db.save_projects(&projects)?;
        }
        ProjectAction::AddGoal {
            project_id,
            target,
            unit,
        } => {
            let project = find_project(&mut projects, &project_id)?;
            project.goals.push(Goal::new(target, unit));
            println!("{}", serde_json::to_string_pretty(&project)?);
            db.save_projects(&projects)?;
        }
        ProjectAction::RecordGoal {
            project_id,
            goal,
            amount,
        } => {
            let project = find_project(&mut projects, &project_id)?;
            let entry = project
                .goals
                .get_mut(goal)
                .ok_or_else(|| format!("no goal at index {goal}"))?;
            entry.record(amount);
            println!("{}", serde_json::to_string_pretty(&project)?);
            db.save_projects(&projects)?;
        }
        ProjectAction::CompleteTask {
            project_id,
            milestone,
            task,
        } => {
            let project = find_project(&mut projects, &project_id)?;
            let entry = project
                .milestones
                .get_mut(milestone)
                .ok_or_else(|| format!("no milestone at index {milestone}"))?;
            entry.complete_task(task, Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&project)?);
            db.save_projects(&projects)?;
        }
    }
    Ok(())
}
