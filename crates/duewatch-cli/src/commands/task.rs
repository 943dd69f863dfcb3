use chrono::Utc;
use clap::Subcommand;
use duewatch_core::monitor::parse_deadline;
use duewatch_core::storage::Database;
use duewatch_core::{Task, TaskStatus};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a task with a deadline
    Add {
        /// Task title
        title: String,
        /// Deadline (RFC 3339 or YYYY-MM-DD[THH:MM[:SS]])
        #[arg(long)]
        deadline: String,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
        /// Assignee name
        #[arg(long)]
        assigned_to: Option<String>,
        /// Priority (lower is more urgent)
        #[arg(long)]
        priority: Option<i32>,
        /// Initial status (Pending, In Progress, Completed)
        #[arg(long, default_value = "Pending")]
        status: String,
    },
    /// List tasks, soonest deadline first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single task as JSON
    Show {
        /// Task ID
        id: String,
    },
    /// Update task fields
    Update {
        /// Task ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        assigned_to: Option<String>,
        #[arg(long)]
        priority: Option<i32>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Mark a task as completed
    Complete {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Remove {
        /// Task ID
        id: String,
    },
}

fn find_task(db: &Database, id: &str) -> Result<Task, Box<dyn std::error::Error>> {
    db.get_task(id)?
        .ok_or_else(|| format!("no such task: {id}").into())
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        TaskAction::Add {
            title,
            deadline,
            description,
            assigned_to,
            priority,
            status,
        } => {
            let mut task = Task::new(title, deadline);
            task.description = description;
            task.assigned_to = assigned_to;
            task.priority = priority;
            task.status = status.parse::<TaskStatus>()?;
            if parse_deadline(&task.deadline).is_none() {
                eprintln!("warning: deadline does not parse; it will be treated as already passed");
            }
            db.insert_task(&task)?;
            eprintln!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { json } => {
            let tasks = db.list_tasks()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                eprintln!("No tasks.");
            } else {
                for task in &tasks {
                    println!(
                        "{}  [{}]  {}  (due {})",
                        task.id, task.status, task.title, task.deadline
                    );
                }
            }
        }
        TaskAction::Show { id } => {
            let task = find_task(&db, &id)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Update {
            id,
            title,
            deadline,
            description,
            assigned_to,
            priority,
            status,
        } => {
            let mut task = find_task(&db, &id)?;
            if let Some(title) = title {
                task.title = title;
            }
            if let Some(deadline) = deadline {
                if parse_deadline(&deadline).is_none() {
                    eprintln!(
                        "warning: deadline does not parse; it will be treated as already passed"
                    );
                }
                task.deadline = deadline;
            }
            if let Some(description) = description {
                task.description = Some(description);
            }
            if let Some(assigned_to) = assigned_to {
                task.assigned_to = Some(assigned_to);
            }
            if let Some(priority) = priority {
                task.priority = Some(priority);
            }
            if let Some(status) = status {
                task.status = status.parse::<TaskStatus>()?;
            }
            task.updated_at = Utc::now();
            db.update_task(&task)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Complete { id } => {
            let mut task = find_task(&db, &id)?;
            task.status = TaskStatus::Completed;
            task.updated_at = Utc::now();
            db.update_task(&task)?;
            eprintln!("Task completed: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Remove { id } => {
            if db.delete_task(&id)? {
                eprintln!("Task removed: {id}");
            } else {
                return Err(format!("no such task: {id}").into());
            }
        }
    }

    Ok(())
}
