use std::path::{Path, PathBuf};

use choreboard_core::{AssignmentPromptSequencer, ChoreTask, Database, Event, SqliteSeenStore};
use clap::{Args, Subcommand};
use serde_json::json;

#[derive(Args)]
pub struct PromptContext {
    /// Family member whose assignments are prompted
    #[arg(long)]
    user: String,
    /// JSON array of tasks (the synced task list)
    #[arg(long)]
    tasks: PathBuf,
    /// Database file holding seen markers (defaults to the data directory)
    #[arg(long)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// Show the current prompt and all pending assignments
    List {
        #[command(flatten)]
        ctx: PromptContext,
    },
    /// Accept (default) or decline an assignment
    Respond {
        /// Task ID
        task_id: String,
        /// Decline instead of accepting
        #[arg(long)]
        decline: bool,
        #[command(flatten)]
        ctx: PromptContext,
    },
    /// Close a prompt without answering
    Dismiss {
        /// Task ID
        task_id: String,
        #[command(flatten)]
        ctx: PromptContext,
    },
    /// List task ids already prompted on this device
    Seen {
        /// Database file (defaults to the data directory)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

type Sequencer = AssignmentPromptSequencer<Vec<ChoreTask>, SqliteSeenStore>;

fn open_db(path: Option<&Path>) -> Result<Database, Box<dyn std::error::Error>> {
    let db = match path {
        Some(path) => Database::open_at(path)?,
        None => Database::open()?,
    };
    Ok(db)
}

fn load_sequencer(ctx: &PromptContext) -> Result<Sequencer, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(&ctx.tasks)
        .map_err(|e| format!("cannot read {}: {e}", ctx.tasks.display()))?;
    let tasks: Vec<ChoreTask> = serde_json::from_str(&content)?;
    let store = SqliteSeenStore::new(open_db(ctx.db.as_deref())?);
    let mut sequencer = AssignmentPromptSequencer::new(tasks, store, ctx.user.clone());
    sequencer.refresh();
    Ok(sequencer)
}

fn print_state(sequencer: &Sequencer, events: &[Event]) -> Result<(), Box<dyn std::error::Error>> {
    let out = json!({
        "user": sequencer.user_id(),
        "events": events,
        "current": sequencer.current(),
        "pending": sequencer.eligible_tasks(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

pub fn run(action: PromptsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PromptsAction::List { ctx } => {
            let sequencer = load_sequencer(&ctx)?;
            print_state(&sequencer, &[])?;
        }
        PromptsAction::Respond {
            task_id,
            decline,
            ctx,
        } => {
            let mut sequencer = load_sequencer(&ctx)?;
            let events = sequencer.respond(&task_id, !decline);
            if events.is_empty() {
                return Err(format!("no pending assignment with id {task_id}").into());
            }
            print_state(&sequencer, &events)?;
        }
        PromptsAction::Dismiss { task_id, ctx } => {
            let mut sequencer = load_sequencer(&ctx)?;
            let events = sequencer.dismiss_without_response(&task_id);
            if events.is_empty() {
                return Err(format!("no pending assignment with id {task_id}").into());
            }
            print_state(&sequencer, &events)?;
        }
        PromptsAction::Seen { db } => {
            let store = SqliteSeenStore::new(open_db(db.as_deref())?);
            println!("{}", serde_json::to_string_pretty(&store.seen_ids()?)?);
        }
    }
    Ok(())
}
