#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use smarttask_api::UpdateBody;
use smarttask_client::TaskApiClient;
use smarttask_model::Task;
use std::process::ExitCode as ProcessExitCode;

#[derive(Parser)]
#[command(name = "smarttask")]
#[command(about = "Task list CLI over a smarttask server")]
struct Cli {
    /// Server base URL.
    #[arg(long, global = true, default_value = "http://localhost:3000")]
    server: String,
    /// Identity to act as. Falls back to the SMARTTASK_USER env var.
    #[arg(long, global = true)]
    user: Option<String>,
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summary of open and completed work.
    Dashboard,
    /// All tasks, newest first.
    List,
    /// Create a task.
    Add { title: String },
    /// Mark a task completed.
    Done { task_id: String },
    /// Retitle a task.
    Rename { task_id: String, title: String },
    /// Delete a task and its subtasks.
    Rm { task_id: String },
    /// Operate on subtasks.
    Subtask {
        #[command(subcommand)]
        command: SubtaskCommand,
    },
}

#[derive(Subcommand)]
enum SubtaskCommand {
    /// Create a subtask under a task.
    Add { task_id: String, title: String },
    /// Mark a subtask completed.
    Done { subtask_id: String },
    /// Retitle a subtask.
    Rename { subtask_id: String, title: String },
    /// Delete a subtask.
    Rm { subtask_id: String },
}

#[tokio::main]
async fn main() -> ProcessExitCode {
    match run().await {
        Ok(()) => ProcessExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ProcessExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let user = cli
        .user
        .or_else(|| std::env::var("SMARTTASK_USER").ok())
        .ok_or_else(|| "missing --user (or SMARTTASK_USER); see --help".to_string())?;
    let client = TaskApiClient::new(&cli.server)
        .map_err(|e| e.to_string())?
        .with_identity(user);

    match cli.command {
        Commands::Dashboard => dashboard(&client, cli.json).await,
        Commands::List => list(&client, cli.json).await,
        Commands::Add { title } => {
            let task = client.create_task(&title).await.map_err(|e| e.to_string())?;
            print_task(&task, cli.json)
        }
        Commands::Done { task_id } => {
            let update = UpdateBody {
                title: None,
                completed: Some(true),
            };
            let task = client
                .update_task(&task_id, &update)
                .await
                .map_err(|e| e.to_string())?;
            print_task(&task, cli.json)
        }
        Commands::Rename { task_id, title } => {
            let update = UpdateBody {
                title: Some(title),
                completed: None,
            };
            let task = client
                .update_task(&task_id, &update)
                .await
                .map_err(|e| e.to_string())?;
            print_task(&task, cli.json)
        }
        Commands::Rm { task_id } => {
            client.delete_task(&task_id).await.map_err(|e| e.to_string())?;
            println!("deleted {task_id}");
            Ok(())
        }
        Commands::Subtask { command } => match command {
            SubtaskCommand::Add { task_id, title } => {
                let sub = client
                    .create_subtask(&task_id, &title)
                    .await
                    .map_err(|e| e.to_string())?;
                print_json_or(cli.json, &sub, || {
                    println!("[ ] {}  {} (task {})", sub.id, sub.title, sub.task_id);
                })
            }
            SubtaskCommand::Done { subtask_id } => {
                let update = UpdateBody {
                    title: None,
                    completed: Some(true),
                };
                let sub = client
                    .update_subtask(&subtask_id, &update)
                    .await
                    .map_err(|e| e.to_string())?;
                print_json_or(cli.json, &sub, || {
                    println!("[x] {}  {}", sub.id, sub.title);
                })
            }
            SubtaskCommand::Rename { subtask_id, title } => {
                let update = UpdateBody {
                    title: Some(title),
                    completed: None,
                };
                let sub = client
                    .update_subtask(&subtask_id, &update)
                    .await
                    .map_err(|e| e.to_string())?;
                print_json_or(cli.json, &sub, || {
                    println!("{}  {}", sub.id, sub.title);
                })
            }
            SubtaskCommand::Rm { subtask_id } => {
                client
                    .delete_subtask(&subtask_id)
                    .await
                    .map_err(|e| e.to_string())?;
                println!("deleted {subtask_id}");
                Ok(())
            }
        },
    }
}

async fn dashboard(client: &TaskApiClient, json: bool) -> Result<(), String> {
    let tasks = client.list_tasks().await.map_err(|e| e.to_string())?;
    let done = tasks.iter().filter(|t| t.completed).count();
    let subtasks: usize = tasks.iter().map(|t| t.subtasks.len()).sum();
    let subtasks_done: usize = tasks
        .iter()
        .flat_map(|t| &t.subtasks)
        .filter(|s| s.completed)
        .count();

    if json {
        let payload = serde_json::json!({
            "tasks": tasks.len(),
            "tasksCompleted": done,
            "subtasks": subtasks,
            "subtasksCompleted": subtasks_done,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).map_err(|e| e.to_string())?
        );
        return Ok(());
    }

    println!("tasks: {done}/{} done", tasks.len());
    println!("subtasks: {subtasks_done}/{subtasks} done");
    for task in tasks.iter().take(5) {
        print_task_line(task);
    }
    Ok(())
}

async fn list(client: &TaskApiClient, json: bool) -> Result<(), String> {
    let tasks = client.list_tasks().await.map_err(|e| e.to_string())?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&tasks).map_err(|e| e.to_string())?
        );
        return Ok(());
    }
    for task in &tasks {
        print_task_line(task);
        for sub in &task.subtasks {
            let mark = if sub.completed { 'x' } else { ' ' };
            println!("    [{mark}] {}  {}", sub.id, sub.title);
        }
    }
    Ok(())
}

fn print_task(task: &Task, json: bool) -> Result<(), String> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(task).map_err(|e| e.to_string())?
        );
        return Ok(());
    }
    print_task_line(task);
    Ok(())
}

fn print_task_line(task: &Task) {
    let mark = if task.completed { 'x' } else { ' ' };
    println!("[{mark}] {}  {}", task.id, task.title);
}

fn print_json_or<T: serde::Serialize>(
    json: bool,
    value: &T,
    text: impl FnOnce(),
) -> Result<(), String> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(value).map_err(|e| e.to_string())?
        );
    } else {
        text();
    }
    Ok(())
}
