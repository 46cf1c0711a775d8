// Interactive dashboard.
//
// Terminal setup/teardown, the event loop, and the bridge between the pure
// state machine in `app` and the async API client. Keyboard input is read on
// a dedicated thread and forwarded into the same queue as API completions,
// so the loop body is the only writer of application state.

pub mod app;
pub mod chat;
pub mod scroll;
pub mod ui;

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::api::types::UpdateTaskRequest;
use crate::api::{ApiClient, ApiError};
use crate::config::Config;
use crate::events::{ApiResponse, AppEvent, ChatContextData, DashboardData, MutationKind};
use app::{App, Command, FinalAction};

/// How often the screen is redrawn when nothing else happens.
const TICK: Duration = Duration::from_millis(200);

/// Run the dashboard until the user quits or asks for a login/logout.
pub async fn run(config: &Config) -> Result<FinalAction> {
    enable_raw_mode().context("failed to enable raw mode")?;
    // raw mode must not outlive a failed setup
    let mut terminal = match setup_terminal() {
        Ok(terminal) => terminal,
        Err(e) => {
            let _ = disable_raw_mode();
            return Err(e);
        }
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let shutdown = Arc::new(AtomicBool::new(false));
    let reader = spawn_key_reader(tx.clone(), shutdown.clone());

    let client = ApiClient::new(config);
    let result = run_event_loop(&mut terminal, client, config, tx, rx).await;

    shutdown.store(true, Ordering::Relaxed);
    let _ = reader.join();

    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("failed to create terminal")
}

/// Blocking crossterm reader; polls so it can notice the shutdown flag.
fn spawn_key_reader(
    tx: mpsc::UnboundedSender<AppEvent>,
    shutdown: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !shutdown.load(Ordering::Relaxed) {
            if !event::poll(Duration::from_millis(100)).unwrap_or(false) {
                continue;
            }
            let forwarded = match event::read() {
                Ok(Event::Key(key)) => tx.send(AppEvent::Key(key)),
                Ok(Event::Resize(w, h)) => tx.send(AppEvent::Resize(w, h)),
                Ok(_) => Ok(()),
                Err(_) => return,
            };
            if forwarded.is_err() {
                // loop is gone
                return;
            }
        }
    })
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    client: ApiClient,
    config: &Config,
    tx: mpsc::UnboundedSender<AppEvent>,
    mut rx: mpsc::UnboundedReceiver<AppEvent>,
) -> Result<FinalAction> {
    let (mut app, initial) = App::new(config.is_authenticated());
    if let Some(command) = initial {
        dispatch(&client, &tx, command);
    }

    let mut tick = tokio::time::interval(TICK);
    loop {
        terminal
            .draw(|frame| ui::draw(frame, &app))
            .context("failed to draw frame")?;

        tokio::select! {
            maybe = rx.recv() => {
                let Some(event) = maybe else {
                    return Ok(FinalAction::None);
                };
                let command = match event {
                    AppEvent::Key(key) => app.handle_key(key),
                    AppEvent::Api(response) => app.apply_api(response),
                    // redraw happens at the top of the loop anyway
                    AppEvent::Resize(..) => None,
                };
                if let Some(command) = command {
                    dispatch(&client, &tx, command);
                }
                if let Some(action) = app.outcome {
                    return Ok(action);
                }
            }
            _ = tick.tick() => {}
        }
    }
}

/// Execute one command on a spawned task. Exactly one ApiResponse comes
/// back on the queue, success or failure.
fn dispatch(client: &ApiClient, tx: &mpsc::UnboundedSender<AppEvent>, command: Command) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let response = execute(&client, command).await;
        let _ = tx.send(AppEvent::Api(response));
    });
}

async fn execute(client: &ApiClient, command: Command) -> ApiResponse {
    match command {
        Command::LoadBootstrap => ApiResponse::Bootstrap(client.get_me().await),
        Command::LoadDecisions { project_id } => {
            ApiResponse::Decisions(client.list_decisions(&project_id).await)
        }
        Command::LoadMemories { project_id } => {
            ApiResponse::Memories(client.list_memories(&project_id).await)
        }
        Command::LoadTasks { project_id } => {
            ApiResponse::Tasks(client.list_tasks(&project_id).await)
        }
        Command::LoadCapsules { project_id } => {
            ApiResponse::Capsules(client.list_capsules(&project_id).await)
        }
        Command::LoadGraphStats { project_id } => {
            ApiResponse::GraphStats(client.graph_stats(&project_id).await)
        }
        Command::LoadDashboard { project_id } => {
            let (decisions, memories, tasks, capsules) = tokio::join!(
                client.list_decisions(&project_id),
                client.list_memories(&project_id),
                client.list_tasks(&project_id),
                client.list_capsules(&project_id),
            );
            let data = (|| -> Result<DashboardData, ApiError> {
                Ok(DashboardData {
                    decisions: decisions?,
                    memories: memories?,
                    tasks: tasks?,
                    capsules: capsules?,
                })
            })();
            ApiResponse::Dashboard(data)
        }
        Command::LoadChatContext { project_id } => {
            let (decisions, memories) = tokio::join!(
                client.list_decisions(&project_id),
                client.list_memories(&project_id),
            );
            let data = (|| -> Result<ChatContextData, ApiError> {
                Ok(ChatContextData {
                    decisions: decisions?,
                    memories: memories?,
                })
            })();
            ApiResponse::ChatContext(data)
        }
        Command::AcceptDecision {
            project_id,
            decision_id,
        } => ApiResponse::Mutation(
            MutationKind::Decision,
            client
                .accept_decision(&project_id, &decision_id)
                .await
                .map(|_| ()),
        ),
        Command::DeprecateDecision {
            project_id,
            decision_id,
        } => ApiResponse::Mutation(
            MutationKind::Decision,
            client
                .deprecate_decision(&project_id, &decision_id)
                .await
                .map(|_| ()),
        ),
        Command::DeleteMemory {
            project_id,
            memory_id,
        } => ApiResponse::Mutation(
            MutationKind::Memory,
            client.delete_memory(&project_id, &memory_id).await,
        ),
        Command::DeleteTask {
            project_id,
            task_id,
        } => ApiResponse::Mutation(
            MutationKind::Task,
            client.delete_task(&project_id, &task_id).await,
        ),
        Command::SetTaskStatus {
            project_id,
            task_id,
            status,
        } => {
            let req = UpdateTaskRequest {
                status: Some(status),
                ..UpdateTaskRequest::default()
            };
            ApiResponse::Mutation(
                MutationKind::Task,
                client
                    .update_task(&project_id, &task_id, &req)
                    .await
                    .map(|_| ()),
            )
        }
        Command::SendChat {
            project_id,
            request,
        } => {
            let session_id = request.session_id.clone();
            let mut reply = String::new();
            let result = client
                .send_chat_message(&project_id, &request, |chunk| reply.push_str(chunk))
                .await;
            ApiResponse::ChatReply {
                session_id,
                result: result.map(|_| reply),
            }
        }
    }
}
