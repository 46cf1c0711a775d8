//! The navigation state machine behind the interactive dashboard.
//!
//! `App` is a pure state container: `handle_key` and `apply_api` take one
//! event and return the command to run next, if any. Commands are plain
//! data; the event loop in `tui/mod.rs` executes them and feeds the single
//! completion back through `apply_api`. Keeping I/O out of here is what
//! makes every transition unit-testable.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::types::{
    Capsule, ChatRequest, Decision, DecisionStatus, GraphStats, Memory, Organization, Project,
    Task, TaskStatus, User,
};
use crate::events::{ApiResponse, DashboardData, MutationKind, ResponseKind};
use crate::tui::chat::ChatSession;
use crate::tui::scroll::ListCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Organizations,
    Projects,
    ProjectMenu,
    Dashboard,
    Decisions,
    Memories,
    Capsules,
    Tasks,
    Brain,
    Chat,
}

/// What the caller should do once the dashboard loop ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalAction {
    /// Plain quit.
    None,
    /// Run the device-code login flow, then restart the dashboard.
    Login,
    /// Clear stored credentials, then restart at the login screen.
    Logout,
}

/// An async API call the event loop should dispatch. Self-contained so the
/// executor never has to reach back into `App`.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadBootstrap,
    LoadDashboard { project_id: String },
    LoadDecisions { project_id: String },
    LoadMemories { project_id: String },
    LoadTasks { project_id: String },
    LoadCapsules { project_id: String },
    LoadGraphStats { project_id: String },
    LoadChatContext { project_id: String },
    AcceptDecision { project_id: String, decision_id: String },
    DeprecateDecision { project_id: String, decision_id: String },
    DeleteMemory { project_id: String, memory_id: String },
    DeleteTask { project_id: String, task_id: String },
    SetTaskStatus { project_id: String, task_id: String, status: TaskStatus },
    SendChat { project_id: String, request: Box<ChatRequest> },
}

/// Who is logged in and what they have drilled into.
#[derive(Debug, Default)]
pub struct Session {
    pub user: Option<User>,
    pub organizations: Vec<Organization>,
    pub projects: Vec<Project>,
    pub organization: Option<Organization>,
    pub project: Option<Project>,
}

impl Session {
    /// Projects belonging to the selected organization.
    pub fn org_projects(&self) -> Vec<&Project> {
        match &self.organization {
            Some(org) => self
                .projects
                .iter()
                .filter(|p| p.organization_id == org.id)
                .collect(),
            None => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Dashboard,
    Decisions,
    Memories,
    Capsules,
    Tasks,
    Brain,
    Chat,
    Separator,
    Back,
}

pub struct MenuItem {
    pub icon: &'static str,
    pub title: &'static str,
    pub detail: &'static str,
    pub action: MenuAction,
}

/// Fixed per-project menu; the blank row is a visual separator.
pub const PROJECT_MENU: &[MenuItem] = &[
    MenuItem { icon: "📊", title: "Dashboard", detail: "Project overview & stats", action: MenuAction::Dashboard },
    MenuItem { icon: "📋", title: "Decisions", detail: "View & manage decisions", action: MenuAction::Decisions },
    MenuItem { icon: "💾", title: "Memories", detail: "Project memories & context", action: MenuAction::Memories },
    MenuItem { icon: "📦", title: "Capsules", detail: "Context packs", action: MenuAction::Capsules },
    MenuItem { icon: "✅", title: "Tasks", detail: "Task management", action: MenuAction::Tasks },
    MenuItem { icon: "🧠", title: "Brain", detail: "Knowledge graph", action: MenuAction::Brain },
    MenuItem { icon: "🤖", title: "Hopper", detail: "AI assistant", action: MenuAction::Chat },
    MenuItem { icon: "", title: "", detail: "", action: MenuAction::Separator },
    MenuItem { icon: "🔙", title: "Back", detail: "Return to projects", action: MenuAction::Back },
];

pub struct App {
    pub screen: Screen,
    pub session: Session,
    pub cursor: ListCursor,
    pub loading: bool,
    pub error: Option<String>,
    pub decisions: Vec<Decision>,
    pub memories: Vec<Memory>,
    pub tasks: Vec<Task>,
    pub capsules: Vec<Capsule>,
    pub graph: Option<GraphStats>,
    pub dashboard: Option<DashboardData>,
    pub chat: ChatSession,
    /// Set when the loop should end.
    pub outcome: Option<FinalAction>,
}

impl App {
    /// Start at the login screen, or kick off the identity fetch if we
    /// already have a token.
    pub fn new(authenticated: bool) -> (Self, Option<Command>) {
        let mut app = Self {
            screen: Screen::Login,
            session: Session::default(),
            cursor: ListCursor::new(),
            loading: false,
            error: None,
            decisions: Vec::new(),
            memories: Vec::new(),
            tasks: Vec::new(),
            capsules: Vec::new(),
            graph: None,
            dashboard: None,
            chat: ChatSession::new(),
            outcome: None,
        };
        if authenticated {
            app.screen = Screen::Organizations;
            app.loading = true;
            (app, Some(Command::LoadBootstrap))
        } else {
            (app, None)
        }
    }

    /// Rows the cursor can land on for the current screen.
    pub fn list_len(&self) -> usize {
        match self.screen {
            Screen::Login => 1,
            // extra row is the synthetic Logout entry
            Screen::Organizations => self.session.organizations.len() + 1,
            Screen::Projects => self.session.org_projects().len(),
            Screen::ProjectMenu => PROJECT_MENU.len(),
            Screen::Decisions => self.decisions.len(),
            Screen::Memories => self.memories.len(),
            Screen::Tasks => self.tasks.len(),
            Screen::Capsules => self.capsules.len(),
            Screen::Dashboard | Screen::Brain | Screen::Chat => 0,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        self.error = None;

        if self.screen == Screen::Chat {
            return self.handle_chat_key(key);
        }

        let ctrl_c =
            key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
        if ctrl_c || key.code == KeyCode::Char('q') {
            self.go_back(true);
            return None;
        }
        if key.code == KeyCode::Esc {
            self.go_back(false);
            return None;
        }
        // A load in flight freezes movement and mutation, not navigation.
        if self.loading {
            return None;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.cursor.up(),
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.list_len();
                self.cursor.down(len);
            }
            // The project grid also answers to left/right.
            KeyCode::Left | KeyCode::Char('h') if self.screen == Screen::Projects => {
                self.cursor.up()
            }
            KeyCode::Right | KeyCode::Char('l') if self.screen == Screen::Projects => {
                let len = self.list_len();
                self.cursor.down(len);
            }
            KeyCode::Char('n') => self.handle_create_placeholder(),
            KeyCode::Char('a') => return self.handle_accept(),
            KeyCode::Char('x') => return self.handle_deprecate(),
            KeyCode::Char('d') => return self.handle_delete(),
            KeyCode::Char('t') => return self.handle_toggle(),
            KeyCode::Enter | KeyCode::Char(' ') => return self.handle_select(),
            _ => {}
        }
        None
    }

    fn handle_chat_key(&mut self, key: KeyEvent) -> Option<Command> {
        let ctrl_c =
            key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
        if ctrl_c || key.code == KeyCode::Esc {
            // Chat state does not survive leaving the screen.
            self.chat = ChatSession::new();
            self.screen = Screen::ProjectMenu;
            self.cursor.reset();
            self.loading = false;
            return None;
        }
        if self.chat.streaming {
            return None;
        }
        match key.code {
            KeyCode::Enter => {
                if self.chat.can_send() {
                    let project = self.session.project.as_ref()?;
                    let request = self.chat.begin_send(&project.name);
                    return Some(Command::SendChat {
                        project_id: project.id.clone(),
                        request: Box::new(request),
                    });
                }
                None
            }
            KeyCode::Backspace => {
                self.chat.backspace();
                None
            }
            KeyCode::Char(c) => {
                self.chat.push_char(c);
                None
            }
            _ => None,
        }
    }

    /// Back navigation; `quit_at_root` is true for q/ctrl-c, false for esc
    /// (which does nothing at the root screens).
    fn go_back(&mut self, quit_at_root: bool) {
        match self.screen {
            Screen::Dashboard
            | Screen::Decisions
            | Screen::Memories
            | Screen::Capsules
            | Screen::Tasks
            | Screen::Brain => {
                self.screen = Screen::ProjectMenu;
                self.cursor.reset();
                self.loading = false;
            }
            Screen::ProjectMenu => {
                self.screen = Screen::Projects;
                self.session.project = None;
                self.cursor.reset();
            }
            Screen::Projects => {
                self.screen = Screen::Organizations;
                self.session.organization = None;
                self.cursor.reset();
            }
            Screen::Login | Screen::Organizations => {
                if quit_at_root {
                    self.outcome = Some(FinalAction::None);
                }
            }
            Screen::Chat => {}
        }
    }

    fn handle_create_placeholder(&mut self) {
        self.error = match self.screen {
            Screen::Decisions => Some("Create decision: use the web app for now".into()),
            Screen::Memories => Some("Create memory: use the web app for now".into()),
            Screen::Tasks => Some("Create task: use the web app for now".into()),
            _ => None,
        };
    }

    fn handle_accept(&mut self) -> Option<Command> {
        if self.screen != Screen::Decisions {
            return None;
        }
        let project_id = self.session.project.as_ref()?.id.clone();
        let decision = self.decisions.get(self.cursor.selected)?;
        if decision.status.acceptable() {
            self.loading = true;
            Some(Command::AcceptDecision {
                project_id,
                decision_id: decision.id.clone(),
            })
        } else {
            self.error = Some("Can only accept DRAFT or PENDING decisions".into());
            None
        }
    }

    fn handle_deprecate(&mut self) -> Option<Command> {
        if self.screen != Screen::Decisions {
            return None;
        }
        let project_id = self.session.project.as_ref()?.id.clone();
        let decision = self.decisions.get(self.cursor.selected)?;
        if decision.status == DecisionStatus::Accepted {
            self.loading = true;
            Some(Command::DeprecateDecision {
                project_id,
                decision_id: decision.id.clone(),
            })
        } else {
            self.error = Some("Can only deprecate ACCEPTED decisions".into());
            None
        }
    }

    fn handle_delete(&mut self) -> Option<Command> {
        let project_id = self.session.project.as_ref()?.id.clone();
        match self.screen {
            Screen::Memories => {
                let memory = self.memories.get(self.cursor.selected)?;
                self.loading = true;
                Some(Command::DeleteMemory {
                    project_id,
                    memory_id: memory.id.clone(),
                })
            }
            Screen::Tasks => {
                let task = self.tasks.get(self.cursor.selected)?;
                self.loading = true;
                Some(Command::DeleteTask {
                    project_id,
                    task_id: task.id.clone(),
                })
            }
            _ => None,
        }
    }

    fn handle_toggle(&mut self) -> Option<Command> {
        if self.screen != Screen::Tasks {
            return None;
        }
        let project_id = self.session.project.as_ref()?.id.clone();
        let task = self.tasks.get(self.cursor.selected)?;
        self.loading = true;
        Some(Command::SetTaskStatus {
            project_id,
            task_id: task.id.clone(),
            status: task.status.toggled(),
        })
    }

    fn handle_select(&mut self) -> Option<Command> {
        match self.screen {
            Screen::Login => {
                self.outcome = Some(FinalAction::Login);
                None
            }
            Screen::Organizations => {
                let orgs = &self.session.organizations;
                if self.cursor.selected < orgs.len() {
                    self.session.organization = Some(orgs[self.cursor.selected].clone());
                    self.screen = Screen::Projects;
                    self.cursor.reset();
                } else if self.cursor.selected == orgs.len() {
                    self.outcome = Some(FinalAction::Logout);
                }
                None
            }
            Screen::Projects => {
                let project = self
                    .session
                    .org_projects()
                    .get(self.cursor.selected)
                    .map(|p| (*p).clone())?;
                self.session.project = Some(project);
                self.screen = Screen::ProjectMenu;
                self.cursor.reset();
                None
            }
            Screen::ProjectMenu => {
                let action = PROJECT_MENU.get(self.cursor.selected)?.action;
                let project_id = match action {
                    MenuAction::Back => {
                        self.screen = Screen::Projects;
                        self.session.project = None;
                        self.cursor.reset();
                        return None;
                    }
                    MenuAction::Separator => return None,
                    _ => self.session.project.as_ref()?.id.clone(),
                };
                self.cursor.reset();
                self.loading = true;
                match action {
                    MenuAction::Dashboard => {
                        self.screen = Screen::Dashboard;
                        Some(Command::LoadDashboard { project_id })
                    }
                    MenuAction::Decisions => {
                        self.screen = Screen::Decisions;
                        Some(Command::LoadDecisions { project_id })
                    }
                    MenuAction::Memories => {
                        self.screen = Screen::Memories;
                        Some(Command::LoadMemories { project_id })
                    }
                    MenuAction::Capsules => {
                        self.screen = Screen::Capsules;
                        Some(Command::LoadCapsules { project_id })
                    }
                    MenuAction::Tasks => {
                        self.screen = Screen::Tasks;
                        Some(Command::LoadTasks { project_id })
                    }
                    MenuAction::Brain => {
                        self.screen = Screen::Brain;
                        Some(Command::LoadGraphStats { project_id })
                    }
                    MenuAction::Chat => {
                        self.screen = Screen::Chat;
                        self.chat = ChatSession::new();
                        Some(Command::LoadChatContext { project_id })
                    }
                    MenuAction::Separator | MenuAction::Back => None,
                }
            }
            _ => None,
        }
    }

    /// Whether the current screen is still waiting for this kind of result.
    /// Anything else arrived late and must not touch state.
    fn expects(&self, kind: ResponseKind) -> bool {
        match self.screen {
            Screen::Organizations => kind == ResponseKind::Bootstrap,
            Screen::Dashboard => kind == ResponseKind::Dashboard,
            Screen::Decisions => matches!(
                kind,
                ResponseKind::Decisions | ResponseKind::Mutation(MutationKind::Decision)
            ),
            Screen::Memories => matches!(
                kind,
                ResponseKind::Memories | ResponseKind::Mutation(MutationKind::Memory)
            ),
            Screen::Tasks => matches!(
                kind,
                ResponseKind::Tasks | ResponseKind::Mutation(MutationKind::Task)
            ),
            Screen::Capsules => kind == ResponseKind::Capsules,
            Screen::Brain => kind == ResponseKind::GraphStats,
            Screen::Chat => {
                matches!(kind, ResponseKind::ChatContext | ResponseKind::ChatReply)
            }
            Screen::Login | Screen::Projects | Screen::ProjectMenu => false,
        }
    }

    /// Fold a completed API call into the state. Returns the follow-up
    /// command, if any (a successful mutation refetches its list).
    pub fn apply_api(&mut self, response: ApiResponse) -> Option<Command> {
        if !self.expects(response.kind()) {
            return None;
        }
        // A reply to a session the user already abandoned must not leak
        // into the replacement session, even though the screen matches.
        if let ApiResponse::ChatReply { session_id, .. } = &response {
            if session_id != self.chat.session_id() {
                return None;
            }
        }
        self.loading = false;
        match response {
            ApiResponse::Bootstrap(Ok(identity)) => {
                self.session.user = Some(identity.user);
                self.session.organizations = identity.organizations;
                self.session.projects = identity.projects;
                self.cursor.reset();
            }
            ApiResponse::Decisions(Ok(items)) => {
                self.decisions = items;
                self.cursor.reset();
            }
            ApiResponse::Memories(Ok(items)) => {
                self.memories = items;
                self.cursor.reset();
            }
            ApiResponse::Tasks(Ok(items)) => {
                self.tasks = items;
                self.cursor.reset();
            }
            ApiResponse::Capsules(Ok(items)) => {
                self.capsules = items;
                self.cursor.reset();
            }
            ApiResponse::GraphStats(Ok(stats)) => self.graph = Some(stats),
            ApiResponse::Dashboard(Ok(data)) => self.dashboard = Some(data),
            ApiResponse::ChatContext(Ok(context)) => {
                self.chat.set_context(&context.decisions, &context.memories);
            }
            ApiResponse::ChatReply {
                result: Ok(reply), ..
            } => self.chat.finish_send(&reply),
            ApiResponse::ChatReply {
                result: Err(err), ..
            } => {
                self.chat.abort_send();
                self.error = Some(format!("Error: {err}"));
            }
            ApiResponse::Mutation(kind, Ok(())) => {
                let project_id = self.session.project.as_ref()?.id.clone();
                self.loading = true;
                return Some(match kind {
                    MutationKind::Decision => Command::LoadDecisions { project_id },
                    MutationKind::Memory => Command::LoadMemories { project_id },
                    MutationKind::Task => Command::LoadTasks { project_id },
                });
            }
            ApiResponse::Bootstrap(Err(err))
            | ApiResponse::Decisions(Err(err))
            | ApiResponse::Memories(Err(err))
            | ApiResponse::Tasks(Err(err))
            | ApiResponse::Capsules(Err(err))
            | ApiResponse::GraphStats(Err(err))
            | ApiResponse::Dashboard(Err(err))
            | ApiResponse::ChatContext(Err(err))
            | ApiResponse::Mutation(_, Err(err)) => {
                self.error = Some(format!("Error: {err}"));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::events::ChatContextData;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn org(id: &str) -> Organization {
        Organization {
            id: id.into(),
            name: format!("org {id}"),
            slug: id.into(),
        }
    }

    fn project(id: &str, org_id: &str) -> Project {
        Project {
            id: id.into(),
            name: format!("project {id}"),
            slug: id.into(),
            description: String::new(),
            organization_id: org_id.into(),
        }
    }

    fn decision(id: &str, status: DecisionStatus) -> Decision {
        Decision {
            id: id.into(),
            statement: format!("statement {id}"),
            rationale: String::new(),
            status,
            created_at: String::new(),
            updated_at: String::new(),
            accepted_at: None,
            accepted_by: None,
            tags: Vec::new(),
        }
    }

    fn task(id: &str, status: TaskStatus) -> Task {
        Task {
            id: id.into(),
            title: format!("task {id}"),
            status,
            priority: crate::api::types::TaskPriority::Medium,
            created_at: String::new(),
        }
    }

    /// App sitting on the decision list of a selected project.
    fn app_on_decisions(decisions: Vec<Decision>) -> App {
        let (mut app, _) = App::new(true);
        app.loading = false;
        app.session.organizations = vec![org("o1")];
        app.session.projects = vec![project("p1", "o1")];
        app.session.organization = Some(org("o1"));
        app.session.project = Some(project("p1", "o1"));
        app.screen = Screen::Decisions;
        app.decisions = decisions;
        app
    }

    #[test]
    fn unauthenticated_starts_at_login_without_command() {
        let (app, cmd) = App::new(false);
        assert_eq!(app.screen, Screen::Login);
        assert!(cmd.is_none());
    }

    #[test]
    fn authenticated_starts_loading_identity() {
        let (app, cmd) = App::new(true);
        assert_eq!(app.screen, Screen::Organizations);
        assert!(app.loading);
        assert_eq!(cmd, Some(Command::LoadBootstrap));
    }

    #[test]
    fn movement_on_empty_list_never_panics() {
        let mut app = app_on_decisions(Vec::new());
        for _ in 0..5 {
            app.handle_key(key(KeyCode::Down));
            app.handle_key(key(KeyCode::Up));
        }
        assert_eq!(app.cursor.selected, 0);
        assert_eq!(app.screen, Screen::Decisions);
    }

    #[test]
    fn cursor_clamps_and_window_follows() {
        let decisions = (0..25)
            .map(|i| decision(&i.to_string(), DecisionStatus::Draft))
            .collect();
        let mut app = app_on_decisions(decisions);
        for _ in 0..15 {
            app.handle_key(key(KeyCode::Down));
        }
        assert_eq!(app.cursor.selected, 15);
        assert_eq!(app.cursor.offset, 6);
        for _ in 0..40 {
            app.handle_key(key(KeyCode::Down));
        }
        assert_eq!(app.cursor.selected, 24);
    }

    #[test]
    fn entering_feature_screen_resets_cursor_and_loads() {
        let (mut app, _) = App::new(true);
        app.loading = false;
        app.session.organization = Some(org("o1"));
        app.session.project = Some(project("p1", "o1"));
        app.screen = Screen::ProjectMenu;
        app.cursor.selected = 1; // Decisions
        let cmd = app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.screen, Screen::Decisions);
        assert_eq!(app.cursor.selected, 0);
        assert!(app.loading);
        assert_eq!(
            cmd,
            Some(Command::LoadDecisions {
                project_id: "p1".into()
            })
        );
    }

    #[test]
    fn back_unwinds_selection_level_by_level() {
        let mut app = app_on_decisions(Vec::new());
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.screen, Screen::ProjectMenu);
        assert!(app.session.project.is_some());

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.screen, Screen::Projects);
        assert!(app.session.project.is_none());

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.screen, Screen::Organizations);
        assert!(app.session.organization.is_none());

        // esc at the root does nothing; q quits
        app.handle_key(key(KeyCode::Esc));
        assert!(app.outcome.is_none());
        app.handle_key(key(KeyCode::Char('q')));
        assert_eq!(app.outcome, Some(FinalAction::None));
    }

    #[test]
    fn accept_requires_draft_or_pending() {
        let mut app = app_on_decisions(vec![decision("d1", DecisionStatus::Accepted)]);
        let cmd = app.handle_key(key(KeyCode::Char('a')));
        assert!(cmd.is_none());
        assert_eq!(
            app.error.as_deref(),
            Some("Can only accept DRAFT or PENDING decisions")
        );
        assert!(!app.loading);

        let mut app = app_on_decisions(vec![decision("d1", DecisionStatus::Pending)]);
        let cmd = app.handle_key(key(KeyCode::Char('a')));
        assert_eq!(
            cmd,
            Some(Command::AcceptDecision {
                project_id: "p1".into(),
                decision_id: "d1".into()
            })
        );
        assert!(app.loading);
    }

    #[test]
    fn deprecate_requires_accepted() {
        let mut app = app_on_decisions(vec![decision("d1", DecisionStatus::Draft)]);
        let cmd = app.handle_key(key(KeyCode::Char('x')));
        assert!(cmd.is_none());
        assert_eq!(
            app.error.as_deref(),
            Some("Can only deprecate ACCEPTED decisions")
        );

        let mut app = app_on_decisions(vec![decision("d1", DecisionStatus::Accepted)]);
        let cmd = app.handle_key(key(KeyCode::Char('x')));
        assert_eq!(
            cmd,
            Some(Command::DeprecateDecision {
                project_id: "p1".into(),
                decision_id: "d1".into()
            })
        );
    }

    #[test]
    fn toggle_follows_the_status_cycle() {
        let mut app = app_on_decisions(Vec::new());
        app.screen = Screen::Tasks;
        app.tasks = vec![task("t1", TaskStatus::Todo)];
        let cmd = app.handle_key(key(KeyCode::Char('t')));
        assert_eq!(
            cmd,
            Some(Command::SetTaskStatus {
                project_id: "p1".into(),
                task_id: "t1".into(),
                status: TaskStatus::InProgress,
            })
        );
    }

    #[test]
    fn error_clears_on_next_key() {
        let mut app = app_on_decisions(vec![decision("d1", DecisionStatus::Deprecated)]);
        app.handle_key(key(KeyCode::Char('a')));
        assert!(app.error.is_some());
        app.handle_key(key(KeyCode::Down));
        assert!(app.error.is_none());
    }

    #[test]
    fn stale_result_is_dropped() {
        let mut app = app_on_decisions(vec![decision("d1", DecisionStatus::Draft)]);
        app.screen = Screen::Memories;
        let cmd = app.apply_api(ApiResponse::Decisions(Ok(vec![
            decision("late", DecisionStatus::Draft),
        ])));
        assert!(cmd.is_none());
        assert_eq!(app.decisions.len(), 1);
        assert_eq!(app.decisions[0].id, "d1");
    }

    #[test]
    fn successful_mutation_refetches_its_list() {
        let mut app = app_on_decisions(vec![decision("d1", DecisionStatus::Draft)]);
        app.loading = true;
        let cmd = app.apply_api(ApiResponse::Mutation(MutationKind::Decision, Ok(())));
        assert_eq!(
            cmd,
            Some(Command::LoadDecisions {
                project_id: "p1".into()
            })
        );
        assert!(app.loading);
    }

    #[test]
    fn failed_load_keeps_prior_data() {
        let mut app = app_on_decisions(vec![decision("d1", DecisionStatus::Draft)]);
        app.loading = true;
        app.apply_api(ApiResponse::Decisions(Err(ApiError::Decode(
            "bad payload".into(),
        ))));
        assert!(!app.loading);
        assert!(app.error.is_some());
        assert_eq!(app.decisions.len(), 1);
    }

    #[test]
    fn empty_org_list_still_offers_logout() {
        let (mut app, _) = App::new(true);
        app.loading = false;
        // only row is the synthetic Logout entry
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.cursor.selected, 0);
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.outcome, Some(FinalAction::Logout));
    }

    #[test]
    fn second_send_while_streaming_is_rejected() {
        let mut app = app_on_decisions(Vec::new());
        app.screen = Screen::Chat;
        app.chat.input = "question".into();
        let cmd = app.handle_key(key(KeyCode::Enter));
        assert!(matches!(cmd, Some(Command::SendChat { .. })));
        assert!(app.chat.streaming);

        // typing and a second enter are ignored until the reply lands
        app.handle_key(key(KeyCode::Char('x')));
        let cmd = app.handle_key(key(KeyCode::Enter));
        assert!(cmd.is_none());
        assert!(app.chat.input.is_empty());

        app.apply_api(ApiResponse::ChatReply {
            session_id: app.chat.session_id().to_string(),
            result: Ok("**answer**".into()),
        });
        assert!(!app.chat.streaming);
        assert_eq!(app.chat.messages.last().unwrap().content, "answer");
    }

    #[test]
    fn reply_for_an_abandoned_session_is_dropped() {
        let mut app = app_on_decisions(Vec::new());
        app.screen = Screen::Chat;
        app.chat.input = "question".into();
        let cmd = app.handle_key(key(KeyCode::Enter));
        let Some(Command::SendChat { request, .. }) = cmd else {
            panic!("expected a chat send");
        };

        // leave chat while the reply is in flight, then start a new session
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.screen, Screen::ProjectMenu);
        app.screen = Screen::Chat;
        app.loading = true;
        assert_ne!(app.chat.session_id(), request.session_id);

        let cmd = app.apply_api(ApiResponse::ChatReply {
            session_id: request.session_id,
            result: Ok("ghost".into()),
        });
        assert!(cmd.is_none());
        assert!(app.chat.messages.is_empty());
        // the context load for the new session is still pending
        assert!(app.loading);
    }

    #[test]
    fn chat_esc_returns_to_menu_and_clears_state() {
        let mut app = app_on_decisions(Vec::new());
        app.screen = Screen::Chat;
        app.chat.input = "half-typed".into();
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.screen, Screen::ProjectMenu);
        assert!(app.chat.input.is_empty());
        assert!(app.chat.messages.is_empty());
    }

    #[test]
    fn ctrl_c_quits_outside_chat() {
        let (mut app, _) = App::new(true);
        app.loading = false;
        app.handle_key(ctrl('c'));
        assert_eq!(app.outcome, Some(FinalAction::None));
    }

    #[test]
    fn chat_context_snapshot_applied() {
        let mut app = app_on_decisions(Vec::new());
        app.screen = Screen::Chat;
        app.loading = true;
        app.apply_api(ApiResponse::ChatContext(Ok(ChatContextData {
            decisions: vec![decision("d1", DecisionStatus::Accepted)],
            memories: Vec::new(),
        })));
        assert!(!app.loading);
    }

    #[test]
    fn login_enter_requests_login_flow() {
        let (mut app, _) = App::new(false);
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.outcome, Some(FinalAction::Login));
    }
}
