use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::form::{Field, Form, FormAction};
use crate::application::session_service::SessionService;
use crate::application::todo_service::TodoCollection;
use crate::domain::api::{AuthApi, TodoApi};
use crate::domain::query::{SortKey, SortOrder, TodoFilters};
use crate::domain::session::{ProfileForm, Registration};
use crate::domain::store::SessionStore;
use crate::domain::todo::{parse_calendar_date, NewTodo, Todo, TodoId, TodoPatch, TodoPriority, TodoStatus, TITLE_MAX_LEN};

const ALL: &str = "All";
const ASCENDING: &str = "Ascending";
const DESCENDING: &str = "Descending";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Login(Form),
    Register(Form),
    Dashboard,
    TodoForm { form: Form, editing: Option<TodoId> },
    Filters(Form),
    Profile(Form),
    ConfirmDelete { id: TodoId, title: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

/// Terminal application state: both services plus what is on screen.
pub struct App<A, S>
where
    A: AuthApi + TodoApi + Clone,
    S: SessionStore,
{
    pub sessions: SessionService<A, S>,
    pub todos: TodoCollection<A>,
    pub screen: Screen,
    pub selected: usize,
    pub notice: Option<Notice>,
    pub should_quit: bool,
}

impl<A, S> App<A, S>
where
    A: AuthApi + TodoApi + Clone,
    S: SessionStore,
{
    pub fn new(api: A, store: S) -> Self {
        Self {
            sessions: SessionService::new(api.clone(), store),
            todos: TodoCollection::new(api),
            screen: Screen::Login(login_form()),
            selected: 0,
            notice: None,
            should_quit: false,
        }
    }

    /// Restores a stored session and loads its todos, or shows the login screen.
    pub async fn start(&mut self) {
        if self.sessions.restore().await.is_some() {
            self.enter_dashboard().await;
        } else {
            self.screen = Screen::Login(login_form());
        }
    }

    pub fn visible(&self) -> Vec<&Todo> { self.todos.filtered_and_sorted() }

    pub fn selected_todo(&self) -> Option<Todo> { self.visible().get(self.selected).map(|t| (*t).clone()) }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        let screen = std::mem::replace(&mut self.screen, Screen::Dashboard);
        self.screen = match screen {
            Screen::Login(form) => self.on_login(form, key).await,
            Screen::Register(form) => self.on_register(form, key).await,
            Screen::Dashboard => self.on_dashboard(key).await,
            Screen::TodoForm { form, editing } => self.on_todo_form(form, editing, key).await,
            Screen::Filters(form) => self.on_filters(form, key).await,
            Screen::Profile(form) => self.on_profile(form, key).await,
            Screen::ConfirmDelete { id, title } => self.on_confirm_delete(id, title, key).await,
        };
    }

    fn notify(&mut self, text: impl Into<String>) { self.notice = Some(Notice { text: text.into(), is_error: false }); }

    fn alert(&mut self, text: impl Into<String>) { self.notice = Some(Notice { text: text.into(), is_error: true }); }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if len == 0 { self.selected = 0; } else if self.selected >= len { self.selected = len - 1; }
    }

    async fn enter_dashboard(&mut self) {
        self.selected = 0;
        self.screen = Screen::Dashboard;
        if self.todos.refresh(self.sessions.current()).await.is_err() {
            tracing::debug!("dashboard opened with a failed load");
        }
    }

    async fn on_login(&mut self, mut form: Form, key: KeyEvent) -> Screen {
        if key.code == KeyCode::Char('r') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Screen::Register(register_form());
        }
        match form.input(key) {
            FormAction::Cancel => {
                self.should_quit = true;
                Screen::Login(form)
            }
            FormAction::Edited => Screen::Login(form),
            FormAction::Submit => {
                let (email, password) = (form.trimmed("Email"), form.value("Password").to_string());
                if email.is_empty() || password.is_empty() {
                    form.fail("Please fill in all fields");
                    return Screen::Login(form);
                }
                match self.sessions.login(&email, &password).await {
                    Ok(()) => {
                        self.enter_dashboard().await;
                        self.notify("Logged in");
                        Screen::Dashboard
                    }
                    Err(e) => {
                        form.fail(e.message);
                        Screen::Login(form)
                    }
                }
            }
        }
    }

    async fn on_register(&mut self, mut form: Form, key: KeyEvent) -> Screen {
        match form.input(key) {
            FormAction::Cancel => Screen::Login(login_form()),
            FormAction::Edited => Screen::Register(form),
            FormAction::Submit => {
                let input = Registration {
                    full_name: form.trimmed("Full name"),
                    user_name: form.trimmed("User name"),
                    email: form.trimmed("Email"),
                    password: form.value("Password").to_string(),
                    confirm_password: form.value("Confirm password").to_string(),
                };
                if [&input.full_name, &input.user_name, &input.email, &input.password, &input.confirm_password].iter().any(|v| v.is_empty()) {
                    form.fail("Please fill in all fields");
                    return Screen::Register(form);
                }
                if input.password != input.confirm_password {
                    form.fail("Passwords do not match");
                    return Screen::Register(form);
                }
                match self.sessions.register(&input).await {
                    Ok(()) => {
                        self.enter_dashboard().await;
                        self.notify("Account created");
                        Screen::Dashboard
                    }
                    Err(e) => {
                        form.fail(e.message);
                        Screen::Register(form)
                    }
                }
            }
        }
    }

    async fn on_dashboard(&mut self, key: KeyEvent) -> Screen {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.visible().len() { self.selected += 1; }
            }
            KeyCode::Char('n') => return Screen::TodoForm { form: todo_form(None), editing: None },
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(todo) = self.selected_todo() {
                    let fetched = self.todos.get_todo_by_id(self.sessions.current(), &todo.id).await;
                    let latest = fetched.unwrap_or(todo);
                    return Screen::TodoForm { form: todo_form(Some(&latest)), editing: Some(latest.id) };
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('c') => {
                if let Some(todo) = self.selected_todo() {
                    let reopening = todo.status == TodoStatus::Completed;
                    match self.todos.toggle_completed(self.sessions.current(), &todo).await {
                        Ok(()) => self.notify(if reopening { "Todo marked as pending" } else { "Todo completed!" }),
                        Err(e) => self.alert(e.message),
                    }
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(todo) = self.selected_todo() {
                    return Screen::ConfirmDelete { id: todo.id, title: todo.title };
                }
            }
            KeyCode::Char('f') => return Screen::Filters(filters_form(self.todos.filters(), self.todos.sort())),
            KeyCode::Char('s') => {
                let (key, order) = self.todos.sort();
                let next = match key { SortKey::DueDate => SortKey::Priority, SortKey::Priority => SortKey::CreatedAt, SortKey::CreatedAt => SortKey::DueDate };
                self.apply_sorting(next, order).await;
            }
            KeyCode::Char('o') => {
                let (key, order) = self.todos.sort();
                self.apply_sorting(key, order.flip()).await;
            }
            KeyCode::Char('x') => {
                let session = self.sessions.current();
                let cleared = self.todos.set_view(session, TodoFilters::default(), SortKey::default(), SortOrder::default()).await;
                if let Err(e) = cleared { self.alert(e.message); }
            }
            KeyCode::Char('r') => {
                if let Err(e) = self.todos.refresh(self.sessions.current()).await { self.alert(e.message); }
            }
            KeyCode::Char('p') => {
                if let Some(session) = self.sessions.current() {
                    return Screen::Profile(profile_form(&session.full_name, &session.email));
                }
            }
            KeyCode::Char('l') => {
                self.sessions.logout().await;
                self.todos.refresh(None).await.ok();
                self.notify("Logged out successfully");
                return Screen::Login(login_form());
            }
            _ => {}
        }
        self.clamp_selection();
        Screen::Dashboard
    }

    async fn apply_sorting(&mut self, key: SortKey, order: SortOrder) {
        if let Err(e) = self.todos.set_sorting(self.sessions.current(), key, order).await { self.alert(e.message); }
        self.clamp_selection();
    }

    async fn on_todo_form(&mut self, mut form: Form, editing: Option<TodoId>, key: KeyEvent) -> Screen {
        match form.input(key) {
            FormAction::Cancel => Screen::Dashboard,
            FormAction::Edited => Screen::TodoForm { form, editing },
            FormAction::Submit => {
                let title = form.trimmed("Title");
                let due_date = form.trimmed("Due date (YYYY-MM-DD)");
                if title.is_empty() || due_date.is_empty() {
                    form.fail("Please fill in all required fields");
                    return Screen::TodoForm { form, editing };
                }
                if title.chars().count() > TITLE_MAX_LEN {
                    form.fail("Title must be less than 100 characters");
                    return Screen::TodoForm { form, editing };
                }
                let description = Some(form.value("Description").to_string());
                let status = parse_status(form.value("Status")).unwrap_or_default();
                let priority = parse_priority(form.value("Priority")).unwrap_or_default();
                let session = self.sessions.current();

                let (result, done) = match &editing {
                    Some(id) => {
                        let patch = TodoPatch { title: Some(title), description, status: Some(status), priority: Some(priority), due_date: Some(due_date) };
                        (self.todos.update_todo(session, id, patch).await, "Todo updated successfully!")
                    }
                    None => {
                        let input = NewTodo { title, description, status: Some(status), priority, due_date };
                        (self.todos.add_todo(session, input).await, "Todo created successfully!")
                    }
                };
                match result {
                    Ok(()) => {
                        self.notify(done);
                        self.clamp_selection();
                        Screen::Dashboard
                    }
                    Err(e) => {
                        form.fail(e.message);
                        Screen::TodoForm { form, editing }
                    }
                }
            }
        }
    }

    async fn on_filters(&mut self, mut form: Form, key: KeyEvent) -> Screen {
        match form.input(key) {
            FormAction::Cancel => Screen::Dashboard,
            FormAction::Edited => Screen::Filters(form),
            FormAction::Submit => {
                let date = |label: &str| {
                    let raw = form.trimmed(label);
                    if raw.is_empty() { Ok(None) } else { parse_calendar_date(&raw).map(Some) }
                };
                let (date_from, date_to) = match (date("From (YYYY-MM-DD)"), date("To (YYYY-MM-DD)")) {
                    (Ok(from), Ok(to)) => (from, to),
                    (Err(e), _) | (_, Err(e)) => {
                        form.fail(e.to_string());
                        return Screen::Filters(form);
                    }
                };
                let filters = TodoFilters {
                    status: parse_status(form.value("Status")),
                    priority: parse_priority(form.value("Priority")),
                    date_from,
                    date_to,
                };
                let key = match form.value("Sort by") {
                    "Priority" => SortKey::Priority,
                    "Created" => SortKey::CreatedAt,
                    _ => SortKey::DueDate,
                };
                let order = if form.value("Order") == DESCENDING { SortOrder::Desc } else { SortOrder::Asc };

                if let Err(e) = self.todos.set_view(self.sessions.current(), filters, key, order).await { self.alert(e.message); }
                self.clamp_selection();
                Screen::Dashboard
            }
        }
    }

    async fn on_profile(&mut self, mut form: Form, key: KeyEvent) -> Screen {
        match form.input(key) {
            FormAction::Cancel => Screen::Dashboard,
            FormAction::Edited => Screen::Profile(form),
            FormAction::Submit => {
                let profile = ProfileForm {
                    full_name: form.trimmed("Full name"),
                    email: form.trimmed("Email"),
                    old_password: form.value("Current password").to_string(),
                    new_password: form.value("New password").to_string(),
                    confirm_password: form.value("Confirm new password").to_string(),
                };
                let update = match profile.validate() {
                    Ok(update) => update,
                    Err(message) => {
                        form.fail(message);
                        return Screen::Profile(form);
                    }
                };
                match self.sessions.update_user(&update).await {
                    Ok(()) => {
                        self.notify("Profile updated successfully!");
                        Screen::Dashboard
                    }
                    Err(e) => {
                        form.fail(e.message);
                        Screen::Profile(form)
                    }
                }
            }
        }
    }

    async fn on_confirm_delete(&mut self, id: TodoId, title: String, key: KeyEvent) -> Screen {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                match self.todos.delete_todo(self.sessions.current(), &id).await {
                    Ok(()) => self.notify("Todo deleted successfully!"),
                    Err(e) => self.alert(e.message),
                }
                self.clamp_selection();
                Screen::Dashboard
            }
            KeyCode::Char('n') | KeyCode::Esc => Screen::Dashboard,
            _ => Screen::ConfirmDelete { id, title },
        }
    }
}

fn parse_status(value: &str) -> Option<TodoStatus> { TodoStatus::ALL.into_iter().find(|s| s.as_str() == value) }

fn parse_priority(value: &str) -> Option<TodoPriority> { TodoPriority::ALL.into_iter().find(|p| p.as_str() == value) }

pub fn login_form() -> Form { Form::new("Sign in", vec![Field::text("Email"), Field::secret("Password")]) }

pub fn register_form() -> Form {
    Form::new(
        "Create account",
        vec![
            Field::text("Full name"),
            Field::text("User name"),
            Field::text("Email"),
            Field::secret("Password"),
            Field::secret("Confirm password"),
        ],
    )
}

pub fn todo_form(todo: Option<&Todo>) -> Form {
    let statuses = TodoStatus::ALL.iter().map(|s| s.as_str()).collect();
    let priorities = TodoPriority::ALL.iter().map(|p| p.as_str()).collect();
    let mut fields = vec![
        Field::limited("Title", TITLE_MAX_LEN),
        Field::text("Description"),
        Field::choice("Status", statuses, TodoStatus::Pending.as_str()),
        Field::choice("Priority", priorities, TodoPriority::Medium.as_str()),
        Field::text("Due date (YYYY-MM-DD)"),
    ];
    let title = match todo {
        Some(todo) => {
            fields[0].value = todo.title.clone();
            fields[1].value = todo.description.clone().unwrap_or_default();
            fields[2].value = todo.status.as_str().to_string();
            fields[3].value = todo.priority.as_str().to_string();
            fields[4].value = todo.due_date.format("%Y-%m-%d").to_string();
            "Edit todo"
        }
        None => "New todo",
    };
    Form::new(title, fields)
}

pub fn filters_form(filters: &TodoFilters, (key, order): (SortKey, SortOrder)) -> Form {
    let date = |d: Option<chrono::DateTime<chrono::Utc>>| d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
    let mut statuses = vec![ALL];
    statuses.extend(TodoStatus::ALL.iter().map(|s| s.as_str()));
    let mut priorities = vec![ALL];
    priorities.extend(TodoPriority::ALL.iter().map(|p| p.as_str()));

    Form::new(
        "Filters & Sort",
        vec![
            Field::choice("Status", statuses, filters.status.map_or(ALL, |s| s.as_str())),
            Field::choice("Priority", priorities, filters.priority.map_or(ALL, |p| p.as_str())),
            Field::text("From (YYYY-MM-DD)").with_value(date(filters.date_from)),
            Field::text("To (YYYY-MM-DD)").with_value(date(filters.date_to)),
            Field::choice("Sort by", vec!["Due date", "Priority", "Created"], key.label()),
            Field::choice("Order", vec![ASCENDING, DESCENDING], if order == SortOrder::Desc { DESCENDING } else { ASCENDING }),
        ],
    )
}

pub fn profile_form(full_name: &str, email: &str) -> Form {
    Form::new(
        "Profile",
        vec![
            Field::text("Full name").with_value(full_name),
            Field::text("Email").with_value(email),
            Field::secret("Current password"),
            Field::secret("New password"),
            Field::secret("Confirm new password"),
        ],
    )
}
