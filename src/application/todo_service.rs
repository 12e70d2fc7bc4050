use crate::domain::api::TodoApi;
use crate::domain::query::{self, SortKey, SortOrder, TodoFilters, TodoQuery};
use crate::domain::session::Session;
use crate::domain::todo::{parse_due_date, CreateTodo, NewTodo, Todo, TodoCounts, TodoId, TodoPatch, TodoStatus, UpdateTodo};
use crate::error::{ActionError, ActionResult, ApiError};

/// The current user's todos as last fetched, plus the filter/sort state that
/// shapes both the fetch and the derived view.
///
/// Writes never touch `todos` directly: each successful mutation is followed
/// by a full [`refresh`](Self::refresh).
pub struct TodoCollection<A: TodoApi> {
    api: A,
    todos: Vec<Todo>,
    counts: Option<TodoCounts>,
    filters: TodoFilters,
    sort_key: SortKey,
    sort_order: SortOrder,
    load_error: Option<String>,
}

impl<A: TodoApi> TodoCollection<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            todos: Vec::new(),
            counts: None,
            filters: TodoFilters::default(),
            sort_key: SortKey::default(),
            sort_order: SortOrder::default(),
            load_error: None,
        }
    }

    pub fn todos(&self) -> &[Todo] { &self.todos }
    pub fn counts(&self) -> Option<TodoCounts> { self.counts }
    pub fn filters(&self) -> &TodoFilters { &self.filters }
    pub fn sort(&self) -> (SortKey, SortOrder) { (self.sort_key, self.sort_order) }

    /// Message from the last failed [`refresh`](Self::refresh), cleared by the
    /// next successful one.
    pub fn load_error(&self) -> Option<&str> { self.load_error.as_deref() }

    pub fn query(&self) -> TodoQuery { TodoQuery::new(&self.filters, self.sort_key, self.sort_order) }

    /// Re-reads list and counts for `session`; with no session the cache is
    /// emptied. The list is replaced even if the counts call then fails.
    pub async fn refresh(&mut self, session: Option<&Session>) -> ActionResult {
        let Some(session) = session else {
            self.todos.clear();
            self.counts = None;
            self.load_error = None;
            return Ok(());
        };

        let query = self.query();
        match self.load(&query, &session.token).await {
            Ok(()) => {
                tracing::debug!(count = self.todos.len(), sort = query.sort.as_str(), "todos refreshed");
                self.load_error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "todo refresh failed");
                let err = ActionError::from_api(&e, "Failed to load todos");
                self.load_error = Some(err.message.clone());
                Err(err)
            }
        }
    }

    async fn load(&mut self, query: &TodoQuery, token: &str) -> Result<(), ApiError> {
        self.todos = self.api.list(query, token).await?;
        self.counts = Some(self.api.counts(token).await?);
        Ok(())
    }

    /// Latest server copy of one todo, or `None` on any failure.
    pub async fn get_todo_by_id(&self, session: Option<&Session>, id: &TodoId) -> Option<Todo> {
        let session = session?;
        match self.api.get(id, &session.token).await {
            Ok(todo) => Some(todo),
            Err(e) => {
                tracing::debug!(%id, error = %e, "todo lookup failed");
                None
            }
        }
    }

    /// Creates a todo. The backend always starts todos as `Pending`, so any
    /// other requested status is applied with a second call.
    pub async fn add_todo(&mut self, session: Option<&Session>, input: NewTodo) -> ActionResult {
        let session = session.ok_or_else(ActionError::not_authenticated)?;
        if input.title.trim().is_empty() || input.due_date.trim().is_empty() {
            return Err(ActionError::new("Please fill in all required fields"));
        }
        let due_date = parse_due_date(&input.due_date).map_err(|e| ActionError::new(e.to_string()))?;

        let fallback = "Failed to create todo";
        let body = CreateTodo { title: input.title, description: input.description, priority: input.priority, due_date };
        let created = self.api.create(&body, &session.token).await.map_err(|e| ActionError::from_api(&e, fallback))?;
        tracing::info!(id = %created.id, "todo created");

        if let Some(status) = input.status.filter(|s| *s != TodoStatus::Pending) {
            let patch = UpdateTodo { status: Some(status), ..UpdateTodo::default() };
            let applied = self.api.update(&created.id, &patch, &session.token).await.map_err(|e| ActionError::from_api(&e, fallback))?;
            if !applied {
                tracing::warn!(id = %created.id, status = status.as_str(), "initial status was not applied");
            }
        }

        self.refresh(Some(session)).await.ok();
        Ok(())
    }

    /// Sends only the fields set in `patch`; due dates go out as full
    /// timestamps.
    pub async fn update_todo(&mut self, session: Option<&Session>, id: &TodoId, patch: TodoPatch) -> ActionResult {
        let session = session.ok_or_else(ActionError::not_authenticated)?;
        let due_date = patch
            .due_date
            .as_deref()
            .map(parse_due_date)
            .transpose()
            .map_err(|e| ActionError::new(e.to_string()))?;
        let body = UpdateTodo {
            title: patch.title,
            description: patch.description,
            status: patch.status,
            priority: patch.priority,
            due_date,
        };

        let ok = self.api.update(id, &body, &session.token).await.map_err(|e| ActionError::from_api(&e, "Failed to update todo"))?;
        if !ok {
            return Err(ActionError::new("Update failed"));
        }
        self.refresh(Some(session)).await.ok();
        Ok(())
    }

    pub async fn delete_todo(&mut self, session: Option<&Session>, id: &TodoId) -> ActionResult {
        let session = session.ok_or_else(ActionError::not_authenticated)?;
        let ok = self.api.delete(id, &session.token).await.map_err(|e| ActionError::from_api(&e, "Failed to delete todo"))?;
        if !ok {
            return Err(ActionError::new("Delete failed"));
        }
        tracing::info!(%id, "todo deleted");
        self.refresh(Some(session)).await.ok();
        Ok(())
    }

    pub async fn mark_as_completed(&mut self, session: Option<&Session>, id: &TodoId) -> ActionResult {
        let session = session.ok_or_else(ActionError::not_authenticated)?;
        let ok = self.api.complete(id, &session.token).await.map_err(|e| ActionError::from_api(&e, "Failed to mark as completed"))?;
        if !ok {
            return Err(ActionError::new("Update failed"));
        }
        self.refresh(Some(session)).await.ok();
        Ok(())
    }

    /// Completed todos go back to `Pending`; anything else gets completed.
    pub async fn toggle_completed(&mut self, session: Option<&Session>, todo: &Todo) -> ActionResult {
        if todo.status == TodoStatus::Completed {
            self.update_todo(session, &todo.id, TodoPatch::status(TodoStatus::Pending)).await
        } else {
            self.mark_as_completed(session, &todo.id).await
        }
    }

    /// Replaces filters and sort together. Status, priority and sort are
    /// applied server-side, so a change to any of them costs one refetch;
    /// date bounds only reshape the local view.
    pub async fn set_view(&mut self, session: Option<&Session>, filters: TodoFilters, key: SortKey, order: SortOrder) -> ActionResult {
        let before = self.query();
        self.filters = filters;
        self.sort_key = key;
        self.sort_order = order;
        if self.query() != before { self.refresh(session).await } else { Ok(()) }
    }

    pub async fn set_filters(&mut self, session: Option<&Session>, filters: TodoFilters) -> ActionResult {
        self.set_view(session, filters, self.sort_key, self.sort_order).await
    }

    pub async fn set_sorting(&mut self, session: Option<&Session>, key: SortKey, order: SortOrder) -> ActionResult {
        let filters = self.filters.clone();
        self.set_view(session, filters, key, order).await
    }

    pub fn filtered_and_sorted(&self) -> Vec<&Todo> {
        query::filter_and_sort(&self.todos, &self.filters, self.sort_key, self.sort_order)
    }

    /// Backend counts when available, otherwise tallied from the cached list.
    pub fn stats(&self) -> TodoCounts {
        self.counts.unwrap_or_else(|| TodoCounts::from_todos(&self.todos))
    }
}
