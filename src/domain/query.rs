use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::todo::{Todo, TodoPriority, TodoStatus};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TodoFilters {
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl TodoFilters {
    pub fn matches(&self, todo: &Todo) -> bool {
        self.status.is_none_or(|s| todo.status == s)
            && self.priority.is_none_or(|p| todo.priority == p)
            && self.date_from.is_none_or(|from| todo.due_utc() >= from)
            && self.date_to.is_none_or(|to| todo.due_utc() <= to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    DueDate,
    Priority,
    CreatedAt,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self { SortKey::DueDate => "Due date", SortKey::Priority => "Priority", SortKey::CreatedAt => "Created" }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flip(self) -> Self {
        match self { SortOrder::Asc => SortOrder::Desc, SortOrder::Desc => SortOrder::Asc }
    }
}

/// Backend `sort` query value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortOption {
    CreatedDateAsc,
    CreatedDateDesc,
    DueDateAsc,
    DueDateDesc,
    PriorityAsc,
    PriorityDesc,
}

impl SortOption {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        match (key, order) {
            (SortKey::CreatedAt, SortOrder::Asc) => SortOption::CreatedDateAsc,
            (SortKey::CreatedAt, SortOrder::Desc) => SortOption::CreatedDateDesc,
            (SortKey::Priority, SortOrder::Asc) => SortOption::PriorityAsc,
            (SortKey::Priority, SortOrder::Desc) => SortOption::PriorityDesc,
            (SortKey::DueDate, SortOrder::Asc) => SortOption::DueDateAsc,
            (SortKey::DueDate, SortOrder::Desc) => SortOption::DueDateDesc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOption::CreatedDateAsc => "CreatedDateAsc",
            SortOption::CreatedDateDesc => "CreatedDateDesc",
            SortOption::DueDateAsc => "DueDateAsc",
            SortOption::DueDateDesc => "DueDateDesc",
            SortOption::PriorityAsc => "PriorityAsc",
            SortOption::PriorityDesc => "PriorityDesc",
        }
    }
}

/// Server-side part of the list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoQuery {
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub sort: SortOption,
}

impl TodoQuery {
    pub fn new(filters: &TodoFilters, key: SortKey, order: SortOrder) -> Self {
        Self { status: filters.status, priority: filters.priority, sort: SortOption::new(key, order) }
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, &'static str)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(status) = self.status { pairs.push(("status", status.as_str())); }
        if let Some(priority) = self.priority { pairs.push(("priority", priority.as_str())); }
        pairs.push(("sort", self.sort.as_str()));
        pairs
    }
}

pub fn compare(a: &Todo, b: &Todo, key: SortKey) -> Ordering {
    match key {
        SortKey::DueDate => a.due_date.cmp(&b.due_date),
        SortKey::Priority => a.priority.cmp(&b.priority),
        SortKey::CreatedAt => a.created_date.cmp(&b.created_date),
    }
}

/// Conjunctive filter followed by a stable sort; ties keep their fetched order.
pub fn filter_and_sort<'a>(todos: &'a [Todo], filters: &TodoFilters, key: SortKey, order: SortOrder) -> Vec<&'a Todo> {
    let mut view: Vec<&Todo> = todos.iter().filter(|t| filters.matches(t)).collect();
    view.sort_by(|a, b| {
        let ord = compare(a, b, key);
        match order { SortOrder::Asc => ord, SortOrder::Desc => ord.reverse() }
    });
    view
}
