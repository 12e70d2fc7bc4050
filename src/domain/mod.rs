pub mod api;
pub mod query;
pub mod session;
pub mod store;
pub mod todo;
