pub mod session_service;
pub mod todo_service;

#[cfg(test)]
pub(crate) mod fakes;
