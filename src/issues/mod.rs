pub mod description;
pub mod issue_config;
pub mod issue_error;
pub mod issue_tracker;
pub mod reconciler;

#[cfg(test)]
pub mod memory_tracker;
