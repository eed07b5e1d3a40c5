//! Credential store backed by a single JSON file.

mod file;
mod users;

pub use file::{read_users, write_users};
pub use users::UserStore;
