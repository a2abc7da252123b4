mod manager;
mod resolver;

pub use manager::{SessionInfo, SessionManager};
pub use resolver::{Resolution, SessionResolver, SessionTarget};

#[cfg(test)]
pub use resolver::session_name_for_path;
