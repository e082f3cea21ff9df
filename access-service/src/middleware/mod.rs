pub mod access;
pub mod paths;
pub mod session;

pub use access::access_middleware;
pub use paths::{classify_path, PathClass};
pub use session::{session_token, Session};
