pub mod error_text;
pub mod types;

pub use error_text::{ErrorContext, normalize_error};
pub use types::{AuthResponse, ChatMessage, Credentials, Member, NewMessage, ProfileUpdate};
