pub mod app;
pub mod auth;
pub mod chat;
pub mod profile;
pub mod router;
pub mod state;

pub use app::{AppError, ClientApp};
pub use auth::{AuthController, AuthMode};
pub use chat::{ChatController, ChatDisplay};
pub use profile::ProfileController;
pub use router::{Route, Router};
pub use state::{LoadState, Notice, RequestState, Submission};
