pub mod authorizer;
pub mod client;
pub mod error;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use authorizer::{RequestAuthorizer, is_protected};
pub use client::ApiClient;
pub use error::ApiError;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, RequestInterceptor, Transport};
