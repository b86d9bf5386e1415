//! Turns backend failures into the single line of text a view shows.
//!
//! Precedence is fixed for every caller: a missing failure gives the generic
//! text, then the body's `detail`, then the first message of the first entry
//! in `fields` (document order), then the caller's fallback.

use serde_json::Value;

use crate::network::ApiError;

pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred.";

/// Call site of a failed operation; selects the fallback text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorContext {
    Login,
    Register,
    Chat,
    Profile,
}

impl ErrorContext {
    pub fn fallback(self) -> &'static str {
        match self {
            Self::Login => "Could not sign in. Please try again.",
            Self::Register => "Could not create the account. Please try again.",
            Self::Chat => "Could not complete the operation. Please try again.",
            Self::Profile => "Could not update the profile. Please try again.",
        }
    }
}

pub fn normalize_error(failure: Option<&ApiError>, context: ErrorContext) -> String {
    let Some(failure) = failure else {
        return UNEXPECTED_ERROR.to_string();
    };

    failure
        .response_body()
        .and_then(message_from_body)
        .unwrap_or_else(|| context.fallback().to_string())
}

/// Extract a displayable message from a backend error body.
pub fn message_from_body(body: &Value) -> Option<String> {
    if let Some(detail) = body
        .get("detail")
        .and_then(Value::as_str)
        .filter(|detail| !detail.is_empty())
    {
        return Some(detail.to_string());
    }

    // Only the first field is consulted; an empty list there means no message.
    let fields = body.get("fields")?.as_object()?;
    let (_, messages) = fields.iter().next()?;
    messages
        .as_array()?
        .first()?
        .as_str()
        .map(str::to_string)
}
