use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Profile of a chat participant as the backend reports it.
///
/// Fields the client does not model are kept in `extra` so that a profile
/// written to local storage reads back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Member {
    pub fn named(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            id: None,
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }
}

/// A message on the shared channel. Server-assigned and immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub author: Option<Member>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .map(|author| author.username.as_str())
            .unwrap_or_default()
    }
}

/// Server timestamps come with or without an offset depending on how the
/// backend is configured. Offset-less values are read as UTC; anything that
/// is not a recognizable timestamp becomes `None` instead of failing the
/// whole payload.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(parse_timestamp))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    // naive ISO, `T` or space separated
    let naive = raw
        .parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"));
    match naive {
        Ok(naive) => Some(naive.and_utc()),
        Err(err) => {
            log::debug!("Ignoring unparsable timestamp {raw:?}: {err}");
            None
        }
    }
}

/// Result of a login or registration call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub member: Option<Member>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMessage {
    pub text: String,
}

/// Partial profile edit; absent fields are left out of the request body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn member_keeps_unknown_fields() {
        let raw = json!({
            "id": 7,
            "username": "alice",
            "created_at": "2024-03-01T10:00:00Z",
            "updated_at": "2024-03-02T10:00:00.123456Z",
            "avatar": "cat.png"
        });

        let member: Member = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(member.username, "alice");
        assert_eq!(member.id, Some(7));
        assert_eq!(member.extra.get("avatar"), Some(&json!("cat.png")));

        let back = serde_json::to_value(&member).unwrap();
        assert_eq!(back["avatar"], json!("cat.png"));
        assert_eq!(back["id"], json!(7));
    }

    #[test]
    fn naive_timestamps_are_read_as_utc() {
        let member: Member = serde_json::from_value(json!({
            "username": "alice",
            "created_at": "2024-01-01T10:00:00.123456",
            "updated_at": "2024-01-02 08:30:00"
        }))
        .unwrap();

        let created = member.created_at.unwrap();
        assert_eq!(created.to_rfc3339(), "2024-01-01T10:00:00.123456+00:00");
        assert_eq!(
            member.updated_at.unwrap().format("%Y-%m-%d %H:%M").to_string(),
            "2024-01-02 08:30"
        );
    }

    #[test]
    fn unreadable_timestamps_do_not_fail_the_payload() {
        let message: ChatMessage = serde_json::from_value(json!({
            "id": 3,
            "text": "hi",
            "created_at": "yesterday"
        }))
        .unwrap();
        assert_eq!(message.created_at, None);

        let member: Member =
            serde_json::from_value(json!({"username": "bob", "created_at": 1704103200}))
                .unwrap();
        assert_eq!(member.created_at, None);
        assert!(member.extra.is_empty());
    }

    #[test]
    fn stored_member_with_naive_timestamp_reads_back() {
        let member: Member = serde_json::from_value(json!({
            "username": "alice",
            "created_at": "2024-01-01T10:00:00"
        }))
        .unwrap();

        let raw = serde_json::to_string(&member).unwrap();
        let back: Member = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, member);
    }

    #[test]
    fn message_without_author_has_empty_author_name() {
        let message: ChatMessage =
            serde_json::from_value(json!({"id": 1, "text": "hi"})).unwrap();
        assert_eq!(message.author_name(), "");
        assert!(message.created_at.is_none());
    }

    #[test]
    fn auth_response_fields_are_optional() {
        let response: AuthResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response, AuthResponse::default());
    }

    #[test]
    fn profile_update_omits_missing_username() {
        let body = serde_json::to_value(ProfileUpdate::default()).unwrap();
        assert_eq!(body, json!({}));

        let body = serde_json::to_value(ProfileUpdate {
            username: Some("bob".to_string()),
        })
        .unwrap();
        assert_eq!(body, json!({"username": "bob"}));
    }
}
