use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One message in a per-trip conversation.
/// Conversations are keyed by (trip, other participant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub trip_id: i64,
    #[serde(rename = "user_sender_id")]
    pub sender_id: i64,
    #[serde(rename = "user_receiver_id")]
    pub receiver_id: i64,
    pub content: String,
    pub read: Option<bool>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request body for `POST /messages`. This endpoint takes camelCase
/// keys even though message records come back snake_case.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    #[serde(rename = "tripId")]
    pub trip_id: i64,
    #[serde(rename = "receiverId")]
    pub receiver_id: i64,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_message() {
        let json = r#"{
            "id": 204,
            "trip_id": 15,
            "user_sender_id": 3,
            "user_receiver_id": 8,
            "content": "Nos vemos en la salida norte",
            "read": false,
            "createdAt": "2026-08-21T19:04:00Z",
            "updatedAt": "2026-08-21T19:04:00Z"
        }"#;

        let message: ChatMessage =
            serde_json::from_str(json).expect("Failed to parse message JSON");
        assert_eq!(message.id, 204);
        assert_eq!(message.sender_id, 3);
        assert_eq!(message.receiver_id, 8);
        assert_eq!(message.read, Some(false));
    }

    #[test]
    fn test_send_message_request_wire_names() {
        let request = SendMessageRequest {
            trip_id: 15,
            receiver_id: 8,
            content: "Salgo en cinco minutos".to_string(),
        };
        let json = serde_json::to_value(&request).expect("Failed to serialize request");
        assert_eq!(json["tripId"], 15);
        assert_eq!(json["receiverId"], 8);
        assert!(json.get("trip_id").is_none());
    }
}
