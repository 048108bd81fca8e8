//! Response envelope normalization.
//!
//! The backend wraps payloads inconsistently: some routes return
//! `{success, message, data: {...}}`, others put fields at the top
//! level, and list routes alternate between a bare array and
//! `{data: [...]}`. Everything is normalized here before the rest of
//! the client sees it.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::models::User;

use super::ApiError;

/// Credential locations probed in order; the first non-null hit wins
const TOKEN_PATHS: &[&[&str]] = &[
    &["data", "token"],
    &["token"],
    &["data", "accessToken"],
    &["accessToken"],
];

/// Identity record locations probed in order
const USER_PATHS: &[&[&str]] = &[&["data", "user"], &["user"]];

/// Token and identity record pulled out of a login/register response
#[derive(Debug, Clone)]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}

/// Normalize a 2xx login/register body into an `AuthPayload`.
///
/// Fails with `MalformedAuthResponse` when no probe location yields a
/// token, or the user record is missing or undecodable.
pub(crate) fn normalize_auth_response(body: &Value) -> Result<AuthPayload, ApiError> {
    let token = probe(body, TOKEN_PATHS)
        .and_then(Value::as_str)
        .map(str::to_string);
    let user = probe(body, USER_PATHS)
        .and_then(|value| serde_json::from_value::<User>(value.clone()).ok());

    match (token, user) {
        (Some(token), Some(user)) => Ok(AuthPayload { user, token }),
        _ => Err(ApiError::MalformedAuthResponse),
    }
}

/// Normalize a list body: either a bare array or `{data: [...]}`.
/// Unrecognized shapes are logged and treated as empty.
pub(crate) fn normalize_list<T: DeserializeOwned>(body: Value) -> Result<Vec<T>, ApiError> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                warn!("List response had no recognizable array, treating as empty");
                return Ok(Vec::new());
            }
        },
        _ => {
            warn!("List response was not an array or object, treating as empty");
            return Ok(Vec::new());
        }
    };

    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(|e| ApiError::InvalidResponse(e.to_string())))
        .collect()
}

/// Normalize a single-record body: `{data: {...}}` or the bare record.
/// A null `data` slot falls back to the body itself.
pub(crate) fn normalize_item<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    let payload = match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(value) if !value.is_null() => value,
            _ => Value::Object(map),
        },
        other => other,
    };
    serde_json::from_value(payload).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

/// First non-null value at any of the candidate paths
fn probe<'a>(body: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    paths.iter().find_map(|path| lookup(body, path))
}

/// Walk a key path into nested objects; `None` on any miss or null
fn lookup<'a>(body: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = body;
    for segment in path {
        current = current.get(segment)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatMessage, Trip};
    use serde_json::json;

    fn sample_user() -> Value {
        json!({"id": "2", "name": "Ana Gomez", "email": "ana@example.com"})
    }

    fn sample_trip() -> Value {
        json!({
            "id": "15",
            "origin": "Madrid",
            "destination": "Valencia",
            "departure_time": "2026-09-01T08:30:00Z",
            "price_per_seat": 18.5,
            "total_seats": 4,
            "available_seats": 2,
            "status": "published",
            "driver": {"id": "3", "name": "Luis Perez", "email": "luis@example.com"}
        })
    }

    #[test]
    fn test_auth_nested_envelope() {
        let body = json!({
            "success": true,
            "message": "Login exitoso",
            "data": {"token": "tok_nested", "user": sample_user()}
        });
        let payload = normalize_auth_response(&body).expect("Expected payload");
        assert_eq!(payload.token, "tok_nested");
        assert_eq!(payload.user.id, "2");
    }

    #[test]
    fn test_auth_flat_envelope() {
        let body = json!({"token": "tok_flat", "user": sample_user()});
        let payload = normalize_auth_response(&body).expect("Expected payload");
        assert_eq!(payload.token, "tok_flat");
    }

    #[test]
    fn test_auth_access_token_variants() {
        let nested = json!({"data": {"accessToken": "tok_a", "user": sample_user()}});
        assert_eq!(
            normalize_auth_response(&nested).expect("Expected payload").token,
            "tok_a"
        );

        let flat = json!({"accessToken": "tok_b", "user": sample_user()});
        assert_eq!(
            normalize_auth_response(&flat).expect("Expected payload").token,
            "tok_b"
        );
    }

    #[test]
    fn test_auth_token_and_user_probe_independently() {
        let body = json!({"data": {"token": "tok_mixed"}, "user": sample_user()});
        let payload = normalize_auth_response(&body).expect("Expected payload");
        assert_eq!(payload.token, "tok_mixed");
        assert_eq!(payload.user.name, "Ana Gomez");
    }

    #[test]
    fn test_auth_nested_token_wins_over_flat() {
        let body = json!({
            "token": "tok_outer",
            "data": {"token": "tok_inner", "user": sample_user()}
        });
        let payload = normalize_auth_response(&body).expect("Expected payload");
        assert_eq!(payload.token, "tok_inner");
    }

    #[test]
    fn test_auth_null_slot_falls_through() {
        let body = json!({
            "token": "tok_outer",
            "data": {"token": null, "user": sample_user()}
        });
        let payload = normalize_auth_response(&body).expect("Expected payload");
        assert_eq!(payload.token, "tok_outer");
    }

    #[test]
    fn test_auth_missing_token_is_malformed() {
        let body = json!({"success": true, "data": {"user": sample_user()}});
        let error = normalize_auth_response(&body).expect_err("Expected error");
        assert!(matches!(error, ApiError::MalformedAuthResponse));
    }

    #[test]
    fn test_auth_missing_user_is_malformed() {
        let body = json!({"data": {"token": "tok_x"}});
        let error = normalize_auth_response(&body).expect_err("Expected error");
        assert!(matches!(error, ApiError::MalformedAuthResponse));
    }

    #[test]
    fn test_auth_undecodable_user_is_malformed() {
        // Record present but missing required fields
        let body = json!({"data": {"token": "tok_x", "user": {"id": "2"}}});
        let error = normalize_auth_response(&body).expect_err("Expected error");
        assert!(matches!(error, ApiError::MalformedAuthResponse));
    }

    #[test]
    fn test_auth_non_string_token_is_malformed() {
        let body = json!({"data": {"token": 12345, "user": sample_user()}});
        let error = normalize_auth_response(&body).expect_err("Expected error");
        assert!(matches!(error, ApiError::MalformedAuthResponse));
    }

    #[test]
    fn test_list_bare_array() {
        let body = json!([sample_trip()]);
        let trips: Vec<Trip> = normalize_list(body).expect("Expected trips");
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].origin, "Madrid");
    }

    #[test]
    fn test_list_data_envelope() {
        let body = json!({"success": true, "data": [sample_trip()]});
        let trips: Vec<Trip> = normalize_list(body).expect("Expected trips");
        assert_eq!(trips.len(), 1);
    }

    #[test]
    fn test_list_unrecognized_shape_is_empty() {
        let body = json!({"success": true, "data": {"rows": []}});
        let trips: Vec<Trip> = normalize_list(body).expect("Expected empty list");
        assert!(trips.is_empty());
    }

    #[test]
    fn test_list_bad_record_is_invalid_response() {
        let body = json!([{"id": "15"}]);
        let error = normalize_list::<Trip>(body).expect_err("Expected error");
        assert!(matches!(error, ApiError::InvalidResponse(_)));
    }

    #[test]
    fn test_item_data_envelope() {
        let body = json!({"data": sample_trip()});
        let trip: Trip = normalize_item(body).expect("Expected trip");
        assert_eq!(trip.destination, "Valencia");
    }

    #[test]
    fn test_item_bare_object() {
        let trip: Trip = normalize_item(sample_trip()).expect("Expected trip");
        assert_eq!(trip.id, "15");
    }

    #[test]
    fn test_item_null_data_falls_back_to_body() {
        let body = json!({
            "data": null,
            "id": 204,
            "trip_id": 15,
            "user_sender_id": 3,
            "user_receiver_id": 8,
            "content": "hola"
        });
        let message: ChatMessage = normalize_item(body).expect("Expected message");
        assert_eq!(message.id, 204);
    }
}
