use serde::{Deserialize, Serialize};

/// Account profile as returned by the backend and persisted locally
/// under the `userData` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub rating: Option<f64>,
    #[serde(rename = "tripsCount")]
    pub trips_count: Option<u32>,
}

/// Login request body for `POST /auth/login`.
/// No Debug derive - keeps the password out of log output.
#[derive(Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Registration request body for `POST /auth/register`.
/// The backend validates that `password` and `confirmPassword` match.
#[derive(Clone, Serialize)]
pub struct RegisterCredentials {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
}
