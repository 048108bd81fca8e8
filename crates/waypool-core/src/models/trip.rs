use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Driver summary embedded in trip responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripDriver {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A published ride offer.
///
/// `status` is a free-form string on the wire. The backend currently emits
/// "published", "draft", "completed" and "cancelled" but adds values
/// without notice, so it is not modeled as an enum.
///
/// `departure_time` is kept verbatim: depending on the route the backend
/// sends RFC 3339 or a plain `YYYY-MM-DD HH:MM:SS` database timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: String,
    pub price_per_seat: f64,
    pub total_seats: u32,
    pub available_seats: u32,
    pub status: String,
    pub driver: TripDriver,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request body for `POST /trips`
#[derive(Debug, Clone, Serialize)]
pub struct CreateTripRequest {
    pub origin: String,
    pub destination: String,
    pub departure_time: String,
    pub price_per_seat: f64,
    pub total_seats: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_seats: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Query parameters for `GET /trips`. Absent fields are omitted from
/// the query string entirely rather than sent empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TripFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
