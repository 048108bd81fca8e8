use serde::{Deserialize, Serialize};

/// Driver summary inside an upcoming reservation. The reservations
/// endpoints use numeric ids, unlike the trip endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationDriver {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Trip summary embedded in `GET /reservations/my-upcoming` rows.
/// `departure_time` is kept verbatim, as on [`crate::models::Trip`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationTrip {
    pub id: i64,
    pub origin: String,
    pub destination: String,
    pub departure_time: String,
    pub driver: Option<ReservationDriver>,
}

/// A seat reservation on a trip.
///
/// The same record shape serves two listings: per-trip rows (as seen by
/// the driver, `trip` absent) and the caller's upcoming rides (`trip`
/// and `role` present). `status` is "pending", "accepted" or "rejected".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub status: String,
    pub role: Option<String>,
    pub trip: Option<ReservationTrip>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upcoming_reservation() {
        let json = r#"{
            "id": 91,
            "status": "accepted",
            "role": "passenger",
            "trip": {
                "id": 15,
                "origin": "Madrid",
                "destination": "Valencia",
                "departure_time": "2026-09-01T08:30:00Z",
                "driver": {"id": 3, "name": "Luis Perez", "email": "luis@example.com"}
            }
        }"#;

        let reservation: Reservation =
            serde_json::from_str(json).expect("Failed to parse reservation JSON");
        assert_eq!(reservation.id, 91);
        assert_eq!(reservation.status, "accepted");
        assert_eq!(reservation.role.as_deref(), Some("passenger"));
        let trip = reservation.trip.expect("Expected embedded trip");
        assert_eq!(trip.origin, "Madrid");
        assert_eq!(trip.departure_time, "2026-09-01T08:30:00Z");
        assert_eq!(trip.driver.map(|d| d.id), Some(3));
    }

    #[test]
    fn test_parse_per_trip_reservation_row() {
        let json = r#"{"id": 12, "status": "pending"}"#;
        let reservation: Reservation =
            serde_json::from_str(json).expect("Failed to parse reservation JSON");
        assert_eq!(reservation.status, "pending");
        assert!(reservation.role.is_none());
        assert!(reservation.trip.is_none());
    }
}
