// Core data structures for the medibook booking service

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

use crate::error::{Error, Result};

/// A bookable time slot embedded in a doctor's schedule.
///
/// Slot ids are opaque strings, unique within the owning doctor.
/// `is_available` is flipped by the booking coordinator (reserve) and the
/// status transition handler (release); slots are never removed on their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: String,
    /// Calendar date, YYYY-MM-DD
    pub date: String,
    /// Wall-clock time, HH:MM
    pub time: String,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_true() -> bool {
    true
}

impl TimeSlot {
    pub fn new(id: impl Into<String>, date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date: date.into(),
            time: time.into(),
            is_available: true,
        }
    }
}

/// Coarse doctor availability, independent of per-slot flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DoctorAvailability {
    #[default]
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "busy")]
    Busy,
    #[serde(rename = "on-leave")]
    OnLeave,
}

impl DoctorAvailability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Busy => "busy",
            Self::OnLeave => "on-leave",
        }
    }
}

impl std::fmt::Display for DoctorAvailability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Doctor profile with embedded time slots
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
    #[serde(default = "Doctor::default_image")]
    pub image: String,
    #[serde(default)]
    pub availability: DoctorAvailability,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub experience: u32,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    /// Create a new doctor with current timestamps
    pub fn new(name: impl Into<String>, specialization: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            specialization: specialization.into(),
            image: Self::default_image(),
            availability: DoctorAvailability::Available,
            rating: 0.0,
            experience: 0,
            education: None,
            about: None,
            time_slots: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn default_image() -> String {
        "https://placehold.co/150x150/cccccc/ffffff?text=Doctor".to_string()
    }

    /// Find a time slot by id
    pub fn find_slot(&self, slot_id: &str) -> Option<&TimeSlot> {
        self.time_slots.iter().find(|s| s.id == slot_id)
    }

    /// Find a time slot by id, mutable
    pub fn find_slot_mut(&mut self, slot_id: &str) -> Option<&mut TimeSlot> {
        self.time_slots.iter_mut().find(|s| s.id == slot_id)
    }

    /// All slots currently open for booking
    pub fn available_slots(&self) -> Vec<TimeSlot> {
        self.time_slots
            .iter()
            .filter(|s| s.is_available)
            .cloned()
            .collect()
    }
}

/// Appointment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Parse from the wire representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Statuses that hold a slot. Cancelled appointments do not.
    pub fn holds_slot(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Appointment record, created only through the booking coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub appointment_date_time: DateTime<Utc>,
    /// Lookup key into the doctor's timeSlots, not an ownership relation
    pub time_slot_id: String,
    #[serde(default)]
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User role for authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Doctor,
    #[default]
    Patient,
}

impl UserRole {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "doctor" => Some(Self::Doctor),
            "patient" => Some(Self::Patient),
            _ => None,
        }
    }
}

/// Registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Bcrypt hash, never sent over the wire
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(default)]
    pub role: UserRole,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Combine a YYYY-MM-DD date and HH:MM time into a single UTC timestamp
pub fn combine_date_time(date: &str, time: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| Error::validation(format!("Invalid appointment date: {date}")))?;
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| Error::validation(format!("Invalid appointment time: {time}")))?;
    Ok(NaiveDateTime::new(date, time).and_utc())
}

/// Validate an email against the `local@domain.tld` shape
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_RE.get_or_init(|| {
        Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("valid email regex")
    });
    re.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_roundtrip() {
        for s in ["pending", "confirmed", "cancelled", "completed"] {
            let status = AppointmentStatus::parse(s).unwrap();
            assert_eq!(status.as_str(), s);
        }
        assert_eq!(AppointmentStatus::parse("rescheduled"), None);
    }

    #[test]
    fn test_status_holds_slot() {
        assert!(AppointmentStatus::Confirmed.holds_slot());
        assert!(AppointmentStatus::Pending.holds_slot());
        assert!(AppointmentStatus::Completed.holds_slot());
        assert!(!AppointmentStatus::Cancelled.holds_slot());
    }

    #[test]
    fn test_combine_date_time() {
        let dt = combine_date_time("2025-01-10", "09:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-01-10T09:00:00+00:00");
    }

    #[test]
    fn test_combine_date_time_rejects_garbage() {
        assert!(combine_date_time("10/01/2025", "09:00").is_err());
        assert!(combine_date_time("2025-01-10", "9 o'clock").is_err());
    }

    #[test]
    fn test_doctor_slot_lookup() {
        let mut doctor = Doctor::new("Dr. Maria Santos", "Gastroenterology");
        doctor.time_slots.push(TimeSlot::new("s1", "2025-01-10", "09:00"));
        doctor.time_slots.push(TimeSlot::new("s2", "2025-01-10", "10:00"));

        assert!(doctor.find_slot("s1").is_some());
        assert!(doctor.find_slot("s3").is_none());
        assert_eq!(doctor.available_slots().len(), 2);

        doctor.find_slot_mut("s1").unwrap().is_available = false;
        assert_eq!(doctor.available_slots().len(), 1);
        assert_eq!(doctor.available_slots()[0].id, "s2");
    }

    #[test]
    fn test_doctor_availability_wire_format() {
        let json = serde_json::to_string(&DoctorAvailability::OnLeave).unwrap();
        assert_eq!(json, "\"on-leave\"");

        let parsed: DoctorAvailability = serde_json::from_str("\"busy\"").unwrap();
        assert_eq!(parsed, DoctorAvailability::Busy);
    }

    #[test]
    fn test_timeslot_defaults_available() {
        let slot: TimeSlot =
            serde_json::from_str(r#"{"id":"s1","date":"2025-01-10","time":"09:00"}"#).unwrap();
        assert!(slot.is_available);
    }

    #[test]
    fn test_appointment_serializes_camel_case() {
        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            patient_name: "A".to_string(),
            patient_email: "a@example.com".to_string(),
            patient_phone: "555-0100".to_string(),
            appointment_date_time: Utc::now(),
            time_slot_id: "s1".to_string(),
            status: AppointmentStatus::Confirmed,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&appointment).unwrap();
        assert!(value.get("appointmentDateTime").is_some());
        assert!(value.get("timeSlotId").is_some());
        assert_eq!(value["status"], "confirmed");
    }

    #[test]
    fn test_user_never_serializes_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Pat".to_string(),
            email: "pat@example.com".to_string(),
            password_hash: "$2b$10$secret".to_string(),
            role: UserRole::Patient,
            phone: "555-0101".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("password_hash").is_none());
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("maria.santos@clinic.org"));
        assert!(is_valid_email("a_b@mail.co"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("@example.com"));
    }
}
