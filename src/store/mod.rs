//! Transactional in-process document store
//!
//! Holds the three document collections (doctors, appointments, users) behind
//! a single `tokio::sync::RwLock`. Plain reads and writes take the lock
//! briefly; [`DataStore::transaction`] stages mutations on a copy of the
//! collections while holding the write lock and commits them as one unit, so
//! a transaction either applies completely or not at all. Because the write
//! lock is held for the whole closure, transactions are serializable: the
//! booking coordinator's read-then-write of a slot's availability flag cannot
//! interleave with a concurrent booking.

pub mod query;

pub use query::{FieldFilter, FilterOp, ListPage, ListParams, PageRef, Pagination};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Appointment, Doctor, TimeSlot, User};

// ============================================================================
// Store Errors
// ============================================================================

/// Errors surfaced by the document store
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// No document with the given id
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A unique key (e.g. user email) is already taken
    #[error("{entity} already exists: {key}")]
    DuplicateKey { entity: &'static str, key: String },

    /// A transaction was aborted before commit
    #[error("transaction aborted: {0}")]
    TransactionAborted(String),
}

// ============================================================================
// Documents
// ============================================================================

/// The raw document collections, visible to transaction closures
#[derive(Debug, Clone, Default)]
pub struct Documents {
    pub doctors: HashMap<Uuid, Doctor>,
    pub appointments: HashMap<Uuid, Appointment>,
    pub users: HashMap<Uuid, User>,
}

// ============================================================================
// Data Store
// ============================================================================

/// Shared handle to the document store
#[derive(Clone, Default)]
pub struct DataStore {
    inner: Arc<RwLock<Documents>>,
}

impl DataStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a closure against a staged copy of the collections.
    ///
    /// The write lock is held for the whole call. On `Ok` the staged copy
    /// replaces the live collections; on `Err` it is dropped and the store is
    /// unchanged. The closure must not await.
    pub async fn transaction<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Documents) -> std::result::Result<T, E>,
    {
        let mut guard = self.inner.write().await;
        let mut staged = guard.clone();
        let out = f(&mut staged)?;
        *guard = staged;
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Doctors
    // ------------------------------------------------------------------

    /// Insert or replace a doctor
    pub async fn put_doctor(&self, doctor: Doctor) {
        self.inner.write().await.doctors.insert(doctor.id, doctor);
    }

    /// Fetch a doctor by id
    pub async fn get_doctor(&self, id: Uuid) -> Option<Doctor> {
        self.inner.read().await.doctors.get(&id).cloned()
    }

    /// Remove a doctor, returning the removed document
    pub async fn remove_doctor(&self, id: Uuid) -> Option<Doctor> {
        self.inner.write().await.doctors.remove(&id)
    }

    /// All doctors, unordered
    pub async fn list_doctors(&self) -> Vec<Doctor> {
        self.inner.read().await.doctors.values().cloned().collect()
    }

    // ------------------------------------------------------------------
    // Appointments
    // ------------------------------------------------------------------

    /// Insert or replace an appointment
    pub async fn put_appointment(&self, appointment: Appointment) {
        self.inner
            .write()
            .await
            .appointments
            .insert(appointment.id, appointment);
    }

    /// Fetch an appointment by id
    pub async fn get_appointment(&self, id: Uuid) -> Option<Appointment> {
        self.inner.read().await.appointments.get(&id).cloned()
    }

    /// Remove an appointment, returning the removed document
    pub async fn remove_appointment(&self, id: Uuid) -> Option<Appointment> {
        self.inner.write().await.appointments.remove(&id)
    }

    /// All appointments, unordered
    pub async fn list_appointments(&self) -> Vec<Appointment> {
        self.inner
            .read()
            .await
            .appointments
            .values()
            .cloned()
            .collect()
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Insert a user; email must be unique
    pub async fn insert_user(&self, user: User) -> std::result::Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        if guard
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::DuplicateKey {
                entity: "user",
                key: user.email,
            });
        }
        guard.users.insert(user.id, user);
        Ok(())
    }

    /// Fetch a user by id
    pub async fn get_user(&self, id: Uuid) -> Option<User> {
        self.inner.read().await.users.get(&id).cloned()
    }

    /// Fetch a user by email (case-insensitive)
    pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }
}

// ============================================================================
// Seeding
// ============================================================================

/// Doctor document as it appears in a seed file; ids and timestamps are
/// assigned on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSeed {
    pub name: String,
    pub specialization: String,
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
}

impl DoctorSeed {
    /// Materialize as a full doctor document
    pub fn into_doctor(self) -> Doctor {
        let mut doctor = Doctor::new(self.name, self.specialization);
        doctor.time_slots = self.time_slots;
        doctor.education = self.education;
        doctor.about = self.about;
        doctor
    }
}

impl DataStore {
    /// Load doctors from a JSON seed document (an array of [`DoctorSeed`])
    pub async fn seed_doctors(&self, json: &str) -> crate::error::Result<usize> {
        let seeds: Vec<DoctorSeed> = serde_json::from_str(json)?;
        let count = seeds.len();
        for seed in seeds {
            self.put_doctor(seed.into_doctor()).await;
        }
        Ok(count)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeSlot;

    fn test_doctor() -> Doctor {
        let mut doctor = Doctor::new("Dr. Kim", "Cardiology");
        doctor.time_slots.push(TimeSlot::new("s1", "2025-01-10", "09:00"));
        doctor
    }

    #[tokio::test]
    async fn test_doctor_roundtrip() {
        let store = DataStore::new();
        let doctor = test_doctor();
        let id = doctor.id;

        store.put_doctor(doctor).await;
        assert!(store.get_doctor(id).await.is_some());

        let removed = store.remove_doctor(id).await;
        assert!(removed.is_some());
        assert!(store.get_doctor(id).await.is_none());
    }

    #[tokio::test]
    async fn test_transaction_commits_on_ok() {
        let store = DataStore::new();
        let doctor = test_doctor();
        let id = doctor.id;
        store.put_doctor(doctor).await;

        store
            .transaction::<_, StoreError, _>(|docs| {
                let doctor = docs.doctors.get_mut(&id).unwrap();
                doctor.time_slots[0].is_available = false;
                Ok(())
            })
            .await
            .unwrap();

        let doctor = store.get_doctor(id).await.unwrap();
        assert!(!doctor.time_slots[0].is_available);
    }

    #[tokio::test]
    async fn test_transaction_rolls_back_on_err() {
        let store = DataStore::new();
        let doctor = test_doctor();
        let id = doctor.id;
        store.put_doctor(doctor).await;

        let result = store
            .transaction::<(), StoreError, _>(|docs| {
                // Mutate, then fail: the mutation must not survive
                let doctor = docs.doctors.get_mut(&id).unwrap();
                doctor.time_slots[0].is_available = false;
                Err(StoreError::TransactionAborted("forced".to_string()))
            })
            .await;

        assert!(result.is_err());
        let doctor = store.get_doctor(id).await.unwrap();
        assert!(doctor.time_slots[0].is_available);
    }

    #[tokio::test]
    async fn test_user_email_uniqueness() {
        let store = DataStore::new();
        let now = chrono::Utc::now();
        let make_user = |email: &str| User {
            id: Uuid::new_v4(),
            name: "Pat".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Default::default(),
            phone: "555-0100".to_string(),
            created_at: now,
            updated_at: now,
        };

        store.insert_user(make_user("pat@example.com")).await.unwrap();

        let dup = store.insert_user(make_user("PAT@example.com")).await;
        assert!(matches!(dup, Err(StoreError::DuplicateKey { .. })));

        let found = store.find_user_by_email("Pat@Example.Com").await;
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_seed_doctors() {
        let store = DataStore::new();
        let json = r#"[
            {
                "name": "Dr. Maria Santos",
                "specialization": "Gastroenterology",
                "timeSlots": [
                    {"id": "s1", "date": "2025-01-10", "time": "09:00"},
                    {"id": "s2", "date": "2025-01-10", "time": "10:00"}
                ]
            }
        ]"#;

        let count = store.seed_doctors(json).await.unwrap();
        assert_eq!(count, 1);

        let doctors = store.list_doctors().await;
        assert_eq!(doctors.len(), 1);
        assert_eq!(doctors[0].time_slots.len(), 2);
        assert!(doctors[0].time_slots.iter().all(|s| s.is_available));
    }
}
