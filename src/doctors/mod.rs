//! Doctor directory: profile CRUD and availability lookups
//!
//! Everything here is plain document access; the only booking-adjacent
//! operation is [`DoctorDirectory::availability`], which filters a doctor's
//! slots down to the ones still open.

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Doctor, DoctorAvailability, TimeSlot};
use crate::store::DataStore;

/// Payload for creating a doctor profile
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDoctorRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub experience: Option<u32>,
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
}

/// Partial update for a doctor profile. Time slots are managed by the
/// booking workflow and are intentionally not updatable here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub image: Option<String>,
    pub availability: Option<DoctorAvailability>,
    pub rating: Option<f32>,
    pub experience: Option<u32>,
    pub education: Option<String>,
    pub about: Option<String>,
}

/// Doctor profile service
#[derive(Clone)]
pub struct DoctorDirectory {
    store: DataStore,
}

impl DoctorDirectory {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// List all doctors, optionally filtered by a case-insensitive search
    /// over name and specialization. An empty result is a not-found error,
    /// matching the API contract.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Doctor>> {
        let mut doctors = self.store.list_doctors().await;

        if let Some(needle) = search.map(str::to_lowercase).filter(|s| !s.is_empty()) {
            doctors.retain(|d| {
                d.name.to_lowercase().contains(&needle)
                    || d.specialization.to_lowercase().contains(&needle)
            });
        }

        if doctors.is_empty() {
            return Err(Error::not_found("No doctors found matching your criteria."));
        }

        doctors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(doctors)
    }

    /// Fetch a doctor by id
    pub async fn get(&self, id: Uuid) -> Result<Doctor> {
        self.store
            .get_doctor(id)
            .await
            .ok_or_else(|| Error::not_found(format!("Doctor not found with ID of {id}")))
    }

    /// The doctor's currently-open time slots
    pub async fn availability(&self, id: Uuid) -> Result<Vec<TimeSlot>> {
        Ok(self.get(id).await?.available_slots())
    }

    /// Create a doctor profile
    pub async fn create(&self, request: CreateDoctorRequest) -> Result<Doctor> {
        if request.name.trim().is_empty() {
            return Err(Error::validation("Doctor name is required"));
        }
        if request.specialization.trim().is_empty() {
            return Err(Error::validation("Specialization is required"));
        }

        let mut doctor = Doctor::new(request.name.trim(), request.specialization.trim());
        if let Some(image) = request.image {
            doctor.image = image;
        }
        doctor.education = request.education;
        doctor.about = request.about;
        doctor.experience = request.experience.unwrap_or(0);
        doctor.time_slots = request.time_slots;

        self.store.put_doctor(doctor.clone()).await;
        info!(doctor_id = %doctor.id, name = %doctor.name, "doctor created");
        Ok(doctor)
    }

    /// Apply a partial update to a doctor profile
    pub async fn update(&self, id: Uuid, request: UpdateDoctorRequest) -> Result<Doctor> {
        if let Some(rating) = request.rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(Error::validation("Rating must be between 0 and 5"));
            }
        }

        let mut doctor = self.get(id).await?;
        if let Some(name) = request.name {
            doctor.name = name;
        }
        if let Some(specialization) = request.specialization {
            doctor.specialization = specialization;
        }
        if let Some(image) = request.image {
            doctor.image = image;
        }
        if let Some(availability) = request.availability {
            doctor.availability = availability;
        }
        if let Some(rating) = request.rating {
            doctor.rating = rating;
        }
        if let Some(experience) = request.experience {
            doctor.experience = experience;
        }
        if request.education.is_some() {
            doctor.education = request.education;
        }
        if request.about.is_some() {
            doctor.about = request.about;
        }
        doctor.updated_at = Utc::now();

        self.store.put_doctor(doctor.clone()).await;
        Ok(doctor)
    }

    /// Delete a doctor profile
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.store
            .remove_doctor(id)
            .await
            .ok_or_else(|| Error::not_found(format!("Doctor not found with ID of {id}")))?;
        info!(doctor_id = %id, "doctor deleted");
        Ok(())
    }
}
