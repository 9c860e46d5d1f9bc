//! Read-only appointment queries
//!
//! Listing responses carry the referenced doctor's name and specialization
//! alongside the denormalized appointment fields, so clients do not need a
//! second lookup to render a schedule.

use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Appointment, Doctor};
use crate::store::{DataStore, ListPage, ListParams};

/// Default sort for appointment listings: newest first
const DEFAULT_SORT: &str = "-appointmentDateTime";

/// The doctor summary attached to listed appointments
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorRef {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
}

impl From<&Doctor> for DoctorRef {
    fn from(doctor: &Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name.clone(),
            specialization: doctor.specialization.clone(),
        }
    }
}

/// An appointment plus its doctor summary. `doctor` is `None` when the
/// doctor document has since been deleted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub doctor: Option<DoctorRef>,
}

/// Read-side access to the appointment ledger
#[derive(Clone)]
pub struct AppointmentQueries {
    store: DataStore,
}

impl AppointmentQueries {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// Fetch a single appointment with its doctor summary
    pub async fn get_by_id(&self, id: Uuid) -> Result<AppointmentView> {
        let appointment = self
            .store
            .get_appointment(id)
            .await
            .ok_or_else(|| Error::not_found(format!("Appointment not found with ID of {id}")))?;

        let doctor = self
            .store
            .get_doctor(appointment.doctor_id)
            .await
            .map(|d| DoctorRef::from(&d));
        Ok(AppointmentView {
            appointment,
            doctor,
        })
    }

    /// Filtered, sorted, paginated listing (admin view)
    pub async fn list(&self, params: &ListParams) -> ListPage<AppointmentView> {
        let appointments = self.store.list_appointments().await;
        let page = params.apply(&appointments, DEFAULT_SORT);

        let doctors = self.doctor_refs().await;
        ListPage {
            items: attach_doctors(page.items, &doctors),
            total: page.total,
            pagination: page.pagination,
        }
    }

    /// All appointments booked by one patient, newest first
    pub async fn my_history(&self, patient_id: Uuid) -> Vec<AppointmentView> {
        let mut history: Vec<Appointment> = self
            .store
            .list_appointments()
            .await
            .into_iter()
            .filter(|a| a.patient_id == patient_id)
            .collect();
        history.sort_by(|a, b| b.appointment_date_time.cmp(&a.appointment_date_time));

        let doctors = self.doctor_refs().await;
        attach_doctors(history, &doctors)
    }

    async fn doctor_refs(&self) -> HashMap<Uuid, DoctorRef> {
        self.store
            .list_doctors()
            .await
            .iter()
            .map(|d| (d.id, DoctorRef::from(d)))
            .collect()
    }
}

fn attach_doctors(
    appointments: Vec<Appointment>,
    doctors: &HashMap<Uuid, DoctorRef>,
) -> Vec<AppointmentView> {
    appointments
        .into_iter()
        .map(|appointment| AppointmentView {
            doctor: doctors.get(&appointment.doctor_id).cloned(),
            appointment,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppointmentStatus;
    use chrono::{Duration, Utc};
    use std::collections::HashMap;

    fn appointment(
        doctor_id: Uuid,
        patient_id: Uuid,
        days_ahead: i64,
        status: AppointmentStatus,
    ) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            doctor_id,
            patient_id,
            patient_name: "A".to_string(),
            patient_email: "a@example.com".to_string(),
            patient_phone: "555-0100".to_string(),
            appointment_date_time: now + Duration::days(days_ahead),
            time_slot_id: "s1".to_string(),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    async fn store_with_doctor() -> (DataStore, Doctor) {
        let store = DataStore::new();
        let doctor = Doctor::new("Dr. Kim", "Cardiology");
        store.put_doctor(doctor.clone()).await;
        (store, doctor)
    }

    #[tokio::test]
    async fn test_get_by_id_includes_doctor() {
        let (store, doctor) = store_with_doctor().await;
        let a = appointment(doctor.id, Uuid::new_v4(), 1, AppointmentStatus::Confirmed);
        store.put_appointment(a.clone()).await;

        let queries = AppointmentQueries::new(store);
        let view = queries.get_by_id(a.id).await.unwrap();
        assert_eq!(view.appointment.id, a.id);
        let doctor_ref = view.doctor.unwrap();
        assert_eq!(doctor_ref.name, "Dr. Kim");
        assert_eq!(doctor_ref.specialization, "Cardiology");

        assert!(matches!(
            queries.get_by_id(Uuid::new_v4()).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_view_tolerates_deleted_doctor() {
        let (store, doctor) = store_with_doctor().await;
        let a = appointment(doctor.id, Uuid::new_v4(), 1, AppointmentStatus::Confirmed);
        store.put_appointment(a.clone()).await;
        store.remove_doctor(doctor.id).await;

        let queries = AppointmentQueries::new(store);
        let view = queries.get_by_id(a.id).await.unwrap();
        assert!(view.doctor.is_none());
    }

    #[tokio::test]
    async fn test_view_serializes_flat_with_doctor() {
        let (store, doctor) = store_with_doctor().await;
        let a = appointment(doctor.id, Uuid::new_v4(), 1, AppointmentStatus::Confirmed);
        store.put_appointment(a.clone()).await;

        let view = AppointmentQueries::new(store).get_by_id(a.id).await.unwrap();
        let value = serde_json::to_value(&view).unwrap();
        // Appointment fields stay at the top level
        assert_eq!(value["timeSlotId"], "s1");
        assert_eq!(value["doctor"]["name"], "Dr. Kim");
        assert_eq!(value["doctor"]["specialization"], "Cardiology");
    }

    #[tokio::test]
    async fn test_my_history_filtered_newest_first_with_doctor() {
        let (store, doctor) = store_with_doctor().await;
        let patient = Uuid::new_v4();
        let other = Uuid::new_v4();

        store
            .put_appointment(appointment(doctor.id, patient, 1, AppointmentStatus::Confirmed))
            .await;
        store
            .put_appointment(appointment(doctor.id, patient, 5, AppointmentStatus::Confirmed))
            .await;
        store
            .put_appointment(appointment(doctor.id, patient, 3, AppointmentStatus::Cancelled))
            .await;
        store
            .put_appointment(appointment(doctor.id, other, 2, AppointmentStatus::Confirmed))
            .await;

        let queries = AppointmentQueries::new(store);
        let history = queries.my_history(patient).await;

        assert_eq!(history.len(), 3);
        assert!(history.windows(2).all(|w| {
            w[0].appointment.appointment_date_time >= w[1].appointment.appointment_date_time
        }));
        assert!(history.iter().all(|v| v.appointment.patient_id == patient));
        assert!(history
            .iter()
            .all(|v| v.doctor.as_ref().map(|d| d.name.as_str()) == Some("Dr. Kim")));
    }

    #[tokio::test]
    async fn test_list_with_status_filter() {
        let (store, doctor) = store_with_doctor().await;
        let patient = Uuid::new_v4();
        store
            .put_appointment(appointment(doctor.id, patient, 1, AppointmentStatus::Confirmed))
            .await;
        store
            .put_appointment(appointment(doctor.id, patient, 2, AppointmentStatus::Cancelled))
            .await;

        let mut raw = HashMap::new();
        raw.insert("status".to_string(), "cancelled".to_string());
        let params = ListParams::from_query(&raw);

        let queries = AppointmentQueries::new(store);
        let page = queries.list(&params).await;

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].appointment.status, AppointmentStatus::Cancelled);
        assert!(page.items[0].doctor.is_some());
    }

    #[tokio::test]
    async fn test_list_default_sort_newest_first() {
        let (store, doctor) = store_with_doctor().await;
        let patient = Uuid::new_v4();
        for days in [2, 9, 4] {
            store
                .put_appointment(appointment(doctor.id, patient, days, AppointmentStatus::Confirmed))
                .await;
        }

        let queries = AppointmentQueries::new(store);
        let page = queries.list(&ListParams::default()).await;

        assert!(page.items.windows(2).all(|w| {
            w[0].appointment.appointment_date_time >= w[1].appointment.appointment_date_time
        }));
    }
}
