//! Doctor and supplier directory

use chrono::Utc;
use serde::Deserialize;
use shared::{validate_name, Capability, Doctor, Supplier};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::field_error;
use crate::session::Session;
use crate::store::SharedStore;

/// Directory service
#[derive(Clone)]
pub struct DirectoryService {
    store: SharedStore,
}

/// Input for adding a doctor
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDoctorInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 100))]
    pub specialty: String,
    #[validate(length(max = 200))]
    pub hospital: String,
}

/// Input for adding a supplier
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSupplierInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

impl DirectoryService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn create_doctor(&self, session: &Session, input: CreateDoctorInput) -> AppResult<Doctor> {
        session.require(Capability::CreateInventory, "add doctors")?;
        input.validate()?;
        validate_name(&input.name).map_err(|m| field_error("name", m))?;

        let mut store = self.store.write()?;
        if store
            .doctors
            .iter()
            .any(|d| d.name.trim().eq_ignore_ascii_case(input.name.trim()))
        {
            return Err(AppError::DuplicateEntry("doctor name".to_string()));
        }

        let doctor = Doctor {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            specialty: input.specialty,
            hospital: input.hospital,
            created_at: Utc::now(),
        };
        store.doctors.push(doctor.clone());

        tracing::info!(doctor_id = %doctor.id, "Doctor added");
        Ok(doctor)
    }

    pub fn create_supplier(
        &self,
        session: &Session,
        input: CreateSupplierInput,
    ) -> AppResult<Supplier> {
        session.require(Capability::CreateInventory, "add suppliers")?;
        input.validate()?;
        validate_name(&input.name).map_err(|m| field_error("name", m))?;

        let mut store = self.store.write()?;
        if store
            .suppliers
            .iter()
            .any(|s| s.name.trim().eq_ignore_ascii_case(input.name.trim()))
        {
            return Err(AppError::DuplicateEntry("supplier name".to_string()));
        }

        let supplier = Supplier {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            phone: input.phone,
            email: input.email,
            created_at: Utc::now(),
        };
        store.suppliers.push(supplier.clone());

        tracing::info!(supplier_id = %supplier.id, "Supplier added");
        Ok(supplier)
    }

    pub fn get_doctor(&self, session: &Session, id: Uuid) -> AppResult<Doctor> {
        session.require(Capability::ViewInventory, "view doctors")?;
        let store = self.store.read()?;
        store.doctor(id).cloned()
    }

    /// All doctors, sorted by name
    pub fn list_doctors(&self, session: &Session) -> AppResult<Vec<Doctor>> {
        session.require(Capability::ViewInventory, "view doctors")?;
        let store = self.store.read()?;
        let mut doctors = store.doctors.clone();
        doctors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(doctors)
    }

    /// All suppliers, sorted by name
    pub fn list_suppliers(&self, session: &Session) -> AppResult<Vec<Supplier>> {
        session.require(Capability::ViewInventory, "view suppliers")?;
        let store = self.store.read()?;
        let mut suppliers = store.suppliers.clone();
        suppliers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(suppliers)
    }
}
