//! Health record editor.
//!
//! The editor keeps a working copy of a student's record. Repeatable lists
//! always show at least one slot so the form has somewhere to type; blank
//! slots are dropped again when the payload is built.

use serde::Deserialize;

use crate::backend::BackendClient;
use crate::errors::AppError;
use crate::models::{ChronicCondition, HealthRecord, Immunization, Medication, Student};

/// Repeatable sections of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListField {
    Allergies,
    ChronicConditions,
    Medications,
    Immunizations,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthRecordEditor {
    record: HealthRecord,
}

impl HealthRecordEditor {
    /// Start editing an existing record, or a blank one for the student.
    pub fn new(existing: Option<HealthRecord>, student_id: &str) -> Self {
        let mut record = existing.unwrap_or_default();
        if record.student.is_none() {
            record.student = Some(student_id.to_string());
        }
        let mut editor = Self { record };
        editor.ensure_slots();
        editor
    }

    /// Resume editing a working copy sent back by the form.
    pub fn from_form(record: HealthRecord) -> Self {
        let mut editor = Self { record };
        editor.ensure_slots();
        editor
    }

    pub fn record(&self) -> &HealthRecord {
        &self.record
    }

    pub fn add(&mut self, field: ListField) {
        match field {
            ListField::Allergies => self.record.allergies.push(String::new()),
            ListField::ChronicConditions => self
                .record
                .chronic_conditions
                .push(ChronicCondition::default()),
            ListField::Medications => self.record.medications.push(Medication::default()),
            ListField::Immunizations => self.record.immunizations.push(Immunization::default()),
        }
    }

    /// Remove one slot. Out-of-range indexes are ignored.
    pub fn remove(&mut self, field: ListField, index: usize) {
        match field {
            ListField::Allergies => remove_at(&mut self.record.allergies, index),
            ListField::ChronicConditions => remove_at(&mut self.record.chronic_conditions, index),
            ListField::Medications => remove_at(&mut self.record.medications, index),
            ListField::Immunizations => remove_at(&mut self.record.immunizations, index),
        }
        self.ensure_slots();
    }

    #[cfg(test)]
    pub fn record_mut(&mut self) -> &mut HealthRecord {
        &mut self.record
    }

    pub fn len(&self, field: ListField) -> usize {
        match field {
            ListField::Allergies => self.record.allergies.len(),
            ListField::ChronicConditions => self.record.chronic_conditions.len(),
            ListField::Medications => self.record.medications.len(),
            ListField::Immunizations => self.record.immunizations.len(),
        }
    }

    fn ensure_slots(&mut self) {
        for field in [
            ListField::Allergies,
            ListField::ChronicConditions,
            ListField::Medications,
            ListField::Immunizations,
        ] {
            if self.len(field) == 0 {
                self.add(field);
            }
        }
    }

    /// The record as it should be sent: entries with an empty primary field removed.
    pub fn payload(&self) -> HealthRecord {
        let mut record = self.record.clone();
        record.allergies.retain(|a| !a.trim().is_empty());
        record.chronic_conditions.retain(|c| !c.name.trim().is_empty());
        record.medications.retain(|m| !m.name.trim().is_empty());
        record.immunizations.retain(|i| !i.name.trim().is_empty());
        record
    }
}

fn remove_at<T>(items: &mut Vec<T>, index: usize) {
    if index < items.len() {
        items.remove(index);
    }
}

/// Editor hydrated for the student with this admission number.
///
/// A link to a record the backend no longer has is dropped and a blank
/// editor returned.
pub async fn load_form(
    backend: &BackendClient,
    token: &str,
    admission_number: &str,
) -> Result<(Student, HealthRecordEditor), AppError> {
    let mut student = backend.student_by_admission(token, admission_number).await?;
    let existing = match student.health_record.clone() {
        Some(id) => match backend.health_record(token, &id).await {
            Ok(record) => Some(record),
            Err(err) if err.is_upstream_not_found() => {
                tracing::warn!("Student {} links missing health record {}", student.id, id);
                student.health_record = None;
                None
            }
            Err(err) => return Err(err),
        },
        None => None,
    };
    let editor = HealthRecordEditor::new(existing, &student.id);
    Ok((student, editor))
}

/// Create or update the student's record from the editor.
///
/// A student with a linked record gets an update; otherwise, or when the
/// linked record is gone, the record is created and its id linked back onto
/// the student. On failure nothing is rolled back, so the caller can offer a
/// retry with the same form.
pub async fn submit(
    backend: &BackendClient,
    token: &str,
    student: &Student,
    editor: &HealthRecordEditor,
) -> Result<HealthRecord, AppError> {
    let mut payload = editor.payload();
    payload.student = Some(student.id.clone());

    if let Some(id) = &student.health_record {
        payload.id = Some(id.clone());
        match backend.update_health_record(token, id, &payload).await {
            Ok(saved) => {
                tracing::info!("Updated health record {} for student {}", id, student.id);
                return Ok(saved);
            }
            Err(err) if err.is_upstream_not_found() => {
                tracing::warn!("Health record {} is gone, creating a new one", id);
            }
            Err(err) => return Err(err),
        }
    }

    payload.id = None;
    let saved = backend.create_health_record(token, &payload).await?;
    let id = saved.id.clone().ok_or_else(|| AppError::Upstream {
        message: "School server did not return an id for the new health record".to_string(),
        status: None,
    })?;
    backend.link_health_record(token, &student.id, &id).await?;
    tracing::info!("Created health record {} for student {}", id, student.id);
    Ok(saved)
}
