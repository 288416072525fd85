//! Exam and mark models.

use serde::{Deserialize, Serialize, Serializer};

/// Letter grade derived from a percentage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MarkStatus {
    Passed,
    Failed,
}

/// One subject's mark as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubjectMark {
    pub subject: String,
    pub marks: f64,
    pub grade: Grade,
    pub status: MarkStatus,
}

/// All marks recorded for one student in an exam.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudentMarks {
    pub student_id: String,
    #[serde(default)]
    pub marks: Vec<SubjectMark>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub subjects: Vec<String>,
    pub max_marks: f64,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub marks: Vec<StudentMarks>,
}

impl Exam {
    /// Marks recorded for a student, if any.
    pub fn marks_for(&self, student_id: &str) -> Option<&StudentMarks> {
        self.marks.iter().find(|m| m.student_id == student_id)
    }
}

/// Request body for creating an exam through the portal.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExamRequest {
    pub name: String,
    pub subjects: Vec<String>,
    pub max_marks: f64,
    pub class_name: String,
    pub section: String,
}

/// Exam payload sent to the backend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExam {
    pub name: String,
    pub subjects: Vec<String>,
    pub max_marks: f64,
    pub class_name: String,
    pub section: String,
    pub created_by: String,
}

/// Mark submission payload for a single student.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMarksRequest {
    pub student_id: String,
    pub marks: Vec<SubjectMark>,
}

/// A mark cell in the grading table. `Unset` is distinct from a zero mark.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MarkValue {
    #[default]
    Unset,
    Scored(f64),
}

impl MarkValue {
    pub fn score(&self) -> Option<f64> {
        match self {
            MarkValue::Unset => None,
            MarkValue::Scored(v) => Some(*v),
        }
    }
}

// Rendered the way form inputs expect it: `""` when unset.
impl Serialize for MarkValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MarkValue::Unset => serializer.serialize_str(""),
            MarkValue::Scored(v) => serializer.serialize_f64(*v),
        }
    }
}

/// Request body for editing one cell of the grading table.
#[derive(Debug, Clone, Deserialize)]
pub struct SetMarkRequest {
    /// Raw input text; `""` clears the cell.
    pub value: String,
}
