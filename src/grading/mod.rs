//! Exam grading engine.
//!
//! Turns raw mark entries into grades, pass/fail status, row totals and
//! percentages, and decides when a student's row may be submitted. Derived
//! values are always recomputed from the mark itself, never taken from what
//! the backend stored.

use serde::Serialize;

use crate::errors::AppError;
use crate::models::{Exam, Grade, MarkStatus, MarkValue, Student, SubjectMark, SubmitMarksRequest};

/// Share of the maximum a mark needs to pass.
pub const PASS_RATIO: f64 = 0.5;

/// Lower percentage bounds, checked top-down. Anything below the last is an F.
const GRADE_THRESHOLDS: [(f64, Grade); 5] = [
    (90.0, Grade::APlus),
    (80.0, Grade::A),
    (68.0, Grade::B),
    (55.0, Grade::C),
    (30.0, Grade::D),
];

/// Letter grade for a percentage.
pub fn grade(percentage: f64) -> Grade {
    GRADE_THRESHOLDS
        .iter()
        .find(|(min, _)| percentage >= *min)
        .map(|(_, g)| *g)
        .unwrap_or(Grade::F)
}

pub fn status(mark: f64, max_marks: f64) -> MarkStatus {
    if mark >= PASS_RATIO * max_marks {
        MarkStatus::Passed
    } else {
        MarkStatus::Failed
    }
}

pub fn percentage(mark: f64, max_marks: f64) -> f64 {
    if max_marks > 0.0 {
        mark / max_marks * 100.0
    } else {
        0.0
    }
}

/// Grade recorded against a single subject mark. A failing mark is always an F.
pub fn grade_for_mark(mark: f64, max_marks: f64) -> Grade {
    match status(mark, max_marks) {
        MarkStatus::Failed => Grade::F,
        MarkStatus::Passed => grade(percentage(mark, max_marks)),
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Why a typed mark was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkInputError {
    NotNumeric(String),
    Negative,
    AboveMax(f64),
}

impl std::fmt::Display for MarkInputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkInputError::NotNumeric(input) => write!(f, "{:?} is not a number", input),
            MarkInputError::Negative => write!(f, "Marks cannot be negative"),
            MarkInputError::AboveMax(max) => write!(f, "Marks cannot exceed {}", max),
        }
    }
}

impl From<MarkInputError> for AppError {
    fn from(err: MarkInputError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Parse a typed mark. An empty input is the unset sentinel, not zero.
pub fn parse_mark(input: &str, max_marks: f64) -> Result<MarkValue, MarkInputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(MarkValue::Unset);
    }

    let value: f64 = trimmed
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| MarkInputError::NotNumeric(input.to_string()))?;

    if value < 0.0 {
        return Err(MarkInputError::Negative);
    }
    if value > max_marks {
        return Err(MarkInputError::AboveMax(max_marks));
    }

    Ok(MarkValue::Scored(value))
}

/// One editable subject cell of a student's row.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MarkEntry {
    pub subject: String,
    pub marks: MarkValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<Grade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MarkStatus>,
}

impl MarkEntry {
    pub fn new(subject: &str, marks: MarkValue, max_marks: f64) -> Self {
        let score = marks.score();
        Self {
            subject: subject.to_string(),
            marks,
            grade: score.map(|v| grade_for_mark(v, max_marks)),
            status: score.map(|v| status(v, max_marks)),
        }
    }
}

/// A student's marks as shown in the grading table.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudentMarksRow {
    pub student_id: String,
    pub student_name: String,
    pub marks: Vec<MarkEntry>,
}

impl StudentMarksRow {
    pub fn total(&self) -> f64 {
        self.marks.iter().filter_map(|m| m.marks.score()).sum()
    }

    /// Total as a share of every subject's maximum, rounded to 2 decimals.
    pub fn percentage(&self, max_marks: f64) -> f64 {
        let possible = max_marks * self.marks.len() as f64;
        round2(percentage(self.total(), possible))
    }

    pub fn is_complete(&self) -> bool {
        self.marks.iter().all(|m| m.marks != MarkValue::Unset)
    }

    /// Backend payload for this row, available only once every subject is marked.
    pub fn submission(&self, max_marks: f64) -> Option<SubmitMarksRequest> {
        let marks = self
            .marks
            .iter()
            .map(|m| {
                m.marks.score().map(|v| SubjectMark {
                    subject: m.subject.clone(),
                    marks: v,
                    grade: grade_for_mark(v, max_marks),
                    status: status(v, max_marks),
                })
            })
            .collect::<Option<Vec<_>>>()?;

        Some(SubmitMarksRequest {
            student_id: self.student_id.clone(),
            marks,
        })
    }
}

/// In-memory student × subject matrix for one exam.
#[derive(Debug, Clone)]
pub struct ExamTable {
    pub exam_id: String,
    pub exam_name: String,
    pub subjects: Vec<String>,
    pub max_marks: f64,
    pub rows: Vec<StudentMarksRow>,
}

impl ExamTable {
    /// Hydrate a row per roster student from the marks stored on the exam.
    pub fn build(exam: &Exam, roster: &[Student]) -> Self {
        let rows = roster
            .iter()
            .map(|student| {
                let stored = exam.marks_for(&student.id);
                let marks = exam
                    .subjects
                    .iter()
                    .map(|subject| {
                        let value = stored
                            .and_then(|s| s.marks.iter().find(|m| &m.subject == subject))
                            .map(|m| MarkValue::Scored(m.marks))
                            .unwrap_or_default();
                        MarkEntry::new(subject, value, exam.max_marks)
                    })
                    .collect();

                StudentMarksRow {
                    student_id: student.id.clone(),
                    student_name: student.name.clone(),
                    marks,
                }
            })
            .collect();

        Self {
            exam_id: exam.id.clone(),
            exam_name: exam.name.clone(),
            subjects: exam.subjects.clone(),
            max_marks: exam.max_marks,
            rows,
        }
    }

    pub fn row(&self, student_id: &str) -> Option<&StudentMarksRow> {
        self.rows.iter().find(|r| r.student_id == student_id)
    }

    /// Apply a typed mark. Rejected input leaves the table untouched.
    pub fn set_mark(
        &mut self,
        student_id: &str,
        subject: &str,
        input: &str,
    ) -> Result<&StudentMarksRow, AppError> {
        let max_marks = self.max_marks;
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.student_id == student_id)
            .ok_or_else(|| AppError::NotFound(format!("Student {} is not in this exam", student_id)))?;
        let entry = row
            .marks
            .iter_mut()
            .find(|m| m.subject == subject)
            .ok_or_else(|| AppError::NotFound(format!("Subject {} is not part of this exam", subject)))?;

        let value = parse_mark(input, max_marks)?;
        *entry = MarkEntry::new(subject, value, max_marks);
        Ok(row)
    }

    /// Payload for submitting one student's marks.
    pub fn submission(&self, student_id: &str) -> Result<SubmitMarksRequest, AppError> {
        let row = self
            .row(student_id)
            .ok_or_else(|| AppError::NotFound(format!("Student {} is not in this exam", student_id)))?;

        row.submission(self.max_marks).ok_or_else(|| {
            AppError::Validation(format!(
                "Enter marks for every subject before submitting {}",
                row.student_name
            ))
        })
    }

    pub fn view(&self) -> ExamTableView {
        ExamTableView {
            exam_id: self.exam_id.clone(),
            exam_name: self.exam_name.clone(),
            subjects: self.subjects.clone(),
            max_marks: self.max_marks,
            rows: self.rows.iter().map(|r| self.row_view(r)).collect(),
        }
    }

    pub fn row_view(&self, row: &StudentMarksRow) -> RowView {
        RowView {
            row: row.clone(),
            total: row.total(),
            percentage: row.percentage(self.max_marks),
            can_submit: row.is_complete(),
        }
    }
}

/// Serializable grading table, with derived row figures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamTableView {
    pub exam_id: String,
    pub exam_name: String,
    pub subjects: Vec<String>,
    pub max_marks: f64,
    pub rows: Vec<RowView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    #[serde(flatten)]
    pub row: StudentMarksRow,
    pub total: f64,
    pub percentage: f64,
    pub can_submit: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudentMarks;

    fn student(id: &str, name: &str) -> Student {
        Student {
            id: id.to_string(),
            name: name.to_string(),
            admission_number: format!("ADM-{}", id),
            class_name: "8".to_string(),
            section: "B".to_string(),
            health_record: None,
        }
    }

    fn exam(marks: Vec<StudentMarks>) -> Exam {
        Exam {
            id: "exam-1".to_string(),
            name: "Midterm".to_string(),
            subjects: vec!["Math".to_string(), "Science".to_string()],
            max_marks: 100.0,
            class_name: "8".to_string(),
            section: "B".to_string(),
            created_by: "t-1".to_string(),
            marks,
        }
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(grade(100.0), Grade::APlus);
        assert_eq!(grade(90.0), Grade::APlus);
        assert_eq!(grade(89.99), Grade::A);
        assert_eq!(grade(80.0), Grade::A);
        assert_eq!(grade(68.0), Grade::B);
        assert_eq!(grade(67.9), Grade::C);
        assert_eq!(grade(55.0), Grade::C);
        assert_eq!(grade(30.0), Grade::D);
        assert_eq!(grade(29.9), Grade::F);
        assert_eq!(grade(0.0), Grade::F);
    }

    #[test]
    fn test_grade_never_improves_as_percentage_drops() {
        let mut previous = grade(100.0);
        for step in (0..=1000).rev() {
            let current = grade(step as f64 / 10.0);
            assert!(current >= previous, "grade improved at {}", step);
            previous = current;
        }
    }

    #[test]
    fn test_status_boundary() {
        assert_eq!(status(50.0, 100.0), MarkStatus::Passed);
        assert_eq!(status(49.5, 100.0), MarkStatus::Failed);
        assert_eq!(status(10.0, 20.0), MarkStatus::Passed);
        assert_eq!(status(0.0, 20.0), MarkStatus::Failed);
    }

    #[test]
    fn test_failing_mark_is_graded_f() {
        assert_eq!(grade_for_mark(40.0, 100.0), Grade::F);
        assert_eq!(grade_for_mark(52.0, 100.0), Grade::D);
        assert_eq!(grade_for_mark(82.0, 100.0), Grade::A);
    }

    #[test]
    fn test_parse_mark() {
        assert_eq!(parse_mark("", 100.0), Ok(MarkValue::Unset));
        assert_eq!(parse_mark("0", 100.0), Ok(MarkValue::Scored(0.0)));
        assert_eq!(parse_mark(" 72.5 ", 100.0), Ok(MarkValue::Scored(72.5)));
        assert_eq!(parse_mark("100", 100.0), Ok(MarkValue::Scored(100.0)));
        assert_eq!(parse_mark("-1", 100.0), Err(MarkInputError::Negative));
        assert_eq!(parse_mark("101", 100.0), Err(MarkInputError::AboveMax(100.0)));
        assert!(matches!(parse_mark("abc", 100.0), Err(MarkInputError::NotNumeric(_))));
        assert!(matches!(parse_mark("NaN", 100.0), Err(MarkInputError::NotNumeric(_))));
        assert!(matches!(parse_mark("inf", 100.0), Err(MarkInputError::NotNumeric(_))));
    }

    #[test]
    fn test_build_hydrates_stored_marks_and_recomputes_grades() {
        let stored = StudentMarks {
            student_id: "s-1".to_string(),
            marks: vec![SubjectMark {
                subject: "Math".to_string(),
                marks: 95.0,
                // stale value from the backend
                grade: Grade::C,
                status: MarkStatus::Failed,
            }],
        };
        let table = ExamTable::build(&exam(vec![stored]), &[student("s-1", "Asha"), student("s-2", "Ben")]);

        let asha = table.row("s-1").unwrap();
        assert_eq!(asha.marks[0].marks, MarkValue::Scored(95.0));
        assert_eq!(asha.marks[0].grade, Some(Grade::APlus));
        assert_eq!(asha.marks[0].status, Some(MarkStatus::Passed));
        assert_eq!(asha.marks[1].marks, MarkValue::Unset);
        assert!(!asha.is_complete());

        let ben = table.row("s-2").unwrap();
        assert!(ben.marks.iter().all(|m| m.marks == MarkValue::Unset));
    }

    #[test]
    fn test_worked_example_row() {
        let mut table = ExamTable::build(&exam(vec![]), &[student("s-1", "Asha")]);
        table.set_mark("s-1", "Math", "82").unwrap();
        table.set_mark("s-1", "Science", "40").unwrap();

        let view = table.view();
        let row = &view.rows[0];
        assert_eq!(row.total, 122.0);
        assert_eq!(row.percentage, 61.0);
        assert!(row.can_submit);
        assert_eq!(row.row.marks[0].grade, Some(Grade::A));
        assert_eq!(row.row.marks[0].status, Some(MarkStatus::Passed));
        assert_eq!(row.row.marks[1].grade, Some(Grade::F));
        assert_eq!(row.row.marks[1].status, Some(MarkStatus::Failed));
    }

    #[test]
    fn test_rejected_input_leaves_row_unchanged() {
        let mut table = ExamTable::build(&exam(vec![]), &[student("s-1", "Asha")]);
        table.set_mark("s-1", "Math", "70").unwrap();
        let before = table.row("s-1").unwrap().clone();

        for bad in ["-3", "100.5", "seventy"] {
            let err = table.set_mark("s-1", "Math", bad).unwrap_err();
            assert_eq!(err.error_code(), "VALIDATION_ERROR");
        }
        assert_eq!(table.row("s-1").unwrap(), &before);
    }

    #[test]
    fn test_clearing_a_mark_blocks_submission() {
        let mut table = ExamTable::build(&exam(vec![]), &[student("s-1", "Asha")]);
        table.set_mark("s-1", "Math", "0").unwrap();
        table.set_mark("s-1", "Science", "55").unwrap();
        assert!(table.submission("s-1").is_ok());

        table.set_mark("s-1", "Science", "").unwrap();
        let err = table.submission("s-1").unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(!table.view().rows[0].can_submit);
    }

    #[test]
    fn test_submission_payload() {
        let mut table = ExamTable::build(&exam(vec![]), &[student("s-1", "Asha")]);
        table.set_mark("s-1", "Math", "91").unwrap();
        table.set_mark("s-1", "Science", "12").unwrap();

        let payload = table.submission("s-1").unwrap();
        assert_eq!(payload.student_id, "s-1");
        assert_eq!(payload.marks[0].grade, Grade::APlus);
        assert_eq!(payload.marks[1].grade, Grade::F);
        assert_eq!(payload.marks[1].status, MarkStatus::Failed);
    }

    #[test]
    fn test_unknown_cell_is_not_found() {
        let mut table = ExamTable::build(&exam(vec![]), &[student("s-1", "Asha")]);
        assert_eq!(table.set_mark("s-9", "Math", "1").unwrap_err().error_code(), "NOT_FOUND");
        assert_eq!(table.set_mark("s-1", "Art", "1").unwrap_err().error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_unset_serializes_as_empty_string() {
        let entry = MarkEntry::new("Math", MarkValue::Unset, 100.0);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["marks"], "");
        assert!(json.get("grade").is_none());
    }
}
