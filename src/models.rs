use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 2] = [AttendanceStatus::Present, AttendanceStatus::Absent];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
        }
    }

    /// CSS class for the history badge; unknown statuses share one class.
    pub fn badge_class(raw: &str) -> &'static str {
        match raw.parse::<Self>() {
            Ok(Self::Present) => "present",
            Ok(Self::Absent) => "absent",
            Err(_) => "unknown",
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("present") {
            Ok(Self::Present)
        } else if trimmed.eq_ignore_ascii_case("absent") {
            Ok(Self::Absent)
        } else {
            Err(format!("unknown attendance status '{trimmed}'"))
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceEntry {
    #[serde(rename = "enroll_no")]
    pub enrollment_id: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceSubmission {
    pub faculty_id: String,
    pub course_id: String,
    #[serde(rename = "attendance_list")]
    pub entries: Vec<AttendanceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(rename = "enroll_no")]
    pub enrollment_id: String,
    #[serde(rename = "name")]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct StudentList {
    pub students: Vec<StudentRecord>,
}

/// The backend sends a preformatted string ("80.00%"), but a bare number is
/// tolerated too.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Percentage {
    Text(String),
    Number(f64),
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(value) => write!(f, "{value:.2}%"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportSummary {
    pub total_classes: u32,
    pub present_count: u32,
    pub absent_count: u32,
    pub percentage: Percentage,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryRecord {
    pub date: String,
    pub course_id: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportView {
    pub student_name: String,
    #[serde(rename = "enroll_no")]
    pub enrollment_id: String,
    pub summary: ReportSummary,
    #[serde(rename = "detailed_history", default)]
    pub history: Vec<HistoryRecord>,
}

#[derive(Debug, Deserialize)]
pub struct FixNamesReply {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub updated: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct NewStudent<'a> {
    pub enroll_no: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Deserialize, Default)]
pub struct TabQuery {
    pub tab: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReportForm {
    #[serde(default)]
    pub enroll_no: String,
}

#[derive(Debug, Deserialize)]
pub struct AddStudentForm {
    #[serde(default)]
    pub new_enroll_no: String,
    #[serde(default)]
    pub new_student_name: String,
}

/// Builds a submission from raw form pairs: `faculty_id`, `course_id` and one
/// `status_<enroll_no>` field per student, in page order.
pub fn collect_submission(fields: &[(String, String)]) -> Result<AttendanceSubmission, String> {
    let mut faculty_id = String::new();
    let mut course_id = String::new();
    let mut entries = Vec::new();

    for (name, value) in fields {
        if name == "faculty_id" {
            faculty_id = value.trim().to_string();
        } else if name == "course_id" {
            course_id = value.trim().to_string();
        } else if let Some(enrollment_id) = name.strip_prefix("status_") {
            let status = value.parse::<AttendanceStatus>()?;
            entries.push(AttendanceEntry {
                enrollment_id: enrollment_id.to_string(),
                status,
            });
        }
    }

    if faculty_id.is_empty() {
        return Err("Please enter a faculty ID".to_string());
    }
    if course_id.is_empty() {
        return Err("Please enter a course ID".to_string());
    }

    Ok(AttendanceSubmission {
        faculty_id,
        course_id,
        entries,
    })
}
