use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{serde_as, DefaultOnNull, NoneAsEmptyString};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub type Id = i64;

pub const FACULTY_NAME: &str = "Faculty of Information Communication Technology (FICT)";

pub const STREAMS: [&str; 5] = [
    "Software Development",
    "Data Science",
    "Networking",
    "Cybersecurity",
    "Business Information Technology",
];

/// Scope used for a PRL whose stream has not been assigned yet.
pub const DEFAULT_STREAM: &str = "Software Development";

pub const WEEKS_OF_REPORTING: u8 = 15;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Lecturer,
    Prl,
    Pl,
}

impl Role {
    pub fn display_name(self) -> &'static str {
        match self {
            Role::Pl => "Program Leader",
            Role::Prl => "Principal Lecturer",
            Role::Lecturer => "Lecturer",
            Role::Student => "Student",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Lecturer => "lecturer",
            Role::Prl => "prl",
            Role::Pl => "pl",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "lecturer" => Ok(Role::Lecturer),
            "prl" => Ok(Role::Prl),
            "pl" => Ok(Role::Pl),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    // kept as a string so a user with an unexpected role does not sink the whole list
    #[serde(default)]
    pub role: String,
    #[serde_as(as = "DefaultOnNull<NoneAsEmptyString>")]
    #[serde(default)]
    pub stream: Option<String>,
    #[serde(default)]
    pub faculty: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role() == Some(role)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Id,
    #[serde(default)]
    pub course_code: String,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub stream: String,
    #[serde(default)]
    pub lecturer_id: Option<Id>,
    #[serde(rename = "Lecturer", default)]
    pub lecturer: Option<User>,
}

impl Course {
    pub fn assigned_lecturer_id(&self) -> Option<Id> {
        self.lecturer.as_ref().map(|l| l.id).or(self.lecturer_id)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: Id,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub scheduled_time: String,
    #[serde(default)]
    pub total_students: u32,
    #[serde(default)]
    pub course_id: Option<Id>,
    #[serde(default)]
    pub lecturer_id: Option<Id>,
    #[serde(rename = "Course", default)]
    pub course: Option<Course>,
    #[serde(rename = "User", default)]
    pub lecturer: Option<User>,
}

impl Class {
    // inherited from the embedded course
    pub fn stream(&self) -> Option<&str> {
        self.course.as_ref().map(|c| c.stream.as_str())
    }

    pub fn course_name(&self) -> Option<&str> {
        self.course.as_ref().map(|c| c.course_name.as_str())
    }

    pub fn taught_by(&self, user_id: Id) -> bool {
        self.lecturer.as_ref().map(|l| l.id).or(self.lecturer_id) == Some(user_id)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Id,
    #[serde(default)]
    pub report_id: Option<Id>,
    #[serde(default)]
    pub feedback: String,
    #[serde(rename = "User", default)]
    pub author: Option<User>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStatus {
    Pending,
    Reviewed,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Id,
    #[serde(default)]
    pub class_id: Option<Id>,
    #[serde(default)]
    pub lecturer_id: Option<Id>,
    #[serde(default)]
    pub week_of_reporting: String,
    #[serde(default)]
    pub date_of_lecture: String,
    #[serde(default)]
    pub actual_students_present: u32,
    #[serde(default)]
    pub topic_taught: String,
    #[serde(default)]
    pub learning_outcomes: String,
    #[serde(default)]
    pub recommendations: String,
    #[serde(rename = "Class", default)]
    pub class: Option<Class>,
    #[serde(rename = "User", default)]
    pub lecturer: Option<User>,
    // at most one feedback per report; the wire carries an array
    #[serde(
        rename = "Feedbacks",
        default,
        deserialize_with = "first_feedback",
        skip_serializing
    )]
    pub feedback: Option<Feedback>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn first_feedback<'de, D>(deserializer: D) -> Result<Option<Feedback>, D::Error>
where
    D: Deserializer<'de>,
{
    let list: Option<Vec<Feedback>> = Option::deserialize(deserializer)?;
    Ok(list.and_then(|l| l.into_iter().next()))
}

impl Report {
    pub fn status(&self) -> ReviewStatus {
        if self.feedback.is_some() {
            ReviewStatus::Reviewed
        } else {
            ReviewStatus::Pending
        }
    }

    pub fn is_reviewed(&self) -> bool {
        self.status() == ReviewStatus::Reviewed
    }

    pub fn stream(&self) -> Option<&str> {
        self.class.as_ref().and_then(Class::stream)
    }

    pub fn authored_by(&self, user_id: Id) -> bool {
        self.lecturer.as_ref().map(|u| u.id).or(self.lecturer_id) == Some(user_id)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: Id,
    #[serde(default)]
    pub class_id: Option<Id>,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(rename = "Class", default)]
    pub class: Option<Class>,
    #[serde(rename = "User", default)]
    pub student: Option<User>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Rating {
    pub fn rated_by(&self, user_id: Id) -> bool {
        self.student.as_ref().map(|u| u.id) == Some(user_id)
    }
}

// --- request bodies ---

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub class_id: Id,
    pub week_of_reporting: String,
    pub date_of_lecture: String,
    pub actual_students_present: u32,
    pub topic_taught: String,
    pub learning_outcomes: String,
    pub recommendations: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedback {
    pub report_id: Id,
    pub feedback: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewRating {
    pub rating: u8,
    pub comment: String,
    pub class_id: Id,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    pub course_code: String,
    pub course_name: String,
    pub stream: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewClass {
    pub class_name: String,
    pub venue: String,
    pub scheduled_time: String,
    pub total_students: u32,
    pub course_id: Id,
    pub lecturer_id: Id,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssignLecturer {
    pub course_id: Id,
    pub lecturer_id: Id,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StreamUpdate {
    pub stream: String,
}
