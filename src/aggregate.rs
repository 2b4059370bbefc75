//! Derived views over collections that are already in memory.
//!
//! Nothing in here talks to the backend. Rating scopes need a fetch per
//! class, see [`crate::fetch::ratings_for_classes`]; this module only
//! resolves which class ids belong to a scope.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::*;

/// Stream a PRL is scoped to; unassigned PRLs fall back to [`DEFAULT_STREAM`].
pub fn effective_stream(user: &User) -> &str {
    scope_stream(user.stream.as_deref())
}

pub fn scope_stream(stream: Option<&str>) -> &str {
    stream.unwrap_or(DEFAULT_STREAM)
}

pub fn courses_in_stream<'a>(courses: &'a [Course], stream: &str) -> Vec<&'a Course> {
    courses.iter().filter(|c| c.stream == stream).collect()
}

pub fn classes_in_stream<'a>(classes: &'a [Class], stream: &str) -> Vec<&'a Class> {
    classes.iter().filter(|c| c.stream() == Some(stream)).collect()
}

pub fn reports_in_stream<'a>(reports: &'a [Report], stream: &str) -> Vec<&'a Report> {
    reports.iter().filter(|r| r.stream() == Some(stream)).collect()
}

pub fn class_ids<'a, I>(classes: I) -> Vec<Id>
where
    I: IntoIterator<Item = &'a Class>,
{
    classes.into_iter().map(|c| c.id).collect()
}

pub fn classes_taught_by(classes: &[Class], lecturer_id: Id) -> Vec<&Class> {
    classes.iter().filter(|c| c.taught_by(lecturer_id)).collect()
}

pub fn reports_by(reports: &[Report], lecturer_id: Id) -> Vec<&Report> {
    reports.iter().filter(|r| r.authored_by(lecturer_id)).collect()
}

pub fn reports_with_feedback(reports: &[Report]) -> Vec<&Report> {
    reports.iter().filter(|r| r.is_reviewed()).collect()
}

pub fn ratings_by(ratings: &[Rating], student_id: Id) -> Vec<&Rating> {
    ratings.iter().filter(|r| r.rated_by(student_id)).collect()
}

pub fn users_with_role(users: &[User], role: Role) -> Vec<&User> {
    users.iter().filter(|u| u.has_role(role)).collect()
}

pub fn unassigned_prls(users: &[User]) -> Vec<&User> {
    users
        .iter()
        .filter(|u| u.has_role(Role::Prl) && u.stream.is_none())
        .collect()
}

/// Distinct streams across all courses, sorted.
pub fn streams_used(courses: &[Course]) -> Vec<&str> {
    courses
        .iter()
        .map(|c| c.stream.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn courses_per_stream(courses: &[Course]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for c in courses {
        *counts.entry(c.stream.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Assigned PRLs as `(stream, prl name)` pairs, in user order.
pub fn prl_assignments(users: &[User]) -> Vec<(&str, &str)> {
    users
        .iter()
        .filter(|u| u.has_role(Role::Prl))
        .filter_map(|u| u.stream.as_deref().map(|s| (s, u.name.as_str())))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    Low,
    Medium,
    High,
}

/// Attendance thresholds of one view, as fractions of the class size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttendancePolicy {
    pub high_above: f64,
    // None: the view has no low bucket
    pub medium_above: Option<f64>,
}

/// Report tables across dashboards.
pub const REPORT_ATTENDANCE: AttendancePolicy = AttendancePolicy {
    high_above: 0.8,
    medium_above: Some(0.6),
};

/// The Program Leader's "PRL Reports" table.
pub const PRL_REPORTS_ATTENDANCE: AttendancePolicy = AttendancePolicy {
    high_above: 0.7,
    medium_above: None,
};

impl AttendancePolicy {
    pub fn bucket(&self, present: u32, total: u32) -> Attendance {
        let present = f64::from(present);
        let total = f64::from(total);
        if present > self.high_above * total {
            return Attendance::High;
        }
        match self.medium_above {
            Some(t) if present > t * total => Attendance::Medium,
            _ => self.lowest(),
        }
    }

    /// Bottom bucket of this policy.
    pub fn lowest(&self) -> Attendance {
        match self.medium_above {
            Some(_) => Attendance::Low,
            None => Attendance::Medium,
        }
    }

    /// A report without its class has no class size to compare against
    /// and lands in the policy's bottom bucket.
    pub fn bucket_report(&self, report: &Report) -> Attendance {
        match &report.class {
            Some(class) => self.bucket(report.actual_students_present, class.total_students),
            None => self.lowest(),
        }
    }
}
