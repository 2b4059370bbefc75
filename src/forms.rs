//! Form state for the mutation workflows and the client-side checks that
//! run before anything is sent.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Please enter {0}")]
    Missing(&'static str),
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub fn is_known_stream(s: &str) -> bool {
    STREAMS.contains(&s)
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, FormError> {
    if value.trim().is_empty() {
        Err(FormError::Missing(field))
    } else {
        Ok(value)
    }
}

fn selected(field: &'static str, value: Option<Id>) -> Result<Id, FormError> {
    value.ok_or(FormError::Missing(field))
}

fn count(field: &'static str, value: &str) -> Result<u32, FormError> {
    required(field, value)?
        .trim()
        .parse::<u32>()
        .map_err(|_| FormError::Invalid {
            field,
            reason: format!("'{}' is not a whole number", value.trim()),
        })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportForm {
    pub class_id: Option<Id>,
    // size of the selected class, bounds the attendance
    pub class_size: Option<u32>,
    pub week_of_reporting: String,
    pub date_of_lecture: String,
    pub actual_students_present: String,
    pub topic_taught: String,
    pub learning_outcomes: String,
    pub recommendations: String,
}

impl ReportForm {
    pub fn for_class(class: &Class) -> ReportForm {
        ReportForm {
            class_id: Some(class.id),
            class_size: Some(class.total_students),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<NewReport, FormError> {
        let class_id = selected("class", self.class_id)?;
        let week = required("week of reporting", &self.week_of_reporting)?;
        let date = required("date of lecture", &self.date_of_lecture)?;
        NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| FormError::Invalid {
            field: "date of lecture",
            reason: "expected YYYY-MM-DD".into(),
        })?;
        let present = count("actual students present", &self.actual_students_present)?;
        if let Some(size) = self.class_size {
            if present > size {
                return Err(FormError::Invalid {
                    field: "actual students present",
                    reason: format!("{} exceeds class size {}", present, size),
                });
            }
        }
        let topic = required("topic taught", &self.topic_taught)?;
        let outcomes = required("learning outcomes", &self.learning_outcomes)?;
        let recommendations = required("recommendations", &self.recommendations)?;

        Ok(NewReport {
            class_id,
            week_of_reporting: week.to_string(),
            date_of_lecture: date.trim().to_string(),
            actual_students_present: present,
            topic_taught: topic.to_string(),
            learning_outcomes: outcomes.to_string(),
            recommendations: recommendations.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackForm {
    pub report_id: Option<Id>,
    pub feedback: String,
}

impl FeedbackForm {
    pub fn for_report(report: &Report) -> FeedbackForm {
        FeedbackForm {
            report_id: Some(report.id),
            feedback: String::new(),
        }
    }

    pub fn validate(&self) -> Result<NewFeedback, FormError> {
        let report_id = selected("report", self.report_id)?;
        let feedback = required("feedback", &self.feedback)?;
        Ok(NewFeedback {
            report_id,
            feedback: feedback.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingForm {
    pub class_id: Option<Id>,
    pub rating: u8,
    pub comment: String,
}

impl Default for RatingForm {
    fn default() -> Self {
        RatingForm {
            class_id: None,
            rating: 5,
            comment: String::new(),
        }
    }
}

impl RatingForm {
    pub fn for_class(class: &Class) -> RatingForm {
        RatingForm {
            class_id: Some(class.id),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<NewRating, FormError> {
        let class_id = selected("class", self.class_id)?;
        if !(1..=5).contains(&self.rating) {
            return Err(FormError::Invalid {
                field: "rating",
                reason: format!("{} is outside 1-5", self.rating),
            });
        }
        Ok(NewRating {
            rating: self.rating,
            comment: self.comment.clone(),
            class_id,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseForm {
    pub course_code: String,
    pub course_name: String,
    pub stream: String,
}

impl CourseForm {
    pub fn from_course(course: &Course) -> CourseForm {
        CourseForm {
            course_code: course.course_code.clone(),
            course_name: course.course_name.clone(),
            stream: course.stream.clone(),
        }
    }

    pub fn validate(&self) -> Result<CourseInput, FormError> {
        let code = required("course code", &self.course_code)?;
        let name = required("course name", &self.course_name)?;
        let stream = required("stream", &self.stream)?;
        if !is_known_stream(stream) {
            return Err(FormError::Invalid {
                field: "stream",
                reason: format!("'{}' is not a faculty stream", stream),
            });
        }
        Ok(CourseInput {
            course_code: code.to_string(),
            course_name: name.to_string(),
            stream: stream.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassForm {
    pub class_name: String,
    pub venue: String,
    pub scheduled_time: String,
    pub total_students: String,
    pub course_id: Option<Id>,
    pub lecturer_id: Option<Id>,
}

impl ClassForm {
    pub fn validate(&self) -> Result<NewClass, FormError> {
        let class_name = required("class name", &self.class_name)?;
        let course_id = selected("course", self.course_id)?;
        let lecturer_id = selected("lecturer", self.lecturer_id)?;
        let venue = required("venue", &self.venue)?;
        let scheduled_time = required("scheduled time", &self.scheduled_time)?;
        let total_students = count("total students", &self.total_students)?;
        if total_students == 0 {
            return Err(FormError::Invalid {
                field: "total students",
                reason: "a class needs at least one student".into(),
            });
        }
        Ok(NewClass {
            class_name: class_name.to_string(),
            venue: venue.to_string(),
            scheduled_time: scheduled_time.to_string(),
            total_students,
            course_id,
            lecturer_id,
        })
    }
}

pub fn validate_assignment(course_id: Option<Id>, lecturer_id: Option<Id>) -> Result<AssignLecturer, FormError> {
    Ok(AssignLecturer {
        course_id: selected("course", course_id)?,
        lecturer_id: selected("lecturer", lecturer_id)?,
    })
}

pub fn validate_stream(stream: &str) -> Result<&str, FormError> {
    let stream = required("stream", stream)?;
    if is_known_stream(stream) {
        Ok(stream)
    } else {
        Err(FormError::Invalid {
            field: "stream",
            reason: format!("'{}' is not a faculty stream", stream),
        })
    }
}
