use reqwest::Method;
use std::time::Duration;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::*;

// backend resource paths
pub const COURSES: &str = "/courses";
pub const ASSIGN_LECTURER: &str = "/courses/assign-lecturer";
pub const USERS: &str = "/users";
pub const LECTURERS: &str = "/users/lecturers";
pub const MY_CLASSES: &str = "/users/my-classes";
pub const CLASSES: &str = "/classes";
pub const REPORTS: &str = "/reports";
pub const MY_REPORTS: &str = "/reports/my-reports";
pub const PRL_FEEDBACK_REPORTS: &str = "/reports/prl-feedback";
pub const FEEDBACK: &str = "/reports/feedback";
pub const EXPORT_EXCEL: &str = "/reports/export-excel";
pub const RATINGS: &str = "/ratings";

pub fn course_path(id: Id) -> String {
    format!("{}/{}", COURSES, id)
}

pub fn user_path(id: Id) -> String {
    format!("{}/{}", USERS, id)
}

pub fn class_ratings_path(class_id: Id) -> String {
    format!("{}/class/{}", RATINGS, class_id)
}

impl ApiClient {
    // --- reads ---

    pub async fn courses(&self) -> Result<Vec<Course>, ApiError> {
        self.get_json(COURSES).await
    }

    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        self.get_json(USERS).await
    }

    pub async fn lecturers(&self) -> Result<Vec<User>, ApiError> {
        self.get_json(LECTURERS).await
    }

    pub async fn my_classes(&self) -> Result<Vec<Class>, ApiError> {
        self.get_json(MY_CLASSES).await
    }

    pub async fn classes(&self) -> Result<Vec<Class>, ApiError> {
        self.get_json(CLASSES).await
    }

    pub async fn reports(&self) -> Result<Vec<Report>, ApiError> {
        self.get_json(REPORTS).await
    }

    pub async fn my_reports(&self) -> Result<Vec<Report>, ApiError> {
        self.get_json(MY_REPORTS).await
    }

    pub async fn prl_feedback_reports(&self) -> Result<Vec<Report>, ApiError> {
        self.get_json(PRL_FEEDBACK_REPORTS).await
    }

    pub async fn class_ratings(&self, class_id: Id) -> Result<Vec<Rating>, ApiError> {
        self.get_json(&class_ratings_path(class_id)).await
    }

    // --- writes ---

    pub async fn create_course(&self, course: &CourseInput) -> Result<(), ApiError> {
        self.send_json(Method::POST, COURSES, course).await
    }

    pub async fn update_course(&self, id: Id, course: &CourseInput) -> Result<(), ApiError> {
        self.send_json(Method::PUT, &course_path(id), course).await
    }

    pub async fn delete_course(&self, id: Id) -> Result<(), ApiError> {
        self.delete(&course_path(id)).await
    }

    pub async fn assign_lecturer(&self, body: &AssignLecturer) -> Result<(), ApiError> {
        self.send_json(Method::POST, ASSIGN_LECTURER, body).await
    }

    pub async fn assign_stream(&self, user_id: Id, stream: &str) -> Result<(), ApiError> {
        let body = StreamUpdate {
            stream: stream.to_string(),
        };
        self.send_json(Method::PUT, &user_path(user_id), &body).await
    }

    pub async fn create_class(&self, class: &NewClass) -> Result<(), ApiError> {
        self.send_json(Method::POST, CLASSES, class).await
    }

    pub async fn submit_report(&self, report: &NewReport) -> Result<(), ApiError> {
        self.send_json(Method::POST, REPORTS, report).await
    }

    pub async fn add_feedback(&self, feedback: &NewFeedback) -> Result<(), ApiError> {
        self.send_json(Method::POST, FEEDBACK, feedback).await
    }

    pub async fn submit_rating(&self, rating: &NewRating) -> Result<(), ApiError> {
        self.send_json(Method::POST, RATINGS, rating).await
    }

    pub async fn export_reports(&self, timeout: Duration) -> Result<Vec<u8>, ApiError> {
        self.get_bytes(EXPORT_EXCEL, timeout).await
    }
}
