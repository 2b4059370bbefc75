use serde::Serialize;
use std::fmt;

use crate::error::ApiError;
use crate::forms::FormError;

/// Collections a dashboard holds; each one is fetched and refreshed on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKind {
    Courses,
    Classes,
    MyClasses,
    Reports,
    MyReports,
    PrlFeedbackReports,
    Users,
    Lecturers,
    Ratings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Workflow {
    SubmitReport,
    AddFeedback,
    SubmitRating,
    CreateCourse,
    UpdateCourse,
    DeleteCourse,
    CreateClass,
    AssignLecturer,
    AssignPrlStream,
    ExportReports,
}

impl Workflow {
    /// Sections that may be stale once the write went through.
    pub fn refreshes(self) -> &'static [SectionKind] {
        use SectionKind::*;
        match self {
            Workflow::SubmitReport => &[MyReports, Reports],
            Workflow::AddFeedback => &[Reports],
            Workflow::SubmitRating => &[Ratings],
            Workflow::CreateCourse | Workflow::UpdateCourse | Workflow::DeleteCourse => &[Courses],
            Workflow::CreateClass => &[Classes],
            Workflow::AssignLecturer => &[Courses],
            Workflow::AssignPrlStream => &[Users],
            Workflow::ExportReports => &[],
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Workflow::SubmitReport => "Report submitted successfully!",
            Workflow::AddFeedback => "Feedback added successfully!",
            Workflow::SubmitRating => "Rating submitted successfully!",
            Workflow::CreateCourse => "Course created successfully!",
            Workflow::UpdateCourse => "Course updated successfully!",
            Workflow::DeleteCourse => "Course has been deleted.",
            Workflow::CreateClass => "Class created successfully!",
            Workflow::AssignLecturer => "Lecturer assigned successfully!",
            Workflow::AssignPrlStream => "Stream assigned successfully!",
            Workflow::ExportReports => "Excel report downloaded successfully!",
        }
    }

    pub fn generic_error(self) -> &'static str {
        match self {
            Workflow::SubmitReport => "Failed to submit report",
            Workflow::AddFeedback => "Failed to add feedback",
            Workflow::SubmitRating => "Failed to submit rating",
            Workflow::CreateCourse | Workflow::UpdateCourse => "Failed to save course",
            Workflow::DeleteCourse => "Failed to delete course",
            Workflow::CreateClass => "Failed to create class",
            Workflow::AssignLecturer => "Failed to assign lecturer",
            Workflow::AssignPrlStream => "Failed to assign stream",
            Workflow::ExportReports => "Failed to export report. Please try again.",
        }
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Workflow::SubmitReport => "submit-report",
            Workflow::AddFeedback => "add-feedback",
            Workflow::SubmitRating => "submit-rating",
            Workflow::CreateCourse => "create-course",
            Workflow::UpdateCourse => "update-course",
            Workflow::DeleteCourse => "delete-course",
            Workflow::CreateClass => "create-class",
            Workflow::AssignLecturer => "assign-lecturer",
            Workflow::AssignPrlStream => "assign-prl-stream",
            Workflow::ExportReports => "export-reports",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Validating,
    Rejected,
    Submitting,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn can_move_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Submitting)
                | (Validating, Rejected)
                | (Submitting, Succeeded)
                | (Submitting, Failed)
                | (Rejected, Idle)
                | (Succeeded, Idle)
                | (Failed, Idle)
        )
    }
}

/// One pass of a workflow through its phases.
#[derive(Debug, Clone)]
pub struct Run {
    pub workflow: Workflow,
    trail: Vec<Phase>,
}

impl Run {
    pub fn start(workflow: Workflow) -> Run {
        Run {
            workflow,
            trail: vec![Phase::Idle],
        }
    }

    pub fn phase(&self) -> Phase {
        self.trail.last().copied().unwrap_or(Phase::Idle)
    }

    pub fn advance(&mut self, next: Phase) {
        let from = self.phase();
        debug_assert!(from.can_move_to(next), "{} cannot go {:?} -> {:?}", self.workflow, from, next);
        if !from.can_move_to(next) {
            tracing::error!(workflow = %self.workflow, ?from, to = ?next, "illegal workflow transition");
        }
        self.trail.push(next);
    }

    pub fn trail(&self) -> &[Phase] {
        &self.trail
    }
}

#[derive(Debug)]
pub enum Outcome {
    Succeeded,
    // blocked before any request was made
    Rejected(FormError),
    Failed(ApiError),
    // the user backed out of a destructive action; nothing happened
    Declined,
    // the signed-in role does not expose this workflow
    Unavailable,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: Level,
    pub title: &'static str,
    pub message: String,
}

impl Notice {
    pub fn success(workflow: Workflow) -> Notice {
        Notice {
            level: Level::Success,
            title: if workflow == Workflow::DeleteCourse { "Deleted!" } else { "Success!" },
            message: workflow.success_message().to_string(),
        }
    }

    pub fn rejected(err: &FormError) -> Notice {
        Notice {
            level: Level::Error,
            title: "Error!",
            message: err.to_string(),
        }
    }

    /// The backend's own message when it sent one, else the workflow's generic text.
    pub fn failed(workflow: Workflow, err: &ApiError) -> Notice {
        Notice {
            level: Level::Error,
            title: "Error!",
            message: err
                .server_message()
                .unwrap_or_else(|| workflow.generic_error())
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: &'static str,
    pub text: &'static str,
    pub confirm_label: &'static str,
}

pub const DELETE_COURSE_PROMPT: Prompt = Prompt {
    title: "Are you sure?",
    text: "You won't be able to revert this!",
    confirm_label: "Yes, delete it!",
};

/// Interactive yes/no step in front of destructive writes.
pub trait Confirm {
    fn confirm(&mut self, prompt: &Prompt) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&Prompt) -> bool,
{
    fn confirm(&mut self, prompt: &Prompt) -> bool {
        self(prompt)
    }
}
