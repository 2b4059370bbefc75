use serde::Serialize;

use crate::models::Role;
use crate::session::CurrentUser;
use crate::workflow::{SectionKind, Workflow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    // program leader
    Courses,
    Classes,
    PrlReports,
    Lectures,
    PrlManagement,
    // principal lecturer
    StreamCourses,
    StreamReports,
    StreamClasses,
    // lecturer
    MyClasses,
    MyReports,
    // shared
    Monitoring,
    Ratings,
    MyRatings,
}

impl Tab {
    pub fn title(self) -> &'static str {
        match self {
            Tab::Courses => "Courses Management",
            Tab::Classes => "Classes",
            Tab::PrlReports => "PRL Reports",
            Tab::Lectures => "Lectures",
            Tab::PrlManagement => "PRL Management",
            Tab::StreamCourses => "My Stream Courses",
            Tab::StreamReports => "Lecture Reports",
            Tab::StreamClasses => "Classes",
            Tab::MyClasses => "My Classes",
            Tab::MyReports => "My Reports",
            Tab::Monitoring => "Monitoring",
            Tab::Ratings => "Ratings",
            Tab::MyRatings => "My Ratings",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ViewConfig {
    pub tabs: &'static [Tab],
    pub workflows: &'static [Workflow],
    // fetched on mount
    pub sections: &'static [SectionKind],
}

impl ViewConfig {
    pub fn exposes(&self, workflow: Workflow) -> bool {
        self.workflows.contains(&workflow)
    }

    pub fn shows(&self, tab: Tab) -> bool {
        self.tabs.contains(&tab)
    }
}

static PL_VIEW: ViewConfig = ViewConfig {
    tabs: &[
        Tab::Courses,
        Tab::Classes,
        Tab::PrlReports,
        Tab::Monitoring,
        Tab::Lectures,
        Tab::Ratings,
        Tab::PrlManagement,
    ],
    workflows: &[
        Workflow::CreateCourse,
        Workflow::UpdateCourse,
        Workflow::DeleteCourse,
        Workflow::CreateClass,
        Workflow::AssignLecturer,
        Workflow::AssignPrlStream,
        Workflow::ExportReports,
    ],
    sections: &[
        SectionKind::Courses,
        SectionKind::Lecturers,
        SectionKind::Classes,
        SectionKind::PrlFeedbackReports,
        SectionKind::Reports,
        SectionKind::Users,
        SectionKind::Ratings,
    ],
};

static PRL_VIEW: ViewConfig = ViewConfig {
    tabs: &[
        Tab::StreamCourses,
        Tab::StreamReports,
        Tab::Monitoring,
        Tab::StreamClasses,
        Tab::Ratings,
    ],
    workflows: &[Workflow::AddFeedback],
    sections: &[
        SectionKind::Courses,
        SectionKind::Reports,
        SectionKind::Classes,
        SectionKind::Ratings,
    ],
};

static LECTURER_VIEW: ViewConfig = ViewConfig {
    tabs: &[Tab::MyClasses, Tab::MyReports, Tab::Monitoring, Tab::Ratings],
    workflows: &[Workflow::SubmitReport],
    sections: &[
        SectionKind::MyClasses,
        SectionKind::MyReports,
        SectionKind::Reports,
        SectionKind::Ratings,
    ],
};

static STUDENT_VIEW: ViewConfig = ViewConfig {
    tabs: &[Tab::Monitoring, Tab::MyRatings],
    workflows: &[Workflow::SubmitRating],
    sections: &[SectionKind::Classes, SectionKind::Reports, SectionKind::Ratings],
};

pub fn view_config(role: Role) -> &'static ViewConfig {
    match role {
        Role::Pl => &PL_VIEW,
        Role::Prl => &PRL_VIEW,
        Role::Lecturer => &LECTURER_VIEW,
        Role::Student => &STUDENT_VIEW,
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Access {
    Dashboard(Role, &'static ViewConfig),
    // send the user to the login screen
    Unauthenticated,
}

pub fn resolve(user: Option<&CurrentUser>) -> Access {
    match user {
        Some(u) => Access::Dashboard(u.role, view_config(u.role)),
        None => Access::Unauthenticated,
    }
}

/// Same as [`resolve`] for a role name straight off the wire.
pub fn resolve_role_name(role: Option<&str>) -> Access {
    match role.and_then(|r| r.parse::<Role>().ok()) {
        Some(role) => Access::Dashboard(role, view_config(role)),
        None => Access::Unauthenticated,
    }
}
