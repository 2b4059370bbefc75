//! Per-role dashboard state: fetched sections, the live search term, open
//! forms and the mutation workflows that write through the backend and
//! then refetch what they may have made stale.

use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};

use crate::aggregate::{self, Attendance, AttendancePolicy, PRL_REPORTS_ATTENDANCE, REPORT_ATTENDANCE};
use crate::client::ApiClient;
use crate::config::DEFAULT_EXPORT_TIMEOUT;
use crate::error::{ApiError, ExportError, SessionError};
use crate::export;
use crate::fetch::{self, FanOut};
use crate::filter::{self, filter};
use crate::forms::*;
use crate::models::*;
use crate::session::{CurrentUser, Session};
use crate::view::{view_config, Tab, ViewConfig};
use crate::workflow::*;

#[derive(Debug)]
pub struct Section<T> {
    items: Vec<T>,
    generation: u64,
    loaded: bool,
    error: Option<String>,
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Section {
            items: Vec::new(),
            generation: 0,
            loaded: false,
            error: None,
        }
    }
}

impl<T> Section<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Last load problem; items stay as they were before that load.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn fill(&mut self, kind: SectionKind, res: Result<Vec<T>, ApiError>) {
        match res {
            Ok(items) => {
                self.items = items;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(section = ?kind, error = %e, "section fetch failed");
                self.error = Some(e.to_string());
            }
        }
        self.loaded = true;
    }
}

#[derive(Debug, Default)]
struct Sections {
    courses: Section<Course>,
    classes: Section<Class>,
    my_classes: Section<Class>,
    reports: Section<Report>,
    my_reports: Section<Report>,
    prl_feedback_reports: Section<Report>,
    users: Section<User>,
    lecturers: Section<User>,
    ratings: Section<Rating>,
}

impl Sections {
    fn generation_mut(&mut self, kind: SectionKind) -> &mut u64 {
        match kind {
            SectionKind::Courses => &mut self.courses.generation,
            SectionKind::Classes => &mut self.classes.generation,
            SectionKind::MyClasses => &mut self.my_classes.generation,
            SectionKind::Reports => &mut self.reports.generation,
            SectionKind::MyReports => &mut self.my_reports.generation,
            SectionKind::PrlFeedbackReports => &mut self.prl_feedback_reports.generation,
            SectionKind::Users => &mut self.users.generation,
            SectionKind::Lecturers => &mut self.lecturers.generation,
            SectionKind::Ratings => &mut self.ratings.generation,
        }
    }
}

/// Issued when a section load starts; only the newest ticket may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub section: SectionKind,
    generation: u64,
}

/// Response of one section load, not yet applied.
#[derive(Debug)]
pub enum Loaded {
    Courses(Result<Vec<Course>, ApiError>),
    Classes(Result<Vec<Class>, ApiError>),
    MyClasses(Result<Vec<Class>, ApiError>),
    Reports(Result<Vec<Report>, ApiError>),
    MyReports(Result<Vec<Report>, ApiError>),
    PrlFeedbackReports(Result<Vec<Report>, ApiError>),
    Users(Result<Vec<User>, ApiError>),
    Lecturers(Result<Vec<User>, ApiError>),
    // Err only when the class list behind the fan-out could not be fetched
    Ratings(Result<FanOut<Rating>, ApiError>),
}

impl Loaded {
    pub fn kind(&self) -> SectionKind {
        match self {
            Loaded::Courses(_) => SectionKind::Courses,
            Loaded::Classes(_) => SectionKind::Classes,
            Loaded::MyClasses(_) => SectionKind::MyClasses,
            Loaded::Reports(_) => SectionKind::Reports,
            Loaded::MyReports(_) => SectionKind::MyReports,
            Loaded::PrlFeedbackReports(_) => SectionKind::PrlFeedbackReports,
            Loaded::Users(_) => SectionKind::Users,
            Loaded::Lecturers(_) => SectionKind::Lecturers,
            Loaded::Ratings(_) => SectionKind::Ratings,
        }
    }
}

/// Which classes the ratings section fans out over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingScope {
    AllClasses,
    Stream(String),
    Taught,
}

pub async fn load(api: ApiClient, kind: SectionKind, scope: RatingScope) -> Loaded {
    match kind {
        SectionKind::Courses => Loaded::Courses(api.courses().await),
        SectionKind::Classes => Loaded::Classes(api.classes().await),
        SectionKind::MyClasses => Loaded::MyClasses(api.my_classes().await),
        SectionKind::Reports => Loaded::Reports(api.reports().await),
        SectionKind::MyReports => Loaded::MyReports(api.my_reports().await),
        SectionKind::PrlFeedbackReports => {
            Loaded::PrlFeedbackReports(api.prl_feedback_reports().await)
        }
        SectionKind::Users => Loaded::Users(api.users().await),
        SectionKind::Lecturers => Loaded::Lecturers(api.lecturers().await),
        SectionKind::Ratings => Loaded::Ratings(load_ratings(&api, &scope).await),
    }
}

// two steps: resolve the class ids in scope, then one ratings request per class
async fn load_ratings(api: &ApiClient, scope: &RatingScope) -> Result<FanOut<Rating>, ApiError> {
    let classes = match scope {
        RatingScope::Taught => api.my_classes().await?,
        _ => api.classes().await?,
    };
    let ids = match scope {
        RatingScope::Stream(stream) => {
            aggregate::class_ids(aggregate::classes_in_stream(&classes, stream))
        }
        _ => aggregate::class_ids(&classes),
    };
    Ok(fetch::ratings_for_classes(api, &ids).await)
}

/// A load running in the background, to be handed back to [`Dashboard::finish`].
#[derive(Debug)]
pub struct PendingLoad {
    pub ticket: Ticket,
    handle: JoinHandle<Loaded>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Modal {
    Report,
    Feedback,
    Rating,
    Course,
    Class,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forms {
    pub report: ReportForm,
    pub feedback: FeedbackForm,
    pub rating: RatingForm,
    pub course: CourseForm,
    pub class: ClassForm,
}

#[derive(Debug, Serialize)]
pub struct ReportRow<'a> {
    pub report: &'a Report,
    pub attendance: Attendance,
    pub status: ReviewStatus,
}

impl<'a> ReportRow<'a> {
    fn new(report: &'a Report, policy: &AttendancePolicy) -> ReportRow<'a> {
        ReportRow {
            report,
            attendance: policy.bucket_report(report),
            status: report.status(),
        }
    }
}

fn report_rows<'a>(reports: Vec<&'a Report>, policy: &AttendancePolicy) -> Vec<ReportRow<'a>> {
    reports.into_iter().map(|r| ReportRow::new(r, policy)).collect()
}

#[derive(Debug, Serialize)]
pub struct StreamOverview<'a> {
    pub prls: Vec<&'a User>,
    pub streams: Vec<&'a str>,
    pub courses_per_stream: BTreeMap<&'a str, usize>,
    pub assignments: Vec<(&'a str, &'a str)>,
    pub unassigned: usize,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "kebab-case")]
pub enum TabView<'a> {
    Courses(Vec<&'a Course>),
    Classes(Vec<&'a Class>),
    Reports(Vec<ReportRow<'a>>),
    Users(Vec<&'a User>),
    Ratings(Vec<&'a Rating>),
    Monitoring {
        classes: Vec<&'a Class>,
        reports: Vec<ReportRow<'a>>,
    },
    PrlManagement(StreamOverview<'a>),
}

impl TabView<'_> {
    pub fn len(&self) -> usize {
        match self {
            TabView::Courses(v) => v.len(),
            TabView::Classes(v) => v.len(),
            TabView::Reports(v) => v.len(),
            TabView::Users(v) => v.len(),
            TabView::Ratings(v) => v.len(),
            TabView::Monitoring { classes, reports } => classes.len() + reports.len(),
            TabView::PrlManagement(o) => o.prls.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
pub struct Dashboard {
    api: ApiClient,
    user: CurrentUser,
    config: &'static ViewConfig,
    sections: Sections,
    search: String,
    forms: Forms,
    modal: Option<Modal>,
    editing_course: Option<Id>,
    notices: Vec<Notice>,
    last_run: Option<Run>,
    export_timeout: Duration,
}

impl Dashboard {
    pub fn new(session: &Session) -> Result<Dashboard, SessionError> {
        let user = session.current_user().ok_or(SessionError::NotLoggedIn)?;
        Ok(Dashboard::for_user(session.api().clone(), user.clone()))
    }

    pub fn for_user(api: ApiClient, user: CurrentUser) -> Dashboard {
        Dashboard {
            api,
            config: view_config(user.role),
            user,
            sections: Sections::default(),
            search: String::new(),
            forms: Forms::default(),
            modal: None,
            editing_course: None,
            notices: Vec::new(),
            last_run: None,
            export_timeout: DEFAULT_EXPORT_TIMEOUT,
        }
    }

    pub fn with_export_timeout(mut self, timeout: Duration) -> Dashboard {
        self.export_timeout = timeout;
        self
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn config(&self) -> &'static ViewConfig {
        self.config
    }

    /// Stream the signed-in PRL sees; other roles get the same fallback.
    pub fn stream(&self) -> &str {
        aggregate::scope_stream(self.user.stream.as_deref())
    }

    fn rating_scope(&self) -> RatingScope {
        match self.user.role {
            Role::Prl => RatingScope::Stream(self.stream().to_string()),
            Role::Lecturer => RatingScope::Taught,
            Role::Pl | Role::Student => RatingScope::AllClasses,
        }
    }

    // --- loading ---

    /// Fetches every section the role shows, all at once.
    pub async fn mount(&mut self) {
        tracing::info!(role = %self.user.role, user = %self.user.name, "mounting dashboard");
        let sections = self.config.sections;
        self.refresh(sections).await;
    }

    /// Refetches the given sections concurrently. Each result is applied as
    /// soon as it arrives; a failed one leaves only its own section alone.
    pub async fn refresh(&mut self, kinds: &[SectionKind]) {
        let mut set = JoinSet::new();
        for &kind in kinds {
            let ticket = self.begin_load(kind);
            let api = self.api.clone();
            let scope = self.rating_scope();
            set.spawn(async move { (ticket, load(api, kind, scope).await) });
        }
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((ticket, loaded)) => {
                    self.apply(ticket, loaded);
                }
                Err(e) => tracing::error!(error = %e, "section load task failed"),
            }
        }
    }

    pub fn begin_load(&mut self, kind: SectionKind) -> Ticket {
        let generation = self.sections.generation_mut(kind);
        *generation += 1;
        Ticket {
            section: kind,
            generation: *generation,
        }
    }

    pub fn start_load(&mut self, kind: SectionKind) -> PendingLoad {
        let ticket = self.begin_load(kind);
        let handle = tokio::spawn(load(self.api.clone(), kind, self.rating_scope()));
        PendingLoad { ticket, handle }
    }

    pub async fn finish(&mut self, pending: PendingLoad) -> bool {
        match pending.handle.await {
            Ok(loaded) => self.apply(pending.ticket, loaded),
            Err(e) => {
                tracing::error!(error = %e, "section load task failed");
                false
            }
        }
    }

    /// Writes a load result into its section. Returns false, and changes
    /// nothing, when a newer load of that section was started since.
    pub fn apply(&mut self, ticket: Ticket, loaded: Loaded) -> bool {
        if ticket.section != loaded.kind() {
            tracing::error!(ticket = ?ticket.section, loaded = ?loaded.kind(), "load applied to wrong section");
            return false;
        }
        let current = *self.sections.generation_mut(ticket.section);
        if current != ticket.generation {
            tracing::debug!(
                section = ?ticket.section,
                stale = ticket.generation,
                current,
                "discarding superseded response"
            );
            return false;
        }

        let s = &mut self.sections;
        match loaded {
            Loaded::Courses(res) => s.courses.fill(SectionKind::Courses, res),
            Loaded::Classes(res) => s.classes.fill(SectionKind::Classes, res),
            Loaded::MyClasses(res) => s.my_classes.fill(SectionKind::MyClasses, res),
            Loaded::Reports(res) => s.reports.fill(SectionKind::Reports, res),
            Loaded::MyReports(res) => s.my_reports.fill(SectionKind::MyReports, res),
            Loaded::PrlFeedbackReports(res) => {
                s.prl_feedback_reports.fill(SectionKind::PrlFeedbackReports, res)
            }
            Loaded::Users(res) => s.users.fill(SectionKind::Users, res),
            Loaded::Lecturers(res) => s.lecturers.fill(SectionKind::Lecturers, res),
            Loaded::Ratings(res) => {
                let failures = res.as_ref().map(|f| f.failures.len()).unwrap_or(0);
                s.ratings.fill(SectionKind::Ratings, res.map(|f| f.items));
                if failures > 0 {
                    s.ratings.error = Some(format!("ratings for {} class(es) could not be loaded", failures));
                }
            }
        }
        true
    }

    pub fn courses(&self) -> &Section<Course> {
        &self.sections.courses
    }
    pub fn classes(&self) -> &Section<Class> {
        &self.sections.classes
    }
    pub fn my_classes(&self) -> &Section<Class> {
        &self.sections.my_classes
    }
    pub fn reports(&self) -> &Section<Report> {
        &self.sections.reports
    }
    pub fn my_reports(&self) -> &Section<Report> {
        &self.sections.my_reports
    }
    pub fn prl_feedback_reports(&self) -> &Section<Report> {
        &self.sections.prl_feedback_reports
    }
    pub fn users(&self) -> &Section<User> {
        &self.sections.users
    }
    pub fn lecturers(&self) -> &Section<User> {
        &self.sections.lecturers
    }
    pub fn ratings(&self) -> &Section<Rating> {
        &self.sections.ratings
    }

    // --- search & views ---

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Rows of one tab, narrowed by the search term. `None` when the role
    /// does not show that tab.
    pub fn tab(&self, tab: Tab) -> Option<TabView<'_>> {
        if !self.config.shows(tab) {
            return None;
        }
        let s = &self.sections;
        let term = self.search.as_str();
        let rows = |reports| report_rows(reports, &REPORT_ATTENDANCE);

        let view = match tab {
            Tab::Courses => TabView::Courses(filter(&s.courses.items, term, filter::PL_COURSE_FIELDS)),
            Tab::StreamCourses => TabView::Courses(filter(
                aggregate::courses_in_stream(&s.courses.items, self.stream()),
                term,
                filter::STREAM_COURSE_FIELDS,
            )),
            Tab::Classes => TabView::Classes(filter(&s.classes.items, term, filter::CLASS_FIELDS)),
            Tab::StreamClasses => TabView::Classes(filter(
                aggregate::classes_in_stream(&s.classes.items, self.stream()),
                term,
                filter::CLASS_FIELDS,
            )),
            Tab::MyClasses => TabView::Classes(filter(&s.my_classes.items, term, filter::CLASS_FIELDS)),
            // every row, pending ones included; `status` tells them apart
            Tab::PrlReports => TabView::Reports(report_rows(
                s.prl_feedback_reports.items.iter().collect(),
                &PRL_REPORTS_ATTENDANCE,
            )),
            Tab::StreamReports => TabView::Reports(rows(filter(
                aggregate::reports_in_stream(&s.reports.items, self.stream()),
                term,
                filter::OVERSIGHT_REPORT_FIELDS,
            ))),
            Tab::MyReports => {
                TabView::Reports(rows(filter(&s.my_reports.items, term, filter::MY_REPORT_FIELDS)))
            }
            Tab::Monitoring => match self.user.role {
                Role::Pl | Role::Prl => TabView::Reports(rows(filter(
                    &s.reports.items,
                    term,
                    filter::OVERSIGHT_REPORT_FIELDS,
                ))),
                Role::Lecturer => TabView::Reports(rows(filter(
                    &s.reports.items,
                    term,
                    filter::MONITORING_REPORT_FIELDS,
                ))),
                Role::Student => TabView::Monitoring {
                    classes: filter(&s.classes.items, term, filter::CLASS_FIELDS),
                    reports: rows(filter(&s.reports.items, term, filter::MONITORING_REPORT_FIELDS)),
                },
            },
            Tab::Lectures => TabView::Users(filter(
                aggregate::users_with_role(&s.users.items, Role::Lecturer),
                term,
                filter::LECTURER_FIELDS,
            )),
            Tab::Ratings => TabView::Ratings(filter(&s.ratings.items, term, filter::RATING_FIELDS)),
            Tab::MyRatings => TabView::Ratings(aggregate::ratings_by(&s.ratings.items, self.user.id)),
            Tab::PrlManagement => TabView::PrlManagement(StreamOverview {
                prls: filter(
                    aggregate::users_with_role(&s.users.items, Role::Prl),
                    term,
                    filter::PRL_FIELDS,
                ),
                streams: aggregate::streams_used(&s.courses.items),
                courses_per_stream: aggregate::courses_per_stream(&s.courses.items),
                assignments: aggregate::prl_assignments(&s.users.items),
                unassigned: aggregate::unassigned_prls(&s.users.items).len(),
            }),
        };
        Some(view)
    }

    // --- notices & form state ---

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn last_run(&self) -> Option<&Run> {
        self.last_run.as_ref()
    }

    pub fn modal(&self) -> Option<Modal> {
        self.modal
    }

    pub fn editing_course(&self) -> Option<Id> {
        self.editing_course
    }

    pub fn forms(&self) -> &Forms {
        &self.forms
    }

    pub fn forms_mut(&mut self) -> &mut Forms {
        &mut self.forms
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
        self.editing_course = None;
    }

    fn reset_after(&mut self, workflow: Workflow) {
        self.modal = None;
        match workflow {
            Workflow::SubmitReport => self.forms.report = ReportForm::default(),
            Workflow::AddFeedback => self.forms.feedback = FeedbackForm::default(),
            Workflow::SubmitRating => self.forms.rating = RatingForm::default(),
            Workflow::CreateCourse | Workflow::UpdateCourse => {
                self.forms.course = CourseForm::default();
                self.editing_course = None;
            }
            Workflow::CreateClass => self.forms.class = ClassForm::default(),
            Workflow::DeleteCourse
            | Workflow::AssignLecturer
            | Workflow::AssignPrlStream
            | Workflow::ExportReports => {}
        }
    }

    // --- workflows ---

    async fn execute<Fut>(&mut self, workflow: Workflow, request: Result<Fut, FormError>) -> Outcome
    where
        Fut: Future<Output = Result<(), ApiError>>,
    {
        let mut run = Run::start(workflow);
        run.advance(Phase::Validating);

        // a rejected form never builds its request, so nothing is sent
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(%workflow, error = %e, "form rejected");
                run.advance(Phase::Rejected);
                self.notify(Notice::rejected(&e));
                run.advance(Phase::Idle);
                self.last_run = Some(run);
                return Outcome::Rejected(e);
            }
        };

        run.advance(Phase::Submitting);
        let outcome = match request.await {
            Ok(()) => {
                run.advance(Phase::Succeeded);
                tracing::info!(%workflow, "mutation succeeded");
                self.notify(Notice::success(workflow));
                self.reset_after(workflow);
                self.refresh(workflow.refreshes()).await;
                Outcome::Succeeded
            }
            Err(e) => {
                run.advance(Phase::Failed);
                tracing::error!(%workflow, error = %e, "mutation failed");
                self.notify(Notice::failed(workflow, &e));
                Outcome::Failed(e)
            }
        };
        run.advance(Phase::Idle);
        self.last_run = Some(run);
        outcome
    }

    fn allows(&self, workflow: Workflow) -> bool {
        let ok = self.config.exposes(workflow);
        if !ok {
            tracing::warn!(%workflow, role = %self.user.role, "workflow not available for role");
        }
        ok
    }

    /// Opens the report form for one of the lecturer's classes.
    pub fn open_report(&mut self, class_id: Id) -> bool {
        let Some(class) = self.sections.my_classes.items.iter().find(|c| c.id == class_id) else {
            return false;
        };
        self.forms.report = ReportForm::for_class(class);
        self.modal = Some(Modal::Report);
        true
    }

    pub async fn submit_report(&mut self) -> Outcome {
        if !self.allows(Workflow::SubmitReport) {
            return Outcome::Unavailable;
        }
        let api = self.api.clone();
        let request = self
            .forms
            .report
            .validate()
            .map(move |body| async move { api.submit_report(&body).await });
        self.execute(Workflow::SubmitReport, request).await
    }

    // feedback is only given on reports of the PRL's own stream
    fn stream_report(&self, report_id: Id) -> Option<&Report> {
        aggregate::reports_in_stream(&self.sections.reports.items, self.stream())
            .into_iter()
            .find(|r| r.id == report_id)
    }

    pub fn open_feedback(&mut self, report_id: Id) -> bool {
        let Some(report) = self.stream_report(report_id) else {
            return false;
        };
        // one feedback per report
        if report.is_reviewed() {
            return false;
        }
        self.forms.feedback = FeedbackForm::for_report(report);
        self.modal = Some(Modal::Feedback);
        true
    }

    fn feedback_request(&self) -> Result<NewFeedback, FormError> {
        let body = self.forms.feedback.validate()?;
        let Some(report) = self.stream_report(body.report_id) else {
            return Err(FormError::Invalid {
                field: "report",
                reason: format!("report {} is not in the {} stream", body.report_id, self.stream()),
            });
        };
        if report.is_reviewed() {
            return Err(FormError::Invalid {
                field: "report",
                reason: "feedback has already been added".into(),
            });
        }
        Ok(body)
    }

    pub async fn submit_feedback(&mut self) -> Outcome {
        if !self.allows(Workflow::AddFeedback) {
            return Outcome::Unavailable;
        }
        let api = self.api.clone();
        let request = self
            .feedback_request()
            .map(move |body| async move { api.add_feedback(&body).await });
        self.execute(Workflow::AddFeedback, request).await
    }

    pub fn open_rating(&mut self, class_id: Id) -> bool {
        let Some(class) = self.sections.classes.items.iter().find(|c| c.id == class_id) else {
            return false;
        };
        self.forms.rating = RatingForm::for_class(class);
        self.modal = Some(Modal::Rating);
        true
    }

    pub async fn submit_rating(&mut self) -> Outcome {
        if !self.allows(Workflow::SubmitRating) {
            return Outcome::Unavailable;
        }
        let api = self.api.clone();
        let request = self
            .forms
            .rating
            .validate()
            .map(move |body| async move { api.submit_rating(&body).await });
        self.execute(Workflow::SubmitRating, request).await
    }

    pub fn new_course(&mut self) {
        self.editing_course = None;
        self.forms.course = CourseForm::default();
        self.modal = Some(Modal::Course);
    }

    pub fn edit_course(&mut self, course_id: Id) -> bool {
        let Some(course) = self.sections.courses.items.iter().find(|c| c.id == course_id) else {
            return false;
        };
        self.forms.course = CourseForm::from_course(course);
        self.editing_course = Some(course_id);
        self.modal = Some(Modal::Course);
        true
    }

    /// Creates a course, or updates the one opened with [`Dashboard::edit_course`].
    pub async fn save_course(&mut self) -> Outcome {
        let editing = self.editing_course;
        let workflow = if editing.is_some() {
            Workflow::UpdateCourse
        } else {
            Workflow::CreateCourse
        };
        if !self.allows(workflow) {
            return Outcome::Unavailable;
        }
        let api = self.api.clone();
        let request = self.forms.course.validate().map(move |body| async move {
            match editing {
                Some(id) => api.update_course(id, &body).await,
                None => api.create_course(&body).await,
            }
        });
        self.execute(workflow, request).await
    }

    pub async fn delete_course(&mut self, course_id: Id, confirm: &mut impl Confirm) -> Outcome {
        if !self.allows(Workflow::DeleteCourse) {
            return Outcome::Unavailable;
        }
        if !confirm.confirm(&DELETE_COURSE_PROMPT) {
            tracing::info!(course_id, "course deletion declined");
            return Outcome::Declined;
        }
        let api = self.api.clone();
        self.execute(
            Workflow::DeleteCourse,
            Ok(async move { api.delete_course(course_id).await }),
        )
        .await
    }

    pub fn open_class_form(&mut self) {
        self.forms.class = ClassForm::default();
        self.modal = Some(Modal::Class);
    }

    pub async fn create_class(&mut self) -> Outcome {
        if !self.allows(Workflow::CreateClass) {
            return Outcome::Unavailable;
        }
        let api = self.api.clone();
        let request = self
            .forms
            .class
            .validate()
            .map(move |body| async move { api.create_class(&body).await });
        self.execute(Workflow::CreateClass, request).await
    }

    pub async fn assign_lecturer(&mut self, course_id: Id, lecturer_id: Option<Id>) -> Outcome {
        if !self.allows(Workflow::AssignLecturer) {
            return Outcome::Unavailable;
        }
        let api = self.api.clone();
        let request = validate_assignment(Some(course_id), lecturer_id)
            .map(move |body| async move { api.assign_lecturer(&body).await });
        self.execute(Workflow::AssignLecturer, request).await
    }

    pub async fn assign_prl_stream(&mut self, prl_id: Id, stream: &str) -> Outcome {
        if !self.allows(Workflow::AssignPrlStream) {
            return Outcome::Unavailable;
        }
        let api = self.api.clone();
        let request = validate_stream(stream)
            .map(str::to_string)
            .map(move |stream| async move { api.assign_stream(prl_id, &stream).await });
        self.execute(Workflow::AssignPrlStream, request).await
    }

    /// Saves the backend's spreadsheet of all reports into `dir`.
    pub async fn export_reports(&mut self, dir: &Path) -> Result<PathBuf, ExportError> {
        let workflow = Workflow::ExportReports;
        if !self.allows(workflow) {
            return Err(ExportError::Unavailable);
        }
        let mut run = Run::start(workflow);
        run.advance(Phase::Validating);
        run.advance(Phase::Submitting);
        let res = export::download_reports(&self.api, dir, self.export_timeout).await;
        match &res {
            Ok(_) => {
                run.advance(Phase::Succeeded);
                self.notify(Notice::success(workflow));
            }
            Err(ExportError::Api(e)) => {
                run.advance(Phase::Failed);
                tracing::error!(error = %e, "report export failed");
                self.notify(Notice::failed(workflow, e));
            }
            Err(e) => {
                run.advance(Phase::Failed);
                tracing::error!(error = %e, "report export failed");
                self.notify(Notice {
                    level: Level::Error,
                    title: "Error!",
                    message: workflow.generic_error().to_string(),
                });
            }
        }
        run.advance(Phase::Idle);
        self.last_run = Some(run);
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dashboard(role: Role, stream: Option<&str>) -> Dashboard {
        Dashboard::for_user(
            ApiClient::new("http://127.0.0.1:9"),
            CurrentUser {
                id: 7,
                name: "Test User".into(),
                role,
                stream: stream.map(String::from),
            },
        )
    }

    fn courses() -> Vec<Course> {
        serde_json::from_value(json!([
            {"id": 1, "courseCode": "DS101", "courseName": "Statistics", "stream": "Data Science"},
            {"id": 2, "courseCode": "NW101", "courseName": "Routing", "stream": "Networking"},
            {"id": 3, "courseCode": "SD101", "courseName": "Web Dev", "stream": "Software Development"}
        ]))
        .unwrap()
    }

    #[test]
    fn superseded_response_is_discarded() {
        let mut d = dashboard(Role::Pl, None);
        let first = d.begin_load(SectionKind::Courses);
        let second = d.begin_load(SectionKind::Courses);

        assert!(d.apply(second, Loaded::Courses(Ok(courses()))));
        // the older request lands late and must not overwrite the newer data
        assert!(!d.apply(first, Loaded::Courses(Ok(Vec::new()))));
        assert_eq!(d.courses().items().len(), 3);
    }

    #[test]
    fn ticket_only_fits_its_own_section() {
        let mut d = dashboard(Role::Pl, None);
        let t = d.begin_load(SectionKind::Classes);
        assert!(!d.apply(t, Loaded::Courses(Ok(courses()))));
        assert!(d.courses().items().is_empty());
    }

    #[test]
    fn failed_fetch_keeps_section_empty_and_records_error() {
        let mut d = dashboard(Role::Pl, None);
        let t = d.begin_load(SectionKind::Users);
        let err = ApiError::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert!(d.apply(t, Loaded::Users(Err(err))));
        assert!(d.users().is_loaded());
        assert!(d.users().items().is_empty());
        assert!(d.users().error().is_some());
    }

    #[test]
    fn unassigned_prl_sees_software_development() {
        let mut d = dashboard(Role::Prl, None);
        let t = d.begin_load(SectionKind::Courses);
        d.apply(t, Loaded::Courses(Ok(courses())));
        match d.tab(Tab::StreamCourses) {
            Some(TabView::Courses(rows)) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].stream, "Software Development");
            }
            other => panic!("unexpected view {:?}", other),
        }
        assert!(d.tab(Tab::Courses).is_none());
    }

    #[test]
    fn search_narrows_tab_rows() {
        let mut d = dashboard(Role::Pl, None);
        let t = d.begin_load(SectionKind::Courses);
        d.apply(t, Loaded::Courses(Ok(courses())));
        d.set_search("network");
        // PL course search includes the stream
        assert_eq!(d.tab(Tab::Courses).map(|v| v.len()), Some(1));
        d.set_search("");
        assert_eq!(d.tab(Tab::Courses).map(|v| v.len()), Some(3));
    }

    #[test]
    fn student_sees_only_own_ratings() {
        let mut d = dashboard(Role::Student, None);
        let t = d.begin_load(SectionKind::Ratings);
        let ratings: Vec<Rating> = serde_json::from_value(json!([
            {"id": 1, "rating": 4, "User": {"id": 7, "name": "Me"}},
            {"id": 2, "rating": 2, "User": {"id": 8, "name": "Someone"}}
        ]))
        .unwrap();
        d.apply(t, Loaded::Ratings(Ok(FanOut { items: ratings, failures: Vec::new() })));
        match d.tab(Tab::MyRatings) {
            Some(TabView::Ratings(rows)) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].id, 1);
            }
            other => panic!("unexpected view {:?}", other),
        }
    }

    #[test]
    fn prl_reports_tab_uses_its_own_attendance_policy() {
        let mut d = dashboard(Role::Pl, None);
        let t = d.begin_load(SectionKind::PrlFeedbackReports);
        let reports: Vec<Report> = serde_json::from_value(json!([
            {"id": 1, "actualStudentsPresent": 75, "Class": {"id": 1, "totalStudents": 100},
             "Feedbacks": [{"id": 1, "feedback": "ok"}]},
            {"id": 2, "actualStudentsPresent": 50, "Class": {"id": 1, "totalStudents": 100}},
            {"id": 3, "actualStudentsPresent": 5}
        ]))
        .unwrap();
        d.apply(t, Loaded::PrlFeedbackReports(Ok(reports)));
        match d.tab(Tab::PrlReports) {
            Some(TabView::Reports(rows)) => {
                // pending rows stay listed
                assert_eq!(rows.len(), 3);
                // 75% is high against 0.7, it would only be medium against 0.8
                assert_eq!(rows[0].attendance, Attendance::High);
                assert_eq!(rows[0].status, ReviewStatus::Reviewed);
                // this view has no low bucket
                assert_eq!(rows[1].attendance, Attendance::Medium);
                assert_eq!(rows[1].status, ReviewStatus::Pending);
                assert_eq!(rows[2].attendance, Attendance::Medium);
            }
            other => panic!("unexpected view {:?}", other),
        }
    }

    #[tokio::test]
    async fn rejected_form_sends_nothing_and_keeps_values() {
        // the client points at a closed port: a request would fail, not reject
        let mut d = dashboard(Role::Lecturer, None);
        d.forms_mut().report = ReportForm {
            class_id: Some(1),
            class_size: Some(30),
            week_of_reporting: "Week 2".into(),
            date_of_lecture: "2024-02-08".into(),
            actual_students_present: "20".into(),
            topic_taught: String::new(),
            learning_outcomes: "x".into(),
            recommendations: "y".into(),
        };
        let outcome = d.submit_report().await;
        assert!(matches!(outcome, Outcome::Rejected(FormError::Missing("topic taught"))));
        assert_eq!(d.forms().report.week_of_reporting, "Week 2");
        assert_eq!(
            d.last_run().unwrap().trail(),
            &[Phase::Idle, Phase::Validating, Phase::Rejected, Phase::Idle]
        );
        assert_eq!(d.notices()[0].level, Level::Error);
    }

    #[tokio::test]
    async fn role_without_workflow_gets_unavailable() {
        let mut d = dashboard(Role::Student, None);
        let mut never = |_: &Prompt| -> bool { panic!("must not prompt") };
        assert!(matches!(d.delete_course(1, &mut never).await, Outcome::Unavailable));
        assert!(matches!(d.submit_report().await, Outcome::Unavailable));
    }
}
