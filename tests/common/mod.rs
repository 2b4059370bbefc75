#![allow(dead_code)]

use axum::extract::{Path, Request, State};
use axum::middleware::{from_fn_with_state, Next};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use luct_dashboard::{ApiClient, Credentials, Session};

pub const PASSWORD: &str = "secret";

pub type Log = Arc<Mutex<Vec<String>>>;

/// In-process stand-in for the reporting backend. Every request is
/// recorded as "METHOD /path" before it is answered.
pub struct Backend {
    pub base: String,
    log: Log,
}

impl Backend {
    pub async fn start() -> Backend {
        let log = Log::default();
        let app = Router::new().nest("/api", api()).layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn_with_state(log.clone(), record)),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve mock") });
        Backend {
            base: format!("http://{}/api", addr),
            log,
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.base)
    }

    pub async fn login(&self, email: &str) -> Session {
        let credentials = Credentials::Login {
            email: email.into(),
            password: PASSWORD.into(),
        };
        Session::init(self.client(), &credentials).await.expect("login")
    }

    pub fn requests(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}

async fn record(State(log): State<Log>, req: Request, next: Next) -> Response {
    log.lock()
        .unwrap()
        .push(format!("{} {}", req.method(), req.uri().path()));
    next.run(req).await
}

fn api() -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/courses", get(|| async { Json(courses()) }).post(created))
        .route("/courses/assign-lecturer", post(ok))
        .route("/courses/:id", put(ok).delete(ok))
        .route("/users", get(|| async { Json(users()) }))
        .route(
            "/users/lecturers",
            get(|| async { Json(json!([users()[3].clone()])) }),
        )
        .route(
            "/users/my-classes",
            get(|| async { Json(json!([classes()[0].clone()])) }),
        )
        .route("/users/:id", put(ok))
        .route("/classes", get(|| async { Json(classes()) }).post(created))
        .route("/reports", get(|| async { Json(reports()) }).post(submit_report))
        .route(
            "/reports/my-reports",
            get(|| async { Json(json!([reports()[0].clone()])) }),
        )
        .route(
            "/reports/prl-feedback",
            get(|| async { Json(json!([reports()[0].clone(), reports()[2].clone()])) }),
        )
        .route("/reports/feedback", post(created))
        .route(
            "/reports/export-excel",
            get(|| async {
                (
                    [(CONTENT_TYPE, "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")],
                    b"PK\x03\x04 mock workbook".to_vec(),
                )
            }),
        )
        .route("/ratings", post(created))
        .route("/ratings/class/:id", get(class_ratings))
}

async fn ok() -> StatusCode {
    StatusCode::OK
}

async fn created() -> StatusCode {
    StatusCode::CREATED
}

async fn login(Json(body): Json<Value>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let user = users()
        .as_array()
        .and_then(|all| all.iter().find(|u| u["email"] == body["email"]).cloned());
    match user {
        Some(user) if body["password"] == PASSWORD => Ok(Json(json!({
            "token": format!("tok-{}", user["id"]),
            "user": user,
        }))),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid credentials"})),
        )),
    }
}

async fn me(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer tok-"))
        .ok_or(StatusCode::UNAUTHORIZED)?;
    users()
        .as_array()
        .and_then(|all| all.iter().find(|u| u["id"].to_string() == token).cloned())
        .map(Json)
        .ok_or(StatusCode::UNAUTHORIZED)
}

async fn submit_report(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["weekOfReporting"] == "Week 1" {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Report already exists for this week"})),
        )
    } else if body["weekOfReporting"] == "Week 3" {
        // rejected without the usual message body
        (StatusCode::BAD_REQUEST, Json(json!({})))
    } else {
        (StatusCode::CREATED, Json(json!({"id": 99})))
    }
}

// class 2 is broken on purpose so fan-outs see one failing sub-fetch
async fn class_ratings(Path(id): Path<i64>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match id {
        1 => Ok(Json(json!([
            {"id": 1, "classId": 1, "rating": 5, "comment": "Great", "User": {"id": 40, "name": "Sam Student"}},
            {"id": 2, "classId": 1, "rating": 3, "comment": "", "User": {"id": 41, "name": "Tia Student"}}
        ]))),
        2 => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "ratings store unavailable"})),
        )),
        3 => Ok(Json(json!([
            {"id": 3, "classId": 3, "rating": 4, "User": {"id": 40, "name": "Sam Student"}}
        ]))),
        _ => Ok(Json(json!([]))),
    }
}

pub fn users() -> Value {
    json!([
        {"id": 1, "name": "Pat Leader", "email": "pl@luct.ac.ls", "role": "pl"},
        {"id": 2, "name": "Pru Unassigned", "email": "prl@luct.ac.ls", "role": "prl", "stream": null},
        {"id": 3, "name": "Dee Science", "email": "prl.ds@luct.ac.ls", "role": "prl", "stream": "Data Science"},
        {"id": 10, "name": "Lee Turner", "email": "lecturer@luct.ac.ls", "role": "lecturer"},
        {"id": 40, "name": "Sam Student", "email": "student@luct.ac.ls", "role": "student"}
    ])
}

pub fn courses() -> Value {
    json!([
        {"id": 1, "courseCode": "SD101", "courseName": "Web Development", "stream": "Software Development",
         "lecturerId": 10, "Lecturer": {"id": 10, "name": "Lee Turner", "role": "lecturer"}},
        {"id": 2, "courseCode": "DS201", "courseName": "Statistics", "stream": "Data Science"},
        {"id": 3, "courseCode": "NW301", "courseName": "Networks", "stream": "Networking"}
    ])
}

pub fn classes() -> Value {
    let c = courses();
    json!([
        {"id": 1, "className": "SD-A", "venue": "Hall 1", "scheduledTime": "Mon 08:00", "totalStudents": 40,
         "courseId": 1, "lecturerId": 10, "Course": c[0]},
        {"id": 2, "className": "DS-A", "venue": "Lab 2", "scheduledTime": "Tue 10:00", "totalStudents": 30,
         "courseId": 2, "Course": c[1]},
        {"id": 3, "className": "NW-A", "venue": "Lab 3", "scheduledTime": "Wed 14:00", "totalStudents": 20,
         "courseId": 3, "Course": c[2]}
    ])
}

pub fn reports() -> Value {
    let cl = classes();
    json!([
        {"id": 1, "classId": 1, "lecturerId": 10, "weekOfReporting": "Week 1", "dateOfLecture": "2024-02-05",
         "actualStudentsPresent": 36, "topicTaught": "HTML basics", "learningOutcomes": "Markup",
         "recommendations": "More labs", "Class": cl[0], "User": {"id": 10, "name": "Lee Turner"},
         "Feedbacks": [{"id": 1, "reportId": 1, "feedback": "Well done"}]},
        {"id": 2, "classId": 2, "lecturerId": 10, "weekOfReporting": "Week 1", "dateOfLecture": "2024-02-06",
         "actualStudentsPresent": 10, "topicTaught": "Distributions", "learningOutcomes": "Normal curve",
         "recommendations": "Revise", "Class": cl[1], "User": {"id": 10, "name": "Lee Turner"},
         "Feedbacks": []},
        {"id": 3, "classId": 1, "lecturerId": 10, "weekOfReporting": "Week 2", "dateOfLecture": "2024-02-12",
         "actualStudentsPresent": 20, "topicTaught": "CSS layout", "learningOutcomes": "Flexbox",
         "recommendations": "Pair work", "Class": cl[0], "User": {"id": 10, "name": "Lee Turner"},
         "Feedbacks": []}
    ])
}
