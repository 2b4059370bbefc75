mod common;

use common::Backend;
use luct_dashboard::models::Role;
use luct_dashboard::{view, Access, ApiError, Credentials, Session, SessionError};

#[tokio::test]
async fn login_sets_user_and_token() {
    let backend = Backend::start().await;
    let session = backend.login("prl@luct.ac.ls").await;

    let user = session.current_user().expect("user");
    assert_eq!(user.role, Role::Prl);
    assert_eq!(user.stream, None);
    assert!(session.api().has_token());
    assert!(matches!(
        view::resolve(session.current_user()),
        Access::Dashboard(Role::Prl, _)
    ));
}

#[tokio::test]
async fn bad_password_surfaces_backend_message() {
    let backend = Backend::start().await;
    let mut session = Session::anonymous(backend.client());

    let err = session
        .login("pl@luct.ac.ls", "wrong")
        .await
        .expect_err("login must fail");
    match err {
        SessionError::Api(e @ ApiError::Auth { .. }) => {
            assert_eq!(e.server_message(), Some("Invalid credentials"));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(!session.is_authenticated());
    assert_eq!(view::resolve(session.current_user()), Access::Unauthenticated);
}

#[tokio::test]
async fn token_restores_session() {
    let backend = Backend::start().await;

    let session = Session::restore(backend.client().with_token("tok-10")).await;
    let user = session.current_user().expect("restored");
    assert_eq!(user.name, "Lee Turner");
    assert_eq!(user.role, Role::Lecturer);
    assert_eq!(
        backend.requests(),
        vec!["GET /api/auth/me".to_string()]
    );
}

#[tokio::test]
async fn stale_token_leaves_session_signed_out() {
    let backend = Backend::start().await;

    let session = Session::restore(backend.client().with_token("tok-999")).await;
    assert!(!session.is_authenticated());
    assert!(!session.api().has_token());

    let err = Session::init(backend.client(), &Credentials::Token("tok-999".into()))
        .await
        .expect_err("init must fail");
    assert!(matches!(err, SessionError::NotLoggedIn));
}

#[tokio::test]
async fn logout_then_nothing_is_mounted() {
    let backend = Backend::start().await;
    let mut session = backend.login("student@luct.ac.ls").await;
    session.logout();

    assert!(session.current_user().is_none());
    assert!(matches!(
        luct_dashboard::Dashboard::new(&session),
        Err(SessionError::NotLoggedIn)
    ));
}
