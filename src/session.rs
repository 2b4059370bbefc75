use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::config::Credentials;
use crate::error::SessionError;
use crate::models::{Id, Role, User};

pub const LOGIN: &str = "/auth/login";
pub const ME: &str = "/auth/me";

/// The signed-in user as the dashboards see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: Id,
    pub name: String,
    pub role: Role,
    pub stream: Option<String>,
}

impl TryFrom<User> for CurrentUser {
    type Error = SessionError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        let role = user
            .role()
            .ok_or_else(|| SessionError::UnknownRole(user.role.clone()))?;
        Ok(CurrentUser {
            id: user.id,
            name: user.name,
            role,
            stream: user.stream,
        })
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    user: User,
}

/// Auth context handed to dashboards. Created once on start-up and torn
/// down by [`Session::logout`].
#[derive(Debug)]
pub struct Session {
    api: ApiClient,
    user: Option<CurrentUser>,
}

impl Session {
    pub fn anonymous(api: ApiClient) -> Session {
        Session { api, user: None }
    }

    /// Signs in with whatever the configuration carries: an existing token
    /// is checked against the backend, an email/password pair logs in.
    pub async fn init(api: ApiClient, credentials: &Credentials) -> Result<Session, SessionError> {
        match credentials {
            Credentials::Token(token) => {
                let session = Session::restore(api.with_token(token.clone())).await;
                if session.is_authenticated() {
                    Ok(session)
                } else {
                    Err(SessionError::NotLoggedIn)
                }
            }
            Credentials::Login { email, password } => {
                let mut session = Session::anonymous(api);
                session.login(email, password).await?;
                Ok(session)
            }
        }
    }

    /// Attempts to pick up a session from the client's token. Any failure
    /// leaves the session signed out.
    pub async fn restore(api: ApiClient) -> Session {
        let mut session = Session::anonymous(api);
        if !session.api.has_token() {
            return session;
        }
        match fetch_me(&session.api).await {
            Ok(user) => {
                tracing::info!(user = %user.name, role = %user.role, "session restored");
                session.user = Some(user);
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not restore session");
                session.api.set_token(None);
            }
        }
        session
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<&CurrentUser, SessionError> {
        let res: LoginResponse = self
            .api
            .post_json_for(LOGIN, &LoginRequest { email, password })
            .await?;
        let user = CurrentUser::try_from(res.user)?;
        tracing::info!(user = %user.name, role = %user.role, "logged in");
        self.api.set_token(Some(res.token));
        Ok(&*self.user.insert(user))
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::info!(user = %user.name, "logged out");
        }
        self.api.set_token(None);
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

async fn fetch_me(api: &ApiClient) -> Result<CurrentUser, SessionError> {
    let user: User = api.get_json(ME).await?;
    CurrentUser::try_from(user)
}
