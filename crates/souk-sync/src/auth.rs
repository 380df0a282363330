//! # Remote Authentication
//!
//! Email/password auth against the service's `/auth/v1` API.
//!
//! ## Session Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  sign_in(email, password)                                              │
//! │       │  POST /auth/v1/token?grant_type=password                       │
//! │       ▼                                                                 │
//! │  Session stored on the BackendClient ──► later data requests use its   │
//! │       │                                   access token as bearer        │
//! │       ▼                                                                 │
//! │  AuthEvent::SignedIn ──► every subscribe() receiver                    │
//! │                                                                         │
//! │  sign_out()                                                            │
//! │       │  POST /auth/v1/logout                                          │
//! │       ▼                                                                 │
//! │  Session cleared ──► AuthEvent::SignedOut                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The local store is not touched here. After a sign-in the caller passes
//! the user on, e.g. `store.login(user.into())`.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::client::BackendClient;
use crate::error::{SyncError, SyncResult};
use crate::types::{AuthEvent, RemoteUser, Session, SignUpOutcome};

/// Auth operations the app needs, independent of the service behind them.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Registers a user. `metadata` is stored with the account (e.g. `name`).
    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> SyncResult<SignUpOutcome>;

    async fn sign_in(&self, email: &str, password: &str) -> SyncResult<Session>;

    async fn sign_out(&self) -> SyncResult<()>;

    /// The signed-in user as the service currently reports it.
    async fn current_user(&self) -> SyncResult<RemoteUser>;

    /// The locally held session, if any. No request is made.
    async fn session(&self) -> Option<Session>;

    /// Session changes from this point on.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

/// [`AuthProvider`] backed by the data service's auth API.
#[derive(Debug, Clone)]
pub struct RemoteAuth {
    client: BackendClient,
}

impl RemoteAuth {
    pub(crate) fn new(client: BackendClient) -> Self {
        RemoteAuth { client }
    }

    async fn start_session(&self, session: Session) {
        info!(user_id = %session.user.id, "Signed in");
        let user = session.user.clone();
        self.client.set_session(Some(session)).await;
        self.client.publish(AuthEvent::SignedIn(user));
    }
}

#[async_trait]
impl AuthProvider for RemoteAuth {
    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> SyncResult<SignUpOutcome> {
        let request = self
            .client
            .request_with_token(Method::POST, "auth/v1/signup", &self.client.config().api_key)?
            .json(&json!({ "email": email, "password": password, "data": metadata }));

        let body: Value = BackendClient::send(request).await?;

        // With auto-confirm the service answers with a session, otherwise
        // with the bare user.
        if body.get("access_token").is_some() {
            let session: Session = serde_json::from_value(body)
                .map_err(|e| SyncError::InvalidResponse(e.to_string()))?;
            let user = session.user.clone();
            self.start_session(session.clone()).await;
            return Ok(SignUpOutcome {
                user,
                session: Some(session),
            });
        }

        let user: RemoteUser =
            serde_json::from_value(body).map_err(|e| SyncError::InvalidResponse(e.to_string()))?;
        debug!(user_id = %user.id, "Signed up, awaiting confirmation");
        Ok(SignUpOutcome { user, session: None })
    }

    async fn sign_in(&self, email: &str, password: &str) -> SyncResult<Session> {
        let request = self
            .client
            .request_with_token(Method::POST, "auth/v1/token", &self.client.config().api_key)?
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));

        let session: Session = BackendClient::send(request).await?;
        self.start_session(session.clone()).await;
        Ok(session)
    }

    /// Revokes the session on the service and forgets it locally. The local
    /// session is cleared even when the revoke fails; that failure is still
    /// returned.
    async fn sign_out(&self) -> SyncResult<()> {
        let Some(session) = self.client.current_session().await else {
            return Ok(());
        };

        let result = match self.client.request_with_token(
            Method::POST,
            "auth/v1/logout",
            &session.access_token,
        ) {
            Ok(request) => BackendClient::send_empty(request).await,
            Err(e) => Err(e),
        };

        self.client.set_session(None).await;
        self.client.publish(AuthEvent::SignedOut);
        info!(user_id = %session.user.id, "Signed out");

        result
    }

    async fn current_user(&self) -> SyncResult<RemoteUser> {
        let session = self.client.current_session().await.ok_or(SyncError::NotSignedIn)?;

        let request =
            self.client
                .request_with_token(Method::GET, "auth/v1/user", &session.access_token)?;

        BackendClient::send(request).await
    }

    async fn session(&self) -> Option<Session> {
        self.client.current_session().await
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.client.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, sample_customer, sample_session, sample_user, Recorded};
    use axum::extract::RawQuery;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use souk_core::UserProfile;

    fn auth_router(recorded: Recorded) -> Router {
        let token = recorded.clone();
        let logout = recorded.clone();
        let user = recorded.clone();
        let customers = recorded;

        Router::new()
            .route(
                "/auth/v1/token",
                post(move |RawQuery(query): RawQuery, headers: HeaderMap, body: String| {
                    let token = token.clone();
                    async move {
                        token.push("POST token", query.unwrap_or_default(), &headers, &body);
                        let creds: Value = serde_json::from_str(&body).unwrap_or_default();
                        if creds["password"] == "correct horse" {
                            (StatusCode::OK, Json(sample_session()))
                        } else {
                            (
                                StatusCode::BAD_REQUEST,
                                Json(json!({ "error_description": "Invalid login credentials" })),
                            )
                        }
                    }
                }),
            )
            .route(
                "/auth/v1/logout",
                post(move |headers: HeaderMap| {
                    let logout = logout.clone();
                    async move {
                        logout.push("POST logout", String::new(), &headers, "");
                        StatusCode::NO_CONTENT
                    }
                }),
            )
            .route(
                "/auth/v1/user",
                get(move |headers: HeaderMap| {
                    let user = user.clone();
                    async move {
                        user.push("GET user", String::new(), &headers, "");
                        Json(sample_user())
                    }
                }),
            )
            .route(
                "/auth/v1/signup",
                post(|Json(body): Json<Value>| async move {
                    if body["data"]["auto"] == true {
                        Json(sample_session())
                    } else {
                        Json(sample_user())
                    }
                }),
            )
            .route(
                "/rest/v1/customers",
                get(move |headers: HeaderMap| {
                    let customers = customers.clone();
                    async move {
                        customers.push("GET customers", String::new(), &headers, "");
                        Json(json!([sample_customer(1)]))
                    }
                }),
            )
    }

    #[tokio::test]
    async fn test_sign_in_stores_session_and_notifies() {
        let recorded = Recorded::default();
        let client = testing::serve(auth_router(recorded.clone())).await;
        let auth = client.auth();
        let mut events = auth.subscribe();

        let session = auth.sign_in("owner@shop.eg", "correct horse").await.unwrap();
        assert_eq!(session.access_token, "user-token");
        assert!(recorded.last().query.contains("grant_type=password"));

        assert_eq!(
            events.recv().await.unwrap(),
            AuthEvent::SignedIn(session.user.clone())
        );
        assert_eq!(auth.session().await, Some(session.clone()));

        // data requests now carry the user's token
        client.customers().list().await.unwrap();
        assert_eq!(
            recorded.last().authorization.as_deref(),
            Some("Bearer user-token")
        );

        let profile: UserProfile = session.user.into();
        assert_eq!(profile.name, "صاحب المحل");
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let client = testing::serve(auth_router(Recorded::default())).await;
        let auth = client.auth();

        let err = auth.sign_in("owner@shop.eg", "wrong").await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::Rejected { status: 400, ref body } if body == "Invalid login credentials"
        ));
        assert!(auth.session().await.is_none());
    }

    #[tokio::test]
    async fn test_current_user_requires_session() {
        let recorded = Recorded::default();
        let client = testing::serve(auth_router(recorded.clone())).await;
        let auth = client.auth();

        assert!(matches!(auth.current_user().await, Err(SyncError::NotSignedIn)));

        auth.sign_in("owner@shop.eg", "correct horse").await.unwrap();
        let user = auth.current_user().await.unwrap();
        assert_eq!(user.email.as_deref(), Some("owner@shop.eg"));
        assert_eq!(
            recorded.last().authorization.as_deref(),
            Some("Bearer user-token")
        );
    }

    #[tokio::test]
    async fn test_sign_out_clears_session() {
        let recorded = Recorded::default();
        let client = testing::serve(auth_router(recorded.clone())).await;
        let auth = client.auth();

        auth.sign_in("owner@shop.eg", "correct horse").await.unwrap();
        let mut events = auth.subscribe();

        auth.sign_out().await.unwrap();
        assert_eq!(events.recv().await.unwrap(), AuthEvent::SignedOut);
        assert!(auth.session().await.is_none());
        assert_eq!(recorded.last().method, "POST logout");

        // second sign-out is a no-op
        auth.sign_out().await.unwrap();
        assert_eq!(recorded.all().len(), 2);

        client.customers().list().await.unwrap();
        assert_eq!(
            recorded.last().authorization.as_deref(),
            Some("Bearer test-key")
        );
    }

    #[tokio::test]
    async fn test_sign_up_with_and_without_session() {
        let client = testing::serve(auth_router(Recorded::default())).await;
        let auth = client.auth();

        let pending = auth
            .sign_up("new@shop.eg", "secret", json!({ "name": "جديد" }))
            .await
            .unwrap();
        assert!(pending.session.is_none());
        assert!(auth.session().await.is_none());

        let confirmed = auth
            .sign_up("new@shop.eg", "secret", json!({ "auto": true }))
            .await
            .unwrap();
        assert!(confirmed.session.is_some());
        assert!(auth.session().await.is_some());
    }

    #[test]
    fn test_provider_is_object_safe() {
        fn takes(_: &dyn AuthProvider) {}
        let config = crate::RemoteConfig::new("http://127.0.0.1:1", testing::KEY).unwrap();
        let client = BackendClient::new(config).unwrap();
        takes(&client.auth());
    }
}
