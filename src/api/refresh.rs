//! Silent session renewal: the retry-once refresh protocol.
//!
//! `SessionGuard` is a decorator composed around the transport at
//! construction time. Every data request flows through it; when the server
//! answers 401 for a request that has not been replayed yet, the guard
//! calls `GET /refresh` with the same cookie, stores the renewed identity,
//! and resubmits the original request exactly once. The outcome of the
//! resubmission is terminal whatever it is, so a request costs at most one
//! extra round trip.
//!
//! Concurrent 401s coalesce: the refresh call is epoch-guarded, so waiters
//! that queue up behind an in-flight refresh reuse its result instead of
//! stampeding the endpoint. The refresh future runs inside the caller's
//! own future, so cancelling the caller cancels the refresh it started.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::StatusCode;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth::{Session, SessionStore};
use crate::models::UserPayload;

use super::client::{ApiRequest, HttpResponse, Transport};
use super::ApiError;

/// Cookie-authenticated renewal endpoint.
const REFRESH_PATH: &str = "/refresh";

pub struct SessionGuard<T: Transport> {
    transport: T,
    session: Arc<SessionStore>,
    refresh_gate: Mutex<()>,
    refresh_epoch: AtomicU64,
}

impl<T: Transport> SessionGuard<T> {
    pub fn new(transport: T, session: Arc<SessionStore>) -> Self {
        Self {
            transport,
            session,
            refresh_gate: Mutex::new(()),
            refresh_epoch: AtomicU64::new(0),
        }
    }

    /// The wrapped transport, for the auth endpoints that must not be
    /// intercepted (login, register).
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Send a request, transparently renewing the session on a first 401.
    ///
    /// Success responses come back as-is. Failures map onto the error
    /// taxonomy: an unresolved 401 becomes `SessionExpired`, anything else
    /// non-2xx becomes `Validation` or `Status` from the envelope, and a
    /// failed refresh propagates its own error in place of the original
    /// 401.
    pub async fn execute(&self, request: ApiRequest) -> Result<HttpResponse, ApiError> {
        let mut request = request;
        let response = self.transport.send(&request).await?;

        if response.status != StatusCode::UNAUTHORIZED || request.retried {
            return Self::settle(response);
        }

        debug!(path = %request.path, "session rejected, attempting refresh");
        request.retried = true;
        self.refresh().await?;

        let retry = self.transport.send(&request).await?;
        Self::settle(retry)
    }

    /// Terminal classification of a settled response.
    fn settle(response: HttpResponse) -> Result<HttpResponse, ApiError> {
        if response.status.is_success() {
            Ok(response)
        } else if response.status == StatusCode::UNAUTHORIZED {
            Err(ApiError::SessionExpired)
        } else {
            Err(response.into_status_error())
        }
    }

    /// Renew the session via `GET /refresh`, coalescing concurrent calls.
    ///
    /// The epoch snapshot taken before acquiring the gate detects a renewal
    /// that completed while this task was queued; such a waiter skips its
    /// own refresh and goes straight to the retry. On failure the session
    /// is left untouched.
    async fn refresh(&self) -> Result<(), ApiError> {
        let seen = self.refresh_epoch.load(Ordering::Acquire);
        let _gate = self.refresh_gate.lock().await;
        if self.refresh_epoch.load(Ordering::Acquire) != seen {
            debug!("session already renewed by a concurrent request");
            return Ok(());
        }

        let response = self.transport.send(&ApiRequest::get(REFRESH_PATH)).await?;
        if !response.status.is_success() {
            warn!(status = %response.status, "session refresh refused");
            return Err(if response.status == StatusCode::UNAUTHORIZED {
                ApiError::SessionExpired
            } else {
                response.into_status_error()
            });
        }

        let payload: UserPayload = response.require_envelope()?.decode_data()?;
        self.session.set(Session::from(payload.user));
        self.refresh_epoch.fetch_add(1, Ordering::Release);
        info!("session silently renewed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use reqwest::Method;

    use super::*;
    use crate::api::envelope::Envelope;

    /// Scripted transport: a queue of responses per path, recording each
    /// outbound request together with the session identity at send time.
    struct FakeTransport {
        scripts: StdMutex<HashMap<String, VecDeque<Result<HttpResponse, ApiError>>>>,
        log: StdMutex<Vec<(ApiRequest, Session)>>,
        session: Arc<SessionStore>,
    }

    impl FakeTransport {
        fn new(session: Arc<SessionStore>) -> Self {
            Self {
                scripts: StdMutex::new(HashMap::new()),
                log: StdMutex::new(Vec::new()),
                session,
            }
        }

        fn script(&self, path: &str, response: Result<HttpResponse, ApiError>) {
            self.scripts
                .lock()
                .unwrap()
                .entry(path.to_string())
                .or_default()
                .push_back(response);
        }

        fn sent(&self) -> Vec<(ApiRequest, Session)> {
            self.log.lock().unwrap().clone()
        }

        fn sends_to(&self, path: &str) -> usize {
            self.log
                .lock()
                .unwrap()
                .iter()
                .filter(|(req, _)| req.path == path)
                .count()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn send(&self, request: &ApiRequest) -> Result<HttpResponse, ApiError> {
            self.log
                .lock()
                .unwrap()
                .push((request.clone(), self.session.get()));
            // Yield so concurrent callers interleave like real I/O
            tokio::task::yield_now().await;
            self.scripts
                .lock()
                .unwrap()
                .get_mut(&request.path)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| panic!("no scripted response left for {}", request.path))
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        let envelope = if body.is_empty() {
            None
        } else {
            Some(serde_json::from_str::<Envelope>(body).expect("scripted envelope"))
        };
        HttpResponse {
            status: StatusCode::from_u16(status).expect("status code"),
            envelope,
        }
    }

    fn refreshed_user() -> &'static str {
        r#"{"status":"success","data":{"user":{"id":7,"userProfileId":12,"username":"andi","email":"andi@example.com"}}}"#
    }

    fn stocks_payload() -> &'static str {
        r#"{"status":"success","data":{"warehouse":{"id":1,"name":"Main","address":"Jl. Sudirman 1"},"stocks":[]}}"#
    }

    fn plain_401() -> HttpResponse {
        response(
            401,
            r#"{"status":"fail","errors":{"code":401,"message":"session invalid"}}"#,
        )
    }

    fn guard_with_fake() -> (SessionGuard<Arc<FakeTransport>>, Arc<FakeTransport>) {
        let session = Arc::new(SessionStore::new());
        let transport = Arc::new(FakeTransport::new(Arc::clone(&session)));
        (
            SessionGuard::new(Arc::clone(&transport), session),
            transport,
        )
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let (guard, fake) = guard_with_fake();
        fake.script("/warehouses/1/stocks", Ok(response(200, stocks_payload())));

        let result = guard
            .execute(ApiRequest::get("/warehouses/1/stocks"))
            .await
            .expect("success");
        assert_eq!(result.status, StatusCode::OK);
        assert_eq!(fake.sent().len(), 1);
        assert_eq!(fake.sends_to("/refresh"), 0);
    }

    #[tokio::test]
    async fn test_non_401_error_is_not_retried() {
        let (guard, fake) = guard_with_fake();
        fake.script(
            "/warehouses/9/stocks",
            Ok(response(
                404,
                r#"{"status":"fail","errors":{"code":404,"message":"warehouse not found"}}"#,
            )),
        );

        let err = guard
            .execute(ApiRequest::get("/warehouses/9/stocks"))
            .await
            .expect_err("should fail");
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "warehouse not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(fake.sent().len(), 1);
        assert_eq!(fake.sends_to("/refresh"), 0);
    }

    #[tokio::test]
    async fn test_401_refresh_then_retry_succeeds() {
        let (guard, fake) = guard_with_fake();
        fake.script("/warehouses/1/stocks", Ok(plain_401()));
        fake.script("/refresh", Ok(response(200, refreshed_user())));
        fake.script("/warehouses/1/stocks", Ok(response(200, stocks_payload())));

        // Carry a body so the resubmission check is meaningful
        let request = ApiRequest {
            method: Method::GET,
            path: "/warehouses/1/stocks".to_string(),
            body: Some(serde_json::json!({"probe": true})),
            retried: false,
        };

        let result = guard.execute(request).await.expect("silent recovery");
        assert_eq!(result.status, StatusCode::OK);

        let sent = fake.sent();
        assert_eq!(sent.len(), 3);

        // Original and resubmission are identical apart from the one-shot flag
        let (first, session_at_first) = &sent[0];
        let (retry, session_at_retry) = &sent[2];
        assert_eq!(retry.method, first.method);
        assert_eq!(retry.path, first.path);
        assert_eq!(retry.body, first.body);
        assert!(!first.retried);
        assert!(retry.retried);

        // Session reflects the refreshed identity before the retry is sent
        assert!(!session_at_first.is_signed_in());
        assert_eq!(session_at_retry.user_profile_id, 12);
        assert_eq!(session_at_retry.username, "andi");
    }

    #[tokio::test]
    async fn test_refresh_failure_propagates_instead_of_original_401() {
        let (guard, fake) = guard_with_fake();
        fake.script("/hobbies", Ok(plain_401()));
        fake.script(
            "/refresh",
            Ok(response(
                500,
                r#"{"status":"fail","errors":{"code":500,"message":"refresh exploded"}}"#,
            )),
        );

        let err = guard
            .execute(ApiRequest::get("/hobbies"))
            .await
            .expect_err("refresh failure surfaces");
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "refresh exploded");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        // No retry of the original request, session untouched
        assert_eq!(fake.sends_to("/hobbies"), 1);
        assert!(!guard.session().is_signed_in());
    }

    #[tokio::test]
    async fn test_refresh_401_surfaces_as_session_expired() {
        let (guard, fake) = guard_with_fake();
        fake.script("/hobbies", Ok(plain_401()));
        fake.script("/refresh", Ok(plain_401()));

        let err = guard
            .execute(ApiRequest::get("/hobbies"))
            .await
            .expect_err("dead session");
        assert!(matches!(err, ApiError::SessionExpired));
        assert_eq!(fake.sends_to("/hobbies"), 1);
    }

    #[tokio::test]
    async fn test_refresh_transport_error_propagates() {
        let (guard, fake) = guard_with_fake();
        fake.script("/hobbies", Ok(plain_401()));
        fake.script(
            "/refresh",
            Err(ApiError::InvalidResponse("connection reset".to_string())),
        );

        let err = guard
            .execute(ApiRequest::get("/hobbies"))
            .await
            .expect_err("transport failure surfaces");
        assert!(matches!(err, ApiError::InvalidResponse(_)));
        assert_eq!(fake.sends_to("/hobbies"), 1);
    }

    #[tokio::test]
    async fn test_second_401_is_terminal() {
        let (guard, fake) = guard_with_fake();
        fake.script("/posts", Ok(plain_401()));
        fake.script("/refresh", Ok(response(200, refreshed_user())));
        fake.script("/posts", Ok(plain_401()));

        let err = guard
            .execute(ApiRequest::get("/posts"))
            .await
            .expect_err("second 401 surfaces");
        assert!(matches!(err, ApiError::SessionExpired));

        // Exactly one refresh, exactly one resubmission
        assert_eq!(fake.sends_to("/refresh"), 1);
        assert_eq!(fake.sends_to("/posts"), 2);
    }

    #[tokio::test]
    async fn test_already_retried_request_is_never_refreshed() {
        let (guard, fake) = guard_with_fake();
        fake.script("/posts", Ok(plain_401()));

        let mut request = ApiRequest::get("/posts");
        request.retried = true;

        let err = guard.execute(request).await.expect_err("terminal 401");
        assert!(matches!(err, ApiError::SessionExpired));
        assert_eq!(fake.sent().len(), 1);
        assert_eq!(fake.sends_to("/refresh"), 0);
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        let (guard, fake) = guard_with_fake();
        fake.script("/warehouses", Ok(plain_401()));
        fake.script("/hobbies", Ok(plain_401()));
        // One scripted refresh only: a second refresh attempt would panic
        fake.script("/refresh", Ok(response(200, refreshed_user())));
        fake.script(
            "/warehouses",
            Ok(response(200, r#"{"status":"success","data":{"warehouse":[]}}"#)),
        );
        fake.script(
            "/hobbies",
            Ok(response(200, r#"{"status":"success","data":{"hobbies":[]}}"#)),
        );

        let (a, b) = tokio::join!(
            guard.execute(ApiRequest::get("/warehouses")),
            guard.execute(ApiRequest::get("/hobbies")),
        );
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(fake.sends_to("/refresh"), 1);
        assert_eq!(guard.session().get().user_profile_id, 12);
    }
}
