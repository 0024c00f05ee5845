//! Crate-level tests for the auth flow

#[cfg(test)]
mod support {
    use std::sync::Arc;
    use std::time::Duration;

    use platform::rate_limit::{RateLimitConfig, RateLimitResult};
    use tokio::sync::mpsc;

    use crate::application::{AuthConfig, AuthService, HmacTokenIssuer, SessionToken, TokenIssuer};
    use crate::domain::repository::{CodeCheck, CodeStore, SmsSender, UserDirectory};
    use crate::domain::{AuthCode, PhoneNumber, UserRecord, UserUuid, VerificationCode};
    use crate::error::{AuthError, AuthResult};
    use crate::infra::InMemoryAuthRepository;

    pub const PHONE: &str = "+8611111111111";

    /// Hands every delivered code back to the test
    #[derive(Clone)]
    pub struct RecordingSms {
        tx: mpsc::UnboundedSender<(String, String)>,
    }

    impl RecordingSms {
        pub fn new() -> (Self, mpsc::UnboundedReceiver<(String, String)>) {
            let (tx, rx) = mpsc::unbounded_channel();
            (Self { tx }, rx)
        }
    }

    impl SmsSender for RecordingSms {
        async fn send(&self, phone: &PhoneNumber, code: &VerificationCode) -> AuthResult<()> {
            let _ = self
                .tx
                .send((phone.as_str().to_string(), code.as_str().to_string()));
            Ok(())
        }
    }

    pub struct FailingSms;

    impl SmsSender for FailingSms {
        async fn send(&self, _: &PhoneNumber, _: &VerificationCode) -> AuthResult<()> {
            Err(AuthError::Internal("carrier rejected".into()))
        }
    }

    pub struct FailingTokens;

    impl TokenIssuer for FailingTokens {
        fn issue(&self, _: &UserUuid) -> AuthResult<SessionToken> {
            Err(AuthError::Internal("signing key unavailable".into()))
        }
    }

    /// Store whose calls never complete
    pub struct StalledStore;

    impl CodeStore for StalledStore {
        async fn set(&self, _: &AuthCode) -> AuthResult<()> {
            std::future::pending().await
        }
        async fn get(&self, _: &PhoneNumber) -> AuthResult<Option<AuthCode>> {
            std::future::pending().await
        }
        async fn delete(&self, _: &PhoneNumber) -> AuthResult<()> {
            std::future::pending().await
        }
        async fn increment_rate_counter(
            &self,
            _: &PhoneNumber,
            _: &RateLimitConfig,
        ) -> AuthResult<RateLimitResult> {
            std::future::pending().await
        }
        async fn issue(&self, _: &AuthCode, _: &RateLimitConfig) -> AuthResult<RateLimitResult> {
            std::future::pending().await
        }
        async fn consume(
            &self,
            _: &PhoneNumber,
            _: &VerificationCode,
            _: u32,
        ) -> AuthResult<CodeCheck> {
            std::future::pending().await
        }
        async fn purge_expired(&self) -> AuthResult<u64> {
            std::future::pending().await
        }
    }

    impl UserDirectory for StalledStore {
        async fn find_by_phone(&self, _: &PhoneNumber) -> AuthResult<Option<UserRecord>> {
            std::future::pending().await
        }
        async fn create_if_absent(&self, _: &UserRecord) -> AuthResult<(UserRecord, bool)> {
            std::future::pending().await
        }
        async fn delete_by_phone(&self, _: &PhoneNumber) -> AuthResult<bool> {
            std::future::pending().await
        }
    }

    pub fn test_config() -> AuthConfig {
        AuthConfig {
            rate_limit: RateLimitConfig::new(3, 60),
            store_timeout: Duration::from_millis(200),
            ..AuthConfig::with_random_secret()
        }
    }

    pub type TestService =
        AuthService<InMemoryAuthRepository, InMemoryAuthRepository, RecordingSms>;

    pub struct Harness {
        pub service: Arc<TestService>,
        pub repo: Arc<InMemoryAuthRepository>,
        pub tokens: Arc<HmacTokenIssuer>,
        pub sms: mpsc::UnboundedReceiver<(String, String)>,
    }

    impl Harness {
        pub fn new(config: AuthConfig) -> Self {
            let repo = Arc::new(InMemoryAuthRepository::new());
            let tokens = Arc::new(HmacTokenIssuer::from_config(&config));
            let (sms, rx) = RecordingSms::new();
            let service = AuthService::new(
                repo.clone(),
                repo.clone(),
                Arc::new(sms),
                tokens.clone(),
                Arc::new(config),
            );
            Self {
                service: Arc::new(service),
                repo,
                tokens,
                sms: rx,
            }
        }

        /// Request a code and wait for its delivery
        pub async fn request_and_receive(&mut self, phone: &str) -> String {
            self.service.request_code(phone).await.unwrap();
            let (_, code) = tokio::time::timeout(Duration::from_secs(1), self.sms.recv())
                .await
                .expect("code was not delivered")
                .expect("sms channel closed");
            code
        }
    }

    pub fn phone(raw: &str) -> PhoneNumber {
        PhoneNumber::parse(raw, &Default::default()).unwrap()
    }

    /// Any valid code other than `code`
    pub fn other_code(code: &str) -> String {
        code.chars()
            .map(|c| if c == '9' { '0' } else { char::from(c as u8 + 1) })
            .collect()
    }
}

#[cfg(test)]
mod request_code_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use platform::rate_limit::RateLimitConfig;

    use super::support::*;
    use crate::application::{AuthConfig, AuthService, HmacTokenIssuer};
    use crate::domain::repository::CodeStore;
    use crate::error::AuthError;
    use crate::infra::InMemoryAuthRepository;

    #[tokio::test]
    async fn test_request_code_stores_and_delivers_one_code() {
        let mut h = Harness::new(test_config());

        let before = chrono::Utc::now().timestamp_millis();
        let output = h.service.request_code(PHONE).await.unwrap();
        assert!(output.expires_at_ms >= before + 300_000);

        let (delivered_to, code) = h.sms.recv().await.unwrap();
        assert_eq!(delivered_to, PHONE);
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        let stored = h.repo.get(&phone(PHONE)).await.unwrap().unwrap();
        assert_eq!(stored.code.as_str(), code);
        assert_eq!(stored.expires_at_ms, output.expires_at_ms);
    }

    #[tokio::test]
    async fn test_invalid_phone_touches_nothing() {
        let h = Harness::new(AuthConfig {
            rate_limit: RateLimitConfig::new(1, 60),
            ..test_config()
        });

        for raw in ["", "not-a-phone", "+86 abc"] {
            let result = h.service.request_code(raw).await;
            assert!(matches!(result, Err(AuthError::InvalidPhone(_))));
        }

        // The window is still untouched for a valid number
        let config = RateLimitConfig::new(1, 60);
        let result = h.repo.increment_rate_counter(&phone(PHONE), &config).await;
        assert!(result.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_rate_limit_per_phone() {
        let mut h = Harness::new(test_config());

        for _ in 0..3 {
            h.request_and_receive(PHONE).await;
        }

        match h.service.request_code(PHONE).await {
            Err(AuthError::RateLimited { retry_after }) => {
                assert!(retry_after > Duration::ZERO);
                assert!(retry_after <= Duration::from_secs(60));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }

        // Another phone has its own window
        h.request_and_receive("+8622222222222").await;
    }

    #[tokio::test]
    async fn test_rejected_request_keeps_previous_code() {
        let mut h = Harness::new(AuthConfig {
            rate_limit: RateLimitConfig::new(1, 60),
            ..test_config()
        });

        let code = h.request_and_receive(PHONE).await;
        assert!(h.service.request_code(PHONE).await.is_err());

        let stored = h.repo.get(&phone(PHONE)).await.unwrap().unwrap();
        assert_eq!(stored.code.as_str(), code);
    }

    #[tokio::test]
    async fn test_window_expiry_resets_limit() {
        let mut h = Harness::new(AuthConfig {
            rate_limit: RateLimitConfig {
                max_requests: 1,
                window: Duration::from_millis(50),
            },
            ..test_config()
        });

        h.request_and_receive(PHONE).await;
        assert!(matches!(
            h.service.request_code(PHONE).await,
            Err(AuthError::RateLimited { .. })
        ));

        tokio::time::sleep(Duration::from_millis(80)).await;
        h.request_and_receive(PHONE).await;
    }

    #[tokio::test]
    async fn test_new_request_replaces_code() {
        let mut h = Harness::new(test_config());

        let first = h.request_and_receive(PHONE).await;
        let second = h.request_and_receive(PHONE).await;

        if first != second {
            assert!(matches!(
                h.service.login_or_signup(PHONE, &first).await,
                Err(AuthError::CodeMismatch)
            ));
        }
        assert!(h.service.login_or_signup(PHONE, &second).await.is_ok());
    }

    #[tokio::test]
    async fn test_sms_failure_does_not_fail_request() {
        let config = test_config();
        let repo = Arc::new(InMemoryAuthRepository::new());
        let service = AuthService::new(
            repo.clone(),
            repo.clone(),
            Arc::new(FailingSms),
            Arc::new(HmacTokenIssuer::from_config(&config)),
            Arc::new(config),
        );

        assert!(service.request_code(PHONE).await.is_ok());
        assert!(repo.get(&phone(PHONE)).await.unwrap().is_some());
    }
}

#[cfg(test)]
mod login_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::support::*;
    use crate::application::{AuthConfig, AuthService};
    use crate::domain::repository::{CodeStore, UserDirectory};
    use crate::domain::{UserRecord, UserUuid};
    use crate::error::AuthError;

    #[tokio::test]
    async fn test_first_login_creates_user() {
        let mut h = Harness::new(test_config());
        let code = h.request_and_receive(PHONE).await;

        let output = h.service.login_or_signup(PHONE, &code).await.unwrap();
        assert!(output.created);

        let stored = h.repo.find_by_phone(&phone(PHONE)).await.unwrap().unwrap();
        assert_eq!(stored.uuid.as_str(), output.uuid);
        assert_eq!(stored.match_list, "[]");
        assert_eq!(stored.black_list, "[]");

        let claims = h.tokens.verify(&output.token).unwrap();
        assert_eq!(claims.sub, output.uuid);
    }

    #[tokio::test]
    async fn test_existing_user_keeps_identifier() {
        let mut h = Harness::new(test_config());
        h.repo
            .create_if_absent(&UserRecord::with_uuid(
                UserUuid::from_db("existing-user-uuid"),
                phone(PHONE),
            ))
            .await
            .unwrap();

        let code = h.request_and_receive(PHONE).await;
        let output = h.service.login_or_signup(PHONE, &code).await.unwrap();

        assert_eq!(output.uuid, "existing-user-uuid");
        assert!(!output.created);
        assert_eq!(h.repo.user_count(), 1);
    }

    #[tokio::test]
    async fn test_repeat_logins_resolve_to_same_user() {
        let mut h = Harness::new(test_config());

        let code = h.request_and_receive(PHONE).await;
        let first = h.service.login_or_signup(PHONE, &code).await.unwrap();

        let code = h.request_and_receive(PHONE).await;
        let second = h.service.login_or_signup(PHONE, &code).await.unwrap();

        assert_eq!(first.uuid, second.uuid);
        assert_ne!(first.token, second.token);
        assert_eq!(h.repo.user_count(), 1);
    }

    #[tokio::test]
    async fn test_deleted_user_signs_up_again_with_new_identifier() {
        let mut h = Harness::new(test_config());

        let code = h.request_and_receive(PHONE).await;
        let first = h.service.login_or_signup(PHONE, &code).await.unwrap();

        assert!(h.repo.delete_by_phone(&phone(PHONE)).await.unwrap());
        h.repo.delete(&phone(PHONE)).await.unwrap();

        let code = h.request_and_receive(PHONE).await;
        let second = h.service.login_or_signup(PHONE, &code).await.unwrap();

        assert!(second.created);
        assert_ne!(first.uuid, second.uuid);
    }

    #[tokio::test]
    async fn test_wrong_code_keeps_code_live() {
        let mut h = Harness::new(test_config());
        let code = h.request_and_receive(PHONE).await;

        assert!(matches!(
            h.service.login_or_signup(PHONE, &other_code(&code)).await,
            Err(AuthError::CodeMismatch)
        ));
        assert!(matches!(
            h.service.login_or_signup(PHONE, "12").await,
            Err(AuthError::CodeMismatch)
        ));
        assert_eq!(h.repo.user_count(), 0);

        assert!(h.service.login_or_signup(PHONE, &code).await.is_ok());
    }

    #[tokio::test]
    async fn test_code_discarded_after_max_wrong_guesses() {
        let mut h = Harness::new(AuthConfig {
            max_attempts: 3,
            ..test_config()
        });
        let code = h.request_and_receive(PHONE).await;
        let wrong = other_code(&code);

        for _ in 0..3 {
            assert!(matches!(
                h.service.login_or_signup(PHONE, &wrong).await,
                Err(AuthError::CodeMismatch)
            ));
        }
        // Once the attempts are used up the code is gone for good
        assert!(matches!(
            h.service.login_or_signup(PHONE, &wrong).await,
            Err(AuthError::CodeExpired)
        ));
        assert!(matches!(
            h.service.login_or_signup(PHONE, &code).await,
            Err(AuthError::CodeExpired)
        ));
        assert_eq!(h.repo.user_count(), 0);
    }

    #[tokio::test]
    async fn test_code_survives_guesses_below_limit() {
        let mut h = Harness::new(AuthConfig {
            max_attempts: 3,
            ..test_config()
        });
        let code = h.request_and_receive(PHONE).await;

        for _ in 0..2 {
            let _ = h.service.login_or_signup(PHONE, &other_code(&code)).await;
        }
        assert!(h.service.login_or_signup(PHONE, &code).await.unwrap().created);
    }

    #[tokio::test]
    async fn test_fresh_code_after_exhaustion_works() {
        let mut h = Harness::new(AuthConfig {
            max_attempts: 1,
            ..test_config()
        });
        let code = h.request_and_receive(PHONE).await;
        let _ = h.service.login_or_signup(PHONE, &other_code(&code)).await;

        let code = h.request_and_receive(PHONE).await;
        assert!(h.service.login_or_signup(PHONE, &code).await.is_ok());
    }

    #[tokio::test]
    async fn test_code_is_single_use() {
        let mut h = Harness::new(test_config());
        let code = h.request_and_receive(PHONE).await;

        h.service.login_or_signup(PHONE, &code).await.unwrap();
        assert!(matches!(
            h.service.login_or_signup(PHONE, &code).await,
            Err(AuthError::CodeExpired)
        ));
    }

    #[tokio::test]
    async fn test_login_without_request_is_expired() {
        let h = Harness::new(test_config());
        assert!(matches!(
            h.service.login_or_signup(PHONE, "123456").await,
            Err(AuthError::CodeExpired)
        ));
    }

    #[tokio::test]
    async fn test_expired_code_is_rejected() {
        let mut h = Harness::new(AuthConfig {
            code_ttl: Duration::from_millis(30),
            ..test_config()
        });
        let code = h.request_and_receive(PHONE).await;
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(matches!(
            h.service.login_or_signup(PHONE, &code).await,
            Err(AuthError::CodeExpired)
        ));
        assert_eq!(h.repo.user_count(), 0);
    }

    #[tokio::test]
    async fn test_login_resets_rate_window() {
        let mut h = Harness::new(test_config());
        for _ in 0..2 {
            h.request_and_receive(PHONE).await;
        }
        let code = h.request_and_receive(PHONE).await;
        h.service.login_or_signup(PHONE, &code).await.unwrap();

        assert!(h.service.request_code(PHONE).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_phone_on_login() {
        let h = Harness::new(test_config());
        assert!(matches!(
            h.service.login_or_signup("phone", "123456").await,
            Err(AuthError::InvalidPhone(_))
        ));
    }

    #[tokio::test]
    async fn test_token_failure_keeps_created_user() {
        let config = test_config();
        let repo = Arc::new(crate::infra::InMemoryAuthRepository::new());
        let (sms, mut rx) = RecordingSms::new();
        let service = AuthService::new(
            repo.clone(),
            repo.clone(),
            Arc::new(sms),
            Arc::new(FailingTokens),
            Arc::new(config),
        );

        service.request_code(PHONE).await.unwrap();
        let (_, code) = rx.recv().await.unwrap();

        assert!(matches!(
            service.login_or_signup(PHONE, &code).await,
            Err(AuthError::Internal(_))
        ));
        assert!(repo.find_by_phone(&phone(PHONE)).await.unwrap().is_some());
        assert!(repo.get(&phone(PHONE)).await.unwrap().is_none());
    }
}

#[cfg(test)]
mod concurrency_tests {
    use std::collections::HashSet;

    use super::support::*;
    use crate::error::AuthError;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_find_or_create_yields_one_user() {
        let h = Harness::new(test_config());
        let target = phone(PHONE);

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let service = h.service.clone();
                let target = target.clone();
                tokio::spawn(async move { service.resolver().find_or_create(&target).await })
            })
            .collect();

        let mut ids = HashSet::new();
        let mut created = 0;
        for task in tasks {
            let identity = task.await.unwrap().unwrap();
            created += identity.created as usize;
            ids.insert(identity.user_uuid);
        }

        assert_eq!(ids.len(), 1);
        assert_eq!(created, 1);
        assert_eq!(h.repo.user_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_logins_consume_code_once() {
        let mut h = Harness::new(test_config());
        let code = h.request_and_receive(PHONE).await;

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let service = h.service.clone();
                let code = code.clone();
                tokio::spawn(async move { service.login_or_signup(PHONE, &code).await })
            })
            .collect();

        let mut successes = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => successes += 1,
                Err(AuthError::CodeExpired) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(h.repo.user_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_respect_limit() {
        let h = Harness::new(test_config());

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let service = h.service.clone();
                tokio::spawn(async move { service.request_code(PHONE).await })
            })
            .collect();

        let mut allowed = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                allowed += 1;
            }
        }

        assert_eq!(allowed, 3);
    }
}

#[cfg(test)]
mod store_failure_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::support::*;
    use crate::application::{AuthService, HmacTokenIssuer};
    use crate::error::AuthError;

    #[tokio::test]
    async fn test_stalled_store_surfaces_transient_error() {
        let config = test_config();
        let store = Arc::new(StalledStore);
        let (sms, _rx) = RecordingSms::new();
        let service = AuthService::new(
            store.clone(),
            store,
            Arc::new(sms),
            Arc::new(HmacTokenIssuer::from_config(&config)),
            Arc::new(config),
        );

        let started = tokio::time::Instant::now();
        let err = service.request_code(PHONE).await.unwrap_err();
        assert!(matches!(err, AuthError::TransientStore(_)));
        assert!(err.is_transient());
        assert!(started.elapsed() < Duration::from_secs(2));

        let err = service.login_or_signup(PHONE, "123456").await.unwrap_err();
        assert!(matches!(err, AuthError::TransientStore(_)));
    }
}

#[cfg(test)]
mod http_tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use platform::rate_limit::RateLimitConfig;
    use serde_json::{Value, json};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use super::support::*;
    use crate::application::AuthConfig;
    use crate::infra::InMemoryAuthRepository;
    use crate::presentation::router::{URL_LOGIN_OR_SIGNUP, URL_SEND_AUTH_CODE, auth_router_generic};

    fn app(config: AuthConfig) -> (Router, mpsc::UnboundedReceiver<(String, String)>) {
        let (sms, rx) = RecordingSms::new();
        (auth_router_generic(InMemoryAuthRepository::new(), sms, config), rx)
    }

    async fn post(
        app: &Router,
        uri: &str,
        body: impl Into<Body>,
    ) -> (StatusCode, Option<String>, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, retry_after, value)
    }

    #[tokio::test]
    async fn test_full_flow_over_http() {
        let (app, mut sms) = app(test_config());

        let request = json!({"phone": PHONE}).to_string();
        let (status, _, body) = post(&app, URL_SEND_AUTH_CODE, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["expiresAtMs"].as_i64().unwrap() > 0);

        let (_, code) = sms.recv().await.unwrap();
        let (status, _, body) = post(
            &app,
            URL_LOGIN_OR_SIGNUP,
            json!({"phone": PHONE, "code": code}).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["uuid"].as_str().unwrap().is_empty());
        assert!(body["token"].as_str().unwrap().contains('.'));
    }

    #[tokio::test]
    async fn test_error_bodies_carry_codes() {
        let (app, _sms) = app(test_config());

        let request = json!({"phone": "x"}).to_string();
        let (status, _, body) = post(&app, URL_SEND_AUTH_CODE, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PHONE");

        let (status, _, body) = post(
            &app,
            URL_LOGIN_OR_SIGNUP,
            json!({"phone": PHONE, "code": "123456"}).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "CODE_EXPIRED");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (app, _sms) = app(test_config());

        for body in ["{", "{\"number\": \"+8611111111111\"}", "[]"] {
            let (status, _, value) = post(&app, URL_SEND_AUTH_CODE, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(value["code"], "MALFORMED_REQUEST");
        }

        let (status, _, value) =
            post(&app, URL_LOGIN_OR_SIGNUP, json!({"phone": PHONE}).to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["code"], "MALFORMED_REQUEST");
    }

    #[tokio::test]
    async fn test_rate_limited_response() {
        let (app, _sms) = app(AuthConfig {
            rate_limit: RateLimitConfig::new(1, 60),
            ..test_config()
        });
        let request = json!({"phone": PHONE}).to_string();

        let (status, _, _) = post(&app, URL_SEND_AUTH_CODE, request.clone()).await;
        assert_eq!(status, StatusCode::OK);

        let (status, retry_after, body) = post(&app, URL_SEND_AUTH_CODE, request).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["code"], "RATE_LIMITED");
        let secs: u64 = retry_after.unwrap().parse().unwrap();
        assert!((1..=60).contains(&secs));
    }

    #[tokio::test]
    async fn test_wrong_code_is_unauthorized() {
        let (app, mut sms) = app(test_config());
        post(&app, URL_SEND_AUTH_CODE, json!({"phone": PHONE}).to_string()).await;
        let (_, code) = sms.recv().await.unwrap();

        let (status, _, body) = post(
            &app,
            URL_LOGIN_OR_SIGNUP,
            json!({"phone": PHONE, "code": other_code(&code)}).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "CODE_MISMATCH");
    }
}
