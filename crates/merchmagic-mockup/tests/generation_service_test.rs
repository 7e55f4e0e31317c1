//! Integration tests for the generation orchestrator.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use merchmagic_auth::config::AuthConfig;
use merchmagic_auth::service::SessionService;
use merchmagic_core::clock::ManualClock;
use merchmagic_core::error::{MerchError, MerchResult};
use merchmagic_core::models::mockup::{GenerationRequest, ImageData, ProductType};
use merchmagic_core::provider::{ImageGenerator, VerifiedIdentity};
use merchmagic_core::quota::QuotaLedger;
use merchmagic_core::repository::AccountRepository;
use merchmagic_db::{MemoryAccountRepository, MemorySessionRepository};
use merchmagic_mockup::service::{GenerationService, NO_IMAGE_RETURNED};

#[derive(Clone, Copy)]
enum Reply {
    Image,
    Nothing,
    Error,
}

struct FakeGenerator {
    reply: Reply,
    calls: AtomicUsize,
}

impl FakeGenerator {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for FakeGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> MerchResult<Option<ImageData>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        match self.reply {
            Reply::Image => Ok(Some(ImageData {
                mime_type: "image/png".into(),
                data: "TU9DS1VQ".into(),
            })),
            Reply::Nothing => Ok(None),
            Reply::Error => Err(MerchError::ExternalCallFailed("HTTP 503".into())),
        }
    }
}

type Service = GenerationService<MemoryAccountRepository, MemorySessionRepository>;

struct Fixture {
    svc: Arc<Service>,
    sessions: Arc<SessionService<MemoryAccountRepository, MemorySessionRepository>>,
    accounts: MemoryAccountRepository,
    clock: Arc<ManualClock>,
    generator: Arc<FakeGenerator>,
}

fn setup(reply: Reply) -> Fixture {
    let clock = Arc::new(ManualClock::on(
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
    ));
    let accounts = MemoryAccountRepository::new();
    let sessions = Arc::new(SessionService::new(
        accounts.clone(),
        MemorySessionRepository::new(),
        clock.clone(),
        AuthConfig::default(),
    ));
    let generator = FakeGenerator::new(reply);
    let svc = Arc::new(GenerationService::new(
        sessions.clone(),
        QuotaLedger::new(accounts.clone(), clock.clone()),
        generator.clone(),
    ));
    Fixture {
        svc,
        sessions,
        accounts,
        clock,
        generator,
    }
}

async fn sign_in(fx: &Fixture, sub: &str) -> String {
    fx.sessions
        .sign_in(VerifiedIdentity {
            subject: sub.into(),
            email: format!("{sub}@example.com"),
            name: sub.into(),
            picture: None,
        })
        .await
        .unwrap()
        .session_token
}

fn create_request() -> GenerationRequest {
    GenerationRequest::Create {
        logo: ImageData {
            mime_type: "image/png".into(),
            data: "TE9HTw==".into(),
        },
        product_type: ProductType::TShirt,
        color: Some("black".into()),
        prompt: Some("retro".into()),
    }
}

async fn used_today(fx: &Fixture, sub: &str) -> u32 {
    fx.accounts
        .get(&sub.into())
        .await
        .unwrap()
        .unwrap()
        .generations_used_today()
}

#[tokio::test]
async fn successful_generation_charges_one_unit() {
    let fx = setup(Reply::Image);
    let token = sign_in(&fx, "alice").await;

    let mockup = fx
        .svc
        .handle(Some(token.as_str()), create_request())
        .await
        .unwrap();

    assert_eq!(mockup.generations_used_today, 1);
    assert_eq!(mockup.image.data, "TU9DS1VQ");
    assert_eq!(mockup.product_type, Some(ProductType::TShirt));
    assert_eq!(mockup.prompt.as_deref(), Some("retro"));
    assert_eq!(fx.generator.calls(), 1);
    assert_eq!(used_today(&fx, "alice").await, 1);
}

#[tokio::test]
async fn sixth_request_is_denied_without_calling_provider() {
    let fx = setup(Reply::Image);
    let token = sign_in(&fx, "alice").await;

    for expected in 1..=5 {
        let mockup = fx
            .svc
            .handle(Some(token.as_str()), create_request())
            .await
            .unwrap();
        assert_eq!(mockup.generations_used_today, expected);
    }

    let err = fx
        .svc
        .handle(Some(token.as_str()), create_request())
        .await
        .unwrap_err();
    assert!(matches!(err, MerchError::LimitReached { limit: 5 }));
    assert_eq!(fx.generator.calls(), 5);
    assert_eq!(used_today(&fx, "alice").await, 5);
}

#[tokio::test]
async fn limit_resets_on_next_day() {
    let fx = setup(Reply::Image);
    let token = sign_in(&fx, "alice").await;
    for _ in 0..5 {
        fx.svc
            .handle(Some(token.as_str()), create_request())
            .await
            .unwrap();
    }

    fx.clock.advance_days(1);
    let mockup = fx
        .svc
        .handle(Some(token.as_str()), create_request())
        .await
        .unwrap();
    assert_eq!(mockup.generations_used_today, 1);
}

#[tokio::test]
async fn missing_image_fails_and_keeps_the_charge() {
    let fx = setup(Reply::Nothing);
    let token = sign_in(&fx, "alice").await;

    let err = fx
        .svc
        .handle(Some(token.as_str()), create_request())
        .await
        .unwrap_err();

    assert!(matches!(err, MerchError::ExternalCallFailed(ref cause) if cause == NO_IMAGE_RETURNED));
    assert!(err.is_retryable());
    assert_eq!(used_today(&fx, "alice").await, 1);
}

#[tokio::test]
async fn provider_error_fails_and_keeps_the_charge() {
    let fx = setup(Reply::Error);
    let token = sign_in(&fx, "alice").await;

    let err = fx
        .svc
        .handle(Some(token.as_str()), create_request())
        .await
        .unwrap_err();

    assert!(matches!(err, MerchError::ExternalCallFailed(_)));
    assert_eq!(used_today(&fx, "alice").await, 1);
}

#[tokio::test]
async fn unknown_or_missing_token_is_unauthenticated() {
    let fx = setup(Reply::Image);

    for token in [None, Some("not-a-session")] {
        let err = fx.svc.handle(token, create_request()).await.unwrap_err();
        assert!(matches!(err, MerchError::Unauthenticated));
    }
    assert_eq!(fx.generator.calls(), 0);
}

#[tokio::test]
async fn deleted_account_reports_session_expired_once() {
    let fx = setup(Reply::Image);
    let token = sign_in(&fx, "alice").await;
    fx.accounts.delete(&"alice".into()).await.unwrap();

    let err = fx
        .svc
        .handle(Some(token.as_str()), create_request())
        .await
        .unwrap_err();
    assert!(matches!(err, MerchError::SessionExpired));

    // The binding was cleared by the first attempt.
    let err = fx
        .svc
        .handle(Some(token.as_str()), create_request())
        .await
        .unwrap_err();
    assert!(matches!(err, MerchError::Unauthenticated));
    assert_eq!(fx.generator.calls(), 0);
}

#[tokio::test]
async fn edit_request_is_charged_like_create() {
    let fx = setup(Reply::Image);
    let token = sign_in(&fx, "alice").await;
    let image = ImageData {
        mime_type: "image/png".into(),
        data: "TU9DSw==".into(),
    };

    let mockup = fx
        .svc
        .handle(
            Some(token.as_str()),
            GenerationRequest::Edit {
                current_mockup: image.clone(),
                logo: image,
                instruction: "make it red".into(),
                product_type: Some(ProductType::Mug),
            },
        )
        .await
        .unwrap();

    assert_eq!(mockup.prompt.as_deref(), Some("make it red"));
    assert_eq!(mockup.product_type, Some(ProductType::Mug));
    assert_eq!(used_today(&fx, "alice").await, 1);
}

#[tokio::test]
async fn blank_edit_instruction_is_rejected_before_charging() {
    let fx = setup(Reply::Image);
    let token = sign_in(&fx, "alice").await;
    let image = ImageData {
        mime_type: "image/png".into(),
        data: "TU9DSw==".into(),
    };

    let err = fx
        .svc
        .handle(
            Some(token.as_str()),
            GenerationRequest::Edit {
                current_mockup: image.clone(),
                logo: image,
                instruction: "   ".into(),
                product_type: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, MerchError::Validation { .. }));
    assert_eq!(used_today(&fx, "alice").await, 0);
    assert_eq!(fx.generator.calls(), 0);
}

#[tokio::test]
async fn entitled_account_is_never_capped() {
    let fx = setup(Reply::Image);
    let token = sign_in(&fx, "alice").await;
    QuotaLedger::new(fx.accounts.clone(), fx.clock.clone())
        .grant_entitlement(&"alice".into())
        .await
        .unwrap();

    for expected in 1..=8 {
        let mockup = fx
            .svc
            .handle(Some(token.as_str()), create_request())
            .await
            .unwrap();
        assert_eq!(mockup.generations_used_today, expected);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_never_exceed_the_limit() {
    let fx = setup(Reply::Image);
    let token = sign_in(&fx, "alice").await;
    for _ in 0..3 {
        fx.svc
            .handle(Some(token.as_str()), create_request())
            .await
            .unwrap();
    }

    let mut handles = Vec::new();
    for _ in 0..10 {
        let svc = fx.svc.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            svc.handle(Some(token.as_str()), create_request()).await
        }));
    }

    let mut allowed = 0;
    let mut denied = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => allowed += 1,
            Err(MerchError::LimitReached { .. }) => denied += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(allowed, 2);
    assert_eq!(denied, 8);
    assert_eq!(fx.generator.calls(), 5);
    assert_eq!(used_today(&fx, "alice").await, 5);
}
