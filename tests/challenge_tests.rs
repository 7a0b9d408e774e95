//! Challenge coordinator tests
//!
//! Cover the pending → approved state machine, idempotent approval, and
//! the best-effort device push.

use tokio::sync::mpsc;
use uuid::Uuid;

use authgate_server::challenge::{ChallengeError, ChallengeService};
use authgate_server::models::ChallengeStatus;
use authgate_server::websocket::{DeviceMessage, DeviceRegistry};

fn service() -> (ChallengeService, DeviceRegistry) {
    let registry = DeviceRegistry::new();
    (ChallengeService::new(registry.clone()), registry)
}

#[tokio::test]
async fn test_create_without_device_still_yields_a_challenge() {
    let (service, _registry) = service();

    let (challenge_id, pushed) = service.create("0xabc", "dev-1").await;
    assert!(!pushed);
    assert!(Uuid::parse_str(&challenge_id).is_ok());
    assert_eq!(
        service.status(&challenge_id).await.unwrap(),
        ChallengeStatus::Pending
    );
}

#[tokio::test]
async fn test_approve_is_idempotent() {
    let (service, _registry) = service();
    let (challenge_id, _) = service.create("0xabc", "dev-1").await;

    let first = service.approve(&challenge_id).await.unwrap();
    assert!(!first.already);

    let second = service.approve(&challenge_id).await.unwrap();
    assert!(second.already);

    assert_eq!(
        service.status(&challenge_id).await.unwrap(),
        ChallengeStatus::Approved
    );
}

#[tokio::test]
async fn test_unknown_challenge_id_is_not_found() {
    let (service, _registry) = service();

    assert!(matches!(
        service.approve("no-such-id").await,
        Err(ChallengeError::NotFound)
    ));
    assert!(matches!(
        service.status("no-such-id").await,
        Err(ChallengeError::NotFound)
    ));
}

#[tokio::test]
async fn test_push_reaches_a_connected_device() {
    let (service, registry) = service();

    let (tx, mut rx) = mpsc::unbounded_channel();
    registry.register("dev-1", Uuid::new_v4(), tx).await;

    let (challenge_id, pushed) = service.create("0xabc", "dev-1").await;
    assert!(pushed);

    let DeviceMessage::FaceRequest {
        challenge_id: pushed_id,
        user_id,
        ..
    } = rx.recv().await.unwrap();
    assert_eq!(pushed_id, challenge_id);
    assert_eq!(user_id, "0xabc");
}

#[tokio::test]
async fn test_offline_device_then_approval_via_poll() {
    // The full asymmetric flow: the push fails (device offline), the
    // challenge survives, the device approves later, and the desktop
    // poll observes the transition.
    let (service, registry) = service();

    let (challenge_id, pushed) = service.create("0xabc", "dev-1").await;
    assert!(!pushed);

    let (tx, _rx) = mpsc::unbounded_channel();
    registry.register("dev-1", Uuid::new_v4(), tx).await;

    let outcome = service.approve(&challenge_id).await.unwrap();
    assert!(!outcome.already);
    assert_eq!(
        service.status(&challenge_id).await.unwrap(),
        ChallengeStatus::Approved
    );
}

#[tokio::test]
async fn test_challenges_are_independent() {
    let (service, _registry) = service();

    let (first, _) = service.create("0xabc", "dev-1").await;
    let (second, _) = service.create("0xdef", "dev-2").await;

    service.approve(&first).await.unwrap();

    assert_eq!(
        service.status(&first).await.unwrap(),
        ChallengeStatus::Approved
    );
    assert_eq!(
        service.status(&second).await.unwrap(),
        ChallengeStatus::Pending
    );
}
