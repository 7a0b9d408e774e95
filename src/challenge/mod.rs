//! Challenge coordinator
//!
//! Tracks out-of-band face-verification challenges through their
//! `pending → approved` state machine. Creation pushes a best-effort
//! notification to the target device; resolution is observed by polling,
//! so a failed push only costs latency, never the challenge itself.
//! Challenges have no expiry (known gap, kept for behavioral fidelity).

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Challenge, ChallengeStatus};
use crate::websocket::{DeviceMessage, DeviceRegistry};

/// Challenge lookup failures
#[derive(Error, Debug)]
pub enum ChallengeError {
    #[error("Unknown challenge id")]
    NotFound,
}

/// Outcome of an approval call
#[derive(Debug, Clone, Copy)]
pub struct ApprovalOutcome {
    /// True when the challenge had already been approved.
    pub already: bool,
}

/// Coordinates challenge state between the polling desktop side and the
/// approving mobile side.
pub struct ChallengeService {
    challenges: Arc<RwLock<HashMap<String, Challenge>>>,
    devices: DeviceRegistry,
}

impl ChallengeService {
    pub fn new(devices: DeviceRegistry) -> Self {
        Self {
            challenges: Arc::new(RwLock::new(HashMap::new())),
            devices,
        }
    }

    /// Create a pending challenge and push a notification to the device.
    ///
    /// Creation always succeeds; the returned flag reports whether the
    /// push was delivered. The desktop side must poll either way.
    pub async fn create(&self, user_id: &str, device_id: &str) -> (String, bool) {
        let challenge_id = Uuid::new_v4().to_string();

        let mut challenges = self.challenges.write().await;
        challenges.insert(
            challenge_id.clone(),
            Challenge {
                status: ChallengeStatus::Pending,
                user_id: user_id.to_string(),
                device_id: device_id.to_string(),
                created_at: Utc::now(),
                approved_at: None,
            },
        );
        drop(challenges);

        let pushed = self
            .devices
            .push(
                device_id,
                DeviceMessage::FaceRequest {
                    challenge_id: challenge_id.clone(),
                    user_id: user_id.to_string(),
                    message: "A new login request needs face verification".to_string(),
                },
            )
            .await;

        tracing::info!(
            challenge_id = %challenge_id,
            user_id = %user_id,
            device_id = %device_id,
            pushed_to_device = pushed,
            "Face challenge created"
        );

        (challenge_id, pushed)
    }

    /// Transition a challenge to approved. Idempotent: approving an
    /// already-approved challenge reports `already` and changes nothing.
    pub async fn approve(&self, challenge_id: &str) -> Result<ApprovalOutcome, ChallengeError> {
        let mut challenges = self.challenges.write().await;
        let challenge = challenges
            .get_mut(challenge_id)
            .ok_or(ChallengeError::NotFound)?;

        if challenge.status == ChallengeStatus::Approved {
            return Ok(ApprovalOutcome { already: true });
        }

        challenge.status = ChallengeStatus::Approved;
        challenge.approved_at = Some(Utc::now());

        tracing::info!(challenge_id = %challenge_id, "Face challenge approved");
        Ok(ApprovalOutcome { already: false })
    }

    /// Read the current status.
    pub async fn status(&self, challenge_id: &str) -> Result<ChallengeStatus, ChallengeError> {
        let challenges = self.challenges.read().await;
        challenges
            .get(challenge_id)
            .map(|challenge| challenge.status)
            .ok_or(ChallengeError::NotFound)
    }
}
