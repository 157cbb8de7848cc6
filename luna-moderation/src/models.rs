use serde::{Deserialize, Serialize};
use uuid::Uuid;

use luna_store::Entity;

fn synthesized(id: &mut String) {
    if id.is_empty() {
        *id = Uuid::new_v4().to_string();
    }
}

// --- PremiumRequest ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PremiumStatus {
    Pending,
    Approved,
}

/// A user's request for the premium upgrade, decided by a moderator.
/// Approved requests are retained for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumRequest {
    #[serde(default)]
    pub id: String,
    pub user_id: i64,
    pub user_name: String,
    /// Contact handle the moderator reaches the user on to settle payment.
    pub contact: String,
    pub status: PremiumStatus,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumRequestPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PremiumStatus>,
}

impl Entity for PremiumRequest {
    type Id = String;
    type Patch = PremiumRequestPatch;
    const COLLECTION: &'static str = "premium_requests";

    fn id(&self) -> String {
        self.id.clone()
    }

    fn ensure_id(&mut self) {
        synthesized(&mut self.id);
    }
}

// --- Report ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Open,
    Resolved,
}

/// One user accusing another. Resolving the report and blocking the reported
/// user are separate moderator actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(default)]
    pub id: String,
    pub reporter_id: i64,
    pub reported_id: i64,
    pub reason: String,
    pub status: ReportStatus,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReportStatus>,
}

impl Entity for Report {
    type Id = String;
    type Patch = ReportPatch;
    const COLLECTION: &'static str = "reports";

    fn id(&self) -> String {
        self.id.clone()
    }

    fn ensure_id(&mut self) {
        synthesized(&mut self.id);
    }
}

// --- Review status shared by age-verification and unban requests ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

// --- AgeVerificationRequest ---

/// A submitted document photo awaiting moderator review. The photo reference
/// is opaque to the core; the upload collaborator produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeVerificationRequest {
    #[serde(default)]
    pub id: String,
    pub user_id: i64,
    pub user_name: String,
    pub document_photo_url: String,
    pub status: ReviewStatus,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeVerificationRequestPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReviewStatus>,
}

impl Entity for AgeVerificationRequest {
    type Id = String;
    type Patch = AgeVerificationRequestPatch;
    const COLLECTION: &'static str = "age_verification_requests";

    fn id(&self) -> String {
        self.id.clone()
    }

    fn ensure_id(&mut self) {
        synthesized(&mut self.id);
    }
}

// --- UnbanRequest ---

/// A blocked user's appeal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnbanRequest {
    #[serde(default)]
    pub id: String,
    pub user_id: i64,
    pub user_name: String,
    pub reason: String,
    pub status: ReviewStatus,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnbanRequestPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReviewStatus>,
}

impl Entity for UnbanRequest {
    type Id = String;
    type Patch = UnbanRequestPatch;
    const COLLECTION: &'static str = "unban_requests";

    fn id(&self) -> String {
        self.id.clone()
    }

    fn ensure_id(&mut self) {
        synthesized(&mut self.id);
    }
}

// --- Ticket ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Closed,
}

/// A support conversation. At most one reply; replying closes the ticket and
/// re-opening is not modeled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(default)]
    pub id: String,
    pub user_id: i64,
    pub user_name: String,
    pub subject: String,
    pub message: String,
    pub status: TicketStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
}

impl Entity for Ticket {
    type Id = String;
    type Patch = TicketPatch;
    const COLLECTION: &'static str = "tickets";

    fn id(&self) -> String {
        self.id.clone()
    }

    fn ensure_id(&mut self) {
        synthesized(&mut self.id);
    }
}
