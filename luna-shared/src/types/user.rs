use serde::{Deserialize, Serialize};

/// A geographic point shared by users who opted into location sharing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// A registered member. The id is assigned by the external identity provider
/// and never changes; trust/status flags are mutated only by moderation
/// decisions, the rest by the owner through profile edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub gender: Gender,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    pub is_verified: bool,
    pub is_premium: bool,
    pub is_blocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ban_reason: Option<String>,
    #[serde(default)]
    pub is_age_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_verification_request_id: Option<String>,
    /// Unix millis of the last session start; 0 = never logged in.
    #[serde(default)]
    pub last_login: i64,
    #[serde(default)]
    pub share_location: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// Shallow-merge patch for [`User`]. Only the fields present are applied;
/// double-`Option` fields serialize an explicit `null` to clear the value.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_blocked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ban_reason: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_age_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_verification_request_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_location: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Option<GeoPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<Option<String>>,
}
