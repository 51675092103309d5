// ABOUTME: Wire types exchanged with the mastering service
// ABOUTME: Registration, upload credentials and status snapshots

use serde::Deserialize;

/// Envelope present on every service response.
///
/// Only an explicit `"success": false` marks a refusal.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RequestInfo {
    pub success: bool,
    pub msg: String,
}

impl Default for RequestInfo {
    fn default() -> Self {
        Self {
            success: true,
            msg: String::new(),
        }
    }
}

/// Pre-signed form fields for a single direct upload to object storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UploadCredentials {
    pub acl: String,
    pub key: String,
    pub success_action_status: String,
    #[serde(rename = "x-amz-algorithm")]
    pub algorithm: String,
    #[serde(rename = "x-amz-credential")]
    pub credential: String,
    #[serde(rename = "x-amz-date")]
    pub date: String,
    pub policy: String,
    #[serde(rename = "x-amz-signature")]
    pub signature: String,
}

impl UploadCredentials {
    /// Form fields in the order the web client sends them.
    pub fn form_fields(&self) -> [(&'static str, &str); 8] {
        [
            ("acl", self.acl.as_str()),
            ("key", self.key.as_str()),
            ("success_action_status", self.success_action_status.as_str()),
            ("x-amz-algorithm", self.algorithm.as_str()),
            ("x-amz-credential", self.credential.as_str()),
            ("x-amz-date", self.date.as_str()),
            ("policy", self.policy.as_str()),
            ("x-amz-signature", self.signature.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub request: Option<RequestInfo>,
    #[serde(rename = "statusurl")]
    pub status_url: Option<String>,
    #[serde(rename = "remasterurl")]
    pub remaster_url: Option<String>,
    #[serde(default, rename = "postvars")]
    pub credentials: UploadCredentials,
}

/// Identifies one mastering job on the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub status_url: String,
    pub remaster_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub job: JobHandle,
    pub credentials: UploadCredentials,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JobState {
    pub mastered: bool,
    #[serde(rename = "percentComplete")]
    pub percent_complete: u32,
    #[serde(rename = "statusMessage")]
    pub status_message: String,
    pub error: bool,
    #[serde(rename = "errorMessage")]
    pub error_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JobActions {
    /// Mastered file URL
    #[serde(rename = "wf")]
    pub mastered_file: String,
    /// Original file URL
    #[serde(rename = "of")]
    pub original_file: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusResponse {
    pub request: RequestInfo,
    pub sid: String,
    pub status: JobState,
    pub actions: JobActions,
}

/// Point-in-time state of a mastering job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub percent_complete: u32,
    pub mastered: bool,
    pub status_message: String,
    pub error: bool,
    pub error_message: String,
    pub mastered_url: Option<String>,
    pub original_url: Option<String>,
}

impl StatusSnapshot {
    pub fn is_complete(&self) -> bool {
        self.percent_complete == 100 || self.mastered
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

impl From<StatusResponse> for StatusSnapshot {
    fn from(response: StatusResponse) -> Self {
        let StatusResponse {
            status, actions, ..
        } = response;
        Self {
            percent_complete: status.percent_complete,
            mastered: status.mastered,
            status_message: status.status_message,
            error: status.error,
            error_message: status.error_message,
            mastered_url: non_empty(actions.mastered_file),
            original_url: non_empty(actions.original_file),
        }
    }
}
