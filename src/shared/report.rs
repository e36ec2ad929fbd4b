//! Report Data Structures
//!
//! An incident report moves through three shapes:
//!
//! - [`ReportDraft`] - raw form input, possibly incomplete
//! - [`ReportPayload`] - validated business fields, the exact JSON body sent
//!   to `POST /reports` and the payload stored in the offline queue
//! - [`Report`] - a report accepted by the server, with its server id,
//!   timestamp and review status
//!
//! All JSON uses camelCase field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::error::SharedError;

/// Reporter name recorded for anonymous reports
pub const ANONYMOUS_REPORTER: &str = "Anonymous";

/// Review status the server assigns to newly stored reports
pub const PENDING_REVIEW: &str = "Pending review";

/// Incident category, used by the backend to route reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Facilities and maintenance
    GeneralServices,
    /// IT equipment and systems
    Technology,
    /// Health, safety and environment
    Safety,
    /// Anything else
    Other,
}

impl Category {
    /// All categories, in display order
    pub const ALL: [Category; 4] = [
        Category::GeneralServices,
        Category::Technology,
        Category::Safety,
        Category::Other,
    ];

    /// Wire identifier (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::GeneralServices => "general-services",
            Category::Technology => "technology",
            Category::Safety => "safety",
            Category::Other => "other",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Category::GeneralServices => "General Services",
            Category::Technology => "Technology",
            Category::Safety => "Health & Safety",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| SharedError::validation("category", format!("unknown category '{}'", s)))
    }
}

/// Urgency level chosen by the reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            other => Err(SharedError::validation("priority", format!("unknown priority '{}'", other))),
        }
    }
}

/// Validated business fields of a report
///
/// This is transmitted verbatim to the server. The offline queue wraps it
/// with its own metadata but never alters it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    /// Short incident title
    pub title: String,
    /// Optional free-text details
    #[serde(default)]
    pub description: String,
    /// Where the incident was observed
    pub location: String,
    /// Routing category
    pub category: Category,
    /// Urgency
    #[serde(default)]
    pub priority: Priority,
    /// Attached photos, base64-encoded JPEG
    #[serde(default)]
    pub images: Vec<String>,
    /// Reporter display name, `ANONYMOUS_REPORTER` when anonymous
    #[serde(default)]
    pub reporter_name: String,
    /// Whether the reporter asked to stay anonymous
    #[serde(default)]
    pub is_anonymous: bool,
}

impl ReportPayload {
    /// Create a payload with the required fields and defaults for the rest
    pub fn new(title: impl Into<String>, location: impl Into<String>, category: Category) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            location: location.into(),
            category,
            priority: Priority::default(),
            images: Vec::new(),
            reporter_name: String::new(),
            is_anonymous: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Check the fields a report cannot be stored without
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.title.trim().is_empty() {
            return Err(SharedError::validation("title", "Title is required"));
        }
        if self.location.trim().is_empty() {
            return Err(SharedError::validation("location", "Location is required"));
        }
        Ok(())
    }
}

/// Raw form input before validation
#[derive(Debug, Clone, Default)]
pub struct ReportDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: Option<Category>,
    pub priority: Priority,
    pub images: Vec<String>,
    pub reporter_name: String,
    pub is_anonymous: bool,
}

impl ReportDraft {
    /// Validate the draft and produce the payload to send
    ///
    /// Title, location and category are required. Anonymous drafts drop the
    /// typed reporter name.
    pub fn into_payload(self) -> Result<ReportPayload, SharedError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(SharedError::validation("title", "Title is required"));
        }
        let location = self.location.trim();
        if location.is_empty() {
            return Err(SharedError::validation("location", "Location is required"));
        }
        let category = self
            .category
            .ok_or_else(|| SharedError::validation("category", "Category is required"))?;

        let reporter_name = if self.is_anonymous {
            ANONYMOUS_REPORTER.to_string()
        } else {
            self.reporter_name.trim().to_string()
        };

        Ok(ReportPayload {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            location: location.to_string(),
            category,
            priority: self.priority,
            images: self.images,
            reporter_name,
            is_anonymous: self.is_anonymous,
        })
    }
}

/// A report accepted and stored by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Server-assigned identifier
    pub id: String,
    /// Business fields as submitted
    #[serde(flatten)]
    pub payload: ReportPayload,
    /// Server receive time
    pub timestamp: DateTime<Utc>,
    /// Review status
    pub status: String,
}
