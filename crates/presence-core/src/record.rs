//! The presence record and its input shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Server-assigned record identifier
pub type RecordId = i64;

/// Line status of a presence record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStatus {
    Online,
    Offline,
}

impl LineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineStatus::Online => "online",
            LineStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for LineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(LineStatus::Online),
            "offline" => Ok(LineStatus::Offline),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

/// A persisted presence record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "lineStatus")]
    pub status: LineStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPresence {
    name: String,
    status: LineStatus,
}

impl NewPresence {
    pub fn new(name: impl Into<String>, status: LineStatus) -> Result<Self, ValidationError> {
        let name = name.into();
        check_name(&name)?;
        Ok(Self { name, status })
    }

    /// Build from loosely-typed request fields. Both are required.
    pub fn from_parts(
        name: Option<String>,
        status: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let name = name.ok_or(ValidationError::MissingName)?;
        let status = status.ok_or(ValidationError::MissingStatus)?.parse()?;
        Self::new(name, status)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> LineStatus {
        self.status
    }

    /// Materialise the record once an id has been assigned
    pub(crate) fn into_record(self, id: RecordId, now: DateTime<Utc>) -> PresenceRecord {
        PresenceRecord {
            id,
            name: self.name,
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresencePatch {
    name: Option<String>,
    status: Option<LineStatus>,
}

impl PresencePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        name: Option<String>,
        status: Option<&str>,
    ) -> Result<Self, ValidationError> {
        if let Some(name) = &name {
            check_name(name)?;
        }
        let status = status.map(LineStatus::from_str).transpose()?;
        Ok(Self { name, status })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        check_name(&name)?;
        self.name = Some(name);
        Ok(self)
    }

    pub fn with_status(mut self, status: LineStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn status(&self) -> Option<LineStatus> {
        self.status
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.status.is_none()
    }

    /// Apply to `record` and refresh its `updated_at`
    pub fn apply(&self, record: &mut PresenceRecord, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        record.updated_at = now;
    }
}

fn check_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}
