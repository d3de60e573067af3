use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of one pipeline execution, threaded through every write and the run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for RunId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// One contact row as produced by the source, fields verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub company: String,
    pub given_name: String,
    pub family_name: String,
    pub title: String,
    pub email: String,
    /// Timestamp of first contact, unparsed
    pub first_contact: String,
}

impl RawRecord {
    /// Sources drop records missing any of company, given name or email.
    pub fn has_required_fields(&self) -> bool {
        !self.company.is_empty() && !self.given_name.is_empty() && !self.email.is_empty()
    }
}

/// A raw record that passed every eligibility rule.
///
/// Only the eligibility filter hands these out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibleRecord(RawRecord);

impl EligibleRecord {
    pub(crate) fn new(record: RawRecord) -> Self {
        Self(record)
    }

    pub fn record(&self) -> &RawRecord {
        &self.0
    }
}

/// Deduplication key: (company, email), compared case-sensitively
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NaturalKey {
    pub company: String,
    pub email: String,
}

impl NaturalKey {
    pub fn new(company: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            email: email.into(),
        }
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.company, self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub given_name: String,
    pub family_name: String,
    pub title: String,
    pub email: String,
}

/// Persisted form of an eligible record. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredContact {
    pub company: String,
    pub contact: ContactDetails,
    pub first_contact_at: DateTime<Utc>,
    pub inserted_at: DateTime<Utc>,
    pub run_id: RunId,
}

impl StoredContact {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(&self.company, &self.contact.email)
    }
}

/// What the run tracker is told about one execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub count: usize,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl RunSummary {
    pub fn new(run_id: RunId, count: usize, description: impl Into<String>) -> Self {
        Self {
            run_id,
            count,
            description: description.into(),
            timestamp: Utc::now(),
        }
    }
}
