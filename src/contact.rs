use std::fmt;

use crate::enrich::EnrichStep;

pub const DEFAULT_LIMIT: u8 = 5;
pub const MAX_LIMIT: u8 = 10;

/// Prefix the API uses for emails hidden behind a credit unlock.
const LOCKED_EMAIL_PREFIX: &str = "email_not_unlocked";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Please enter both domain and designation.")]
    MissingField,
}

/// A validated search request: company domain, job title keyword, optional
/// location and a result limit in `1..=MAX_LIMIT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub domain: String,
    pub designation: String,
    pub location: Option<String>,
    pub limit: u8,
}

impl SearchQuery {
    pub fn new(
        domain: &str,
        designation: &str,
        location: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Self, QueryError> {
        let domain = domain.trim().to_lowercase();
        let designation = designation.trim().to_string();
        if domain.is_empty() || designation.is_empty() {
            return Err(QueryError::MissingField);
        }

        let location = location
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from);
        let limit = limit
            .unwrap_or(u32::from(DEFAULT_LIMIT))
            .clamp(1, u32::from(MAX_LIMIT)) as u8;

        Ok(Self {
            domain,
            designation,
            location,
            limit,
        })
    }

    /// One-line description of a finished search, e.g.
    /// `Found 3 people for 'HR Manager' at 'tcs.com' in 'Mumbai'`.
    pub fn summary(&self, found: usize) -> String {
        let noun = if found == 1 { "person" } else { "people" };
        let mut line = format!(
            "Found {found} {noun} for '{}' at '{}'",
            self.designation, self.domain
        );
        if let Some(location) = &self.location {
            line.push_str(&format!(" in '{location}'"));
        }
        line
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PhoneSource {
    #[default]
    Individual,
    Company,
}

impl fmt::Display for PhoneSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhoneSource::Individual => f.write_str("Individual"),
            PhoneSource::Company => f.write_str("Company"),
        }
    }
}

/// One row of output. Every field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub email: String,
    pub phones: Vec<String>,
    pub phone_source: PhoneSource,
    pub organization: String,
    pub linkedin: String,
    pub location: String,
    /// Enrichment steps attempted for this contact, in order.
    pub steps: Vec<EnrichStep>,
}

impl Contact {
    pub fn phone_display(&self) -> String {
        self.phones.join(", ")
    }

    pub fn email_missing(&self) -> bool {
        is_email_missing(&self.email)
    }
}

pub(crate) fn is_email_missing(email: &str) -> bool {
    email.is_empty() || email.starts_with(LOCKED_EMAIL_PREFIX)
}
