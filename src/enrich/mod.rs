//! Search followed by the per-person enrichment fallback chain.

mod location;

use std::time::Duration;

use tracing::{debug, info};

use crate::apollo::types::{EnrichRequest, Person, PhoneEntry};
use crate::apollo::{ApolloClient, ApolloError};
use crate::contact::{Contact, PhoneSource, SearchQuery, is_email_missing};
use location::resolve_location;

/// Default wait between people, so a full page does not burst the API.
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichStep {
    /// Email lookup by LinkedIn profile URL.
    LinkedIn,
    /// Email lookup by first name, last name and organization name.
    NameAndOrganization,
    /// Phone lookup by a known email.
    Email,
    /// Organization primary phone used as a last resort.
    OrganizationPhone,
}

impl From<&EnrichRequest> for EnrichStep {
    fn from(request: &EnrichRequest) -> Self {
        match request {
            EnrichRequest::LinkedIn { .. } => EnrichStep::LinkedIn,
            EnrichRequest::NameAndOrganization { .. } => EnrichStep::NameAndOrganization,
            EnrichRequest::Email { .. } => EnrichStep::Email,
        }
    }
}

/// Search for people matching `query` and fill in missing email and phone
/// data for each of them, in the order the API returned them.
pub async fn find_contacts(
    client: &ApolloClient,
    query: &SearchQuery,
    pacing: Duration,
) -> Result<Vec<Contact>, ApolloError> {
    if let Some(location) = &query.location {
        info!(location = %location, "using location filter");
    }

    let people = client.search_people(query).await?;
    info!(
        domain = %query.domain,
        designation = %query.designation,
        found = people.len(),
        "people search complete"
    );

    let total = people.len();
    let mut contacts = Vec::with_capacity(total);
    for (i, person) in people.into_iter().enumerate() {
        let contact = enrich_contact(client, person).await?;
        debug!(
            first_name = %contact.first_name,
            last_name = %contact.last_name,
            steps = ?contact.steps,
            phone_source = %contact.phone_source,
            "contact enriched"
        );
        contacts.push(contact);

        if i + 1 < total && !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }
    }

    Ok(contacts)
}

async fn enrich_contact(client: &ApolloClient, person: Person) -> Result<Contact, ApolloError> {
    let location = resolve_location(client, &person).await;

    let Person {
        first_name,
        last_name,
        title,
        email,
        linkedin_url,
        organization,
        phone_numbers,
        ..
    } = person;
    let organization = organization.unwrap_or_default();

    let mut contact = Contact {
        first_name,
        last_name,
        position: title,
        email,
        phones: collect_phones(&phone_numbers),
        phone_source: PhoneSource::Individual,
        organization: organization.name.clone(),
        linkedin: linkedin_url,
        location,
        steps: Vec::new(),
    };

    if contact.email_missing() && !contact.linkedin.is_empty() {
        let request = EnrichRequest::LinkedIn {
            linkedin_url: contact.linkedin.clone(),
        };
        run_step(client, &mut contact, &request).await?;
    }

    if contact.email_missing()
        && !contact.first_name.is_empty()
        && !contact.last_name.is_empty()
        && !contact.organization.is_empty()
    {
        let request = EnrichRequest::NameAndOrganization {
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            organization_name: contact.organization.clone(),
        };
        run_step(client, &mut contact, &request).await?;
    }

    if contact.phones.is_empty() && !is_email_missing(&contact.email) {
        let request = EnrichRequest::Email {
            email: contact.email.clone(),
        };
        run_step(client, &mut contact, &request).await?;
    }

    if contact.phones.is_empty()
        && let Some(number) = organization.primary_phone.as_ref().and_then(PhoneEntry::number)
    {
        debug!(organization = %contact.organization, "using organization phone");
        contact.steps.push(EnrichStep::OrganizationPhone);
        contact.phones.push(number.to_string());
        contact.phone_source = PhoneSource::Company;
    }

    Ok(contact)
}

/// Run one enrichment lookup and merge its result into `contact`.
///
/// Email lookups by LinkedIn or name replace the email when one comes back
/// and only fill phones that are still empty. Lookups by email only add phones.
async fn run_step(
    client: &ApolloClient,
    contact: &mut Contact,
    request: &EnrichRequest,
) -> Result<(), ApolloError> {
    let step = EnrichStep::from(request);
    debug!(step = ?step, strategy = request.strategy(), "enrichment lookup");
    contact.steps.push(step);

    let Some(enriched) = client.enrich_person(request).await? else {
        return Ok(());
    };
    let phones = collect_phones(&enriched.phone_numbers);

    match request {
        EnrichRequest::LinkedIn { .. } | EnrichRequest::NameAndOrganization { .. } => {
            if !enriched.email.is_empty() {
                contact.email = enriched.email;
            }
            if contact.phones.is_empty() {
                contact.phones = phones;
            }
        }
        EnrichRequest::Email { .. } => contact.phones.extend(phones),
    }
    Ok(())
}

fn collect_phones(entries: &[PhoneEntry]) -> Vec<String> {
    entries
        .iter()
        .filter_map(PhoneEntry::number)
        .map(String::from)
        .collect()
}
