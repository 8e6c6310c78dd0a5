use tracing::{debug, warn};

use crate::apollo::ApolloClient;
use crate::apollo::types::{Organization, Person};

/// Best-effort location for a person. Falls back to the organization's
/// location, which costs one extra request.
pub(super) async fn resolve_location(client: &ApolloClient, person: &Person) -> String {
    if let Some(location) = person_location(person) {
        return location;
    }

    let org_id = person
        .organization
        .as_ref()
        .map(|o| o.id.as_str())
        .unwrap_or_default();
    if org_id.is_empty() {
        return String::new();
    }

    debug!(org_id, "falling back to organization location");
    match client.get_organization(org_id).await {
        Ok(Some(org)) => organization_location(&org),
        Ok(None) => String::new(),
        Err(e) => {
            warn!(error = %e, org_id, "error getting organization location");
            String::new()
        }
    }
}

pub(super) fn person_location(person: &Person) -> Option<String> {
    let named = person
        .location
        .as_ref()
        .map(|l| l.name.as_str())
        .unwrap_or_default();
    if !named.is_empty() {
        return Some(named.to_string());
    }
    if !person.location_name.is_empty() {
        return Some(person.location_name.clone());
    }
    join_place(&person.city, &person.state).or_else(|| join_place(&person.city, &person.country))
}

pub(super) fn organization_location(org: &Organization) -> String {
    if !org.location_name.is_empty() {
        return org.location_name.clone();
    }
    let region = if org.state.is_empty() {
        &org.country
    } else {
        &org.state
    };
    join_place(&org.city, region).unwrap_or_default()
}

fn join_place(city: &str, region: &str) -> Option<String> {
    (!city.is_empty() && !region.is_empty()).then(|| format!("{city}, {region}"))
}
