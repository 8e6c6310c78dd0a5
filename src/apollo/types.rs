use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Read a field as text. Numbers keep their JSON spelling (numeric ids);
/// anything else that is not a string becomes empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Fall back to `T::default()` when the value has an unexpected shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Keep the elements that parse; anything but an array is an empty list.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Response from `POST /mixed_people/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub people: Vec<Person>,
}

/// Response from `POST /people/enrich`.
#[derive(Debug, Default, Deserialize)]
pub struct EnrichResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub person: Option<Person>,
}

/// Response from `GET /organizations/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct OrganizationResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub organization: Option<Organization>,
}

/// A person record as returned by both search and enrichment.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Person {
    #[serde(default, deserialize_with = "lenient_string")]
    pub first_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub last_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub linkedin_url: String,
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<LocationRef>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(default, deserialize_with = "lenient")]
    pub organization: Option<Organization>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub phone_numbers: Vec<PhoneEntry>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct LocationRef {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct Organization {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(default, deserialize_with = "lenient")]
    pub primary_phone: Option<PhoneEntry>,
}

/// A phone number entry. The API returns either a bare string or an object
/// carrying one of several number fields. Anything else is `Other`, so an
/// odd entry never fails the whole response.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PhoneEntry {
    Text(String),
    Detailed {
        #[serde(default, deserialize_with = "lenient_string")]
        sanitized_number: String,
        #[serde(default, deserialize_with = "lenient_string")]
        number: String,
        #[serde(default, deserialize_with = "lenient_string")]
        value: String,
    },
    Other(IgnoredAny),
}

impl PhoneEntry {
    /// First non-empty number, preferring `sanitized_number` over `number` over `value`.
    pub fn number(&self) -> Option<&str> {
        match self {
            PhoneEntry::Text(s) => Some(s.as_str()).filter(|n| !n.is_empty()),
            PhoneEntry::Detailed {
                sanitized_number,
                number,
                value,
            } => [sanitized_number, number, value]
                .into_iter()
                .map(String::as_str)
                .find(|n| !n.is_empty()),
            PhoneEntry::Other(_) => None,
        }
    }
}

/// Body of `POST /people/enrich`, one variant per lookup strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EnrichRequest {
    LinkedIn {
        linkedin_url: String,
    },
    NameAndOrganization {
        first_name: String,
        last_name: String,
        organization_name: String,
    },
    Email {
        email: String,
    },
}

impl EnrichRequest {
    pub fn strategy(&self) -> &'static str {
        match self {
            EnrichRequest::LinkedIn { .. } => "linkedin",
            EnrichRequest::NameAndOrganization { .. } => "name_and_organization",
            EnrichRequest::Email { .. } => "email",
        }
    }
}

/// Error payload shape used by the API on non-success responses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn person_tolerates_nulls_and_missing_fields() {
        let person: Person = serde_json::from_value(json!({
            "first_name": "Asha",
            "last_name": null,
            "email": null,
            "organization": null,
            "phone_numbers": null
        }))
        .unwrap();

        assert_eq!(person.first_name, "Asha");
        assert_eq!(person.last_name, "");
        assert_eq!(person.email, "");
        assert!(person.organization.is_none());
        assert!(person.phone_numbers.is_empty());
        assert!(person.location.is_none());
    }

    #[test]
    fn phone_entries_accept_strings_objects_and_junk() {
        let person: Person = serde_json::from_value(json!({
            "phone_numbers": [
                "+1 555 0100",
                {"sanitized_number": "+15550101", "number": "(555) 0101"},
                {"number": "555-0102"},
                {"value": "555-0103"},
                {"sanitized_number": "", "number": "555-0104"},
                {"type": "mobile"},
                42
            ]
        }))
        .unwrap();

        let numbers: Vec<_> = person
            .phone_numbers
            .iter()
            .map(PhoneEntry::number)
            .collect();
        assert_eq!(
            numbers,
            vec![
                Some("+1 555 0100"),
                Some("+15550101"),
                Some("555-0102"),
                Some("555-0103"),
                Some("555-0104"),
                None,
                None,
            ]
        );
    }

    #[test]
    fn primary_phone_may_be_string_or_object() {
        let as_text: Organization =
            serde_json::from_value(json!({"primary_phone": "+91 22 6778 9999"})).unwrap();
        assert_eq!(
            as_text.primary_phone.as_ref().and_then(PhoneEntry::number),
            Some("+91 22 6778 9999")
        );

        let as_object: Organization = serde_json::from_value(json!({
            "primary_phone": {"number": "022 6778 9999", "sanitized_number": "+912267789999"}
        }))
        .unwrap();
        assert_eq!(
            as_object.primary_phone.as_ref().and_then(PhoneEntry::number),
            Some("+912267789999")
        );
    }

    #[test]
    fn enrich_requests_serialize_as_flat_objects() {
        let by_name = EnrichRequest::NameAndOrganization {
            first_name: "Asha".into(),
            last_name: "Rao".into(),
            organization_name: "Tata Consultancy Services".into(),
        };
        assert_eq!(
            serde_json::to_value(&by_name).unwrap(),
            json!({
                "first_name": "Asha",
                "last_name": "Rao",
                "organization_name": "Tata Consultancy Services"
            })
        );

        let by_email = EnrichRequest::Email {
            email: "asha@tcs.com".into(),
        };
        assert_eq!(
            serde_json::to_value(&by_email).unwrap(),
            json!({"email": "asha@tcs.com"})
        );
        assert_eq!(by_email.strategy(), "email");
    }

    #[test]
    fn search_response_defaults_to_no_people() {
        let body: SearchResponse = serde_json::from_value(json!({"pagination": {}})).unwrap();
        assert!(body.people.is_empty());

        let body: SearchResponse = serde_json::from_value(json!({"people": null})).unwrap();
        assert!(body.people.is_empty());
    }

    #[test]
    fn unexpected_scalar_types_are_stringified_or_dropped() {
        let person: Person = serde_json::from_value(json!({
            "first_name": "Asha",
            "title": ["HR", "Manager"],
            "email": false,
            "location": "Mumbai",
            "organization": {"id": 12345, "name": "TCS", "primary_phone": 912267789999u64},
            "phone_numbers": {"number": "+15550100"}
        }))
        .unwrap();

        assert_eq!(person.first_name, "Asha");
        assert_eq!(person.title, "");
        assert_eq!(person.email, "");
        assert!(person.location.is_none());
        let org = person.organization.unwrap();
        assert_eq!(org.id, "12345");
        assert_eq!(org.name, "TCS");
        assert!(org.primary_phone.as_ref().and_then(PhoneEntry::number).is_none());
        assert!(person.phone_numbers.is_empty());
    }

    #[test]
    fn one_malformed_person_does_not_drop_the_others() {
        let body: SearchResponse = serde_json::from_value(json!({
            "people": [
                {"first_name": "Asha", "organization": {"id": 12345}},
                null,
                "garbage",
                {"first_name": "Ravi", "phone_numbers": [{"sanitized_number": 15550100}]}
            ]
        }))
        .unwrap();

        let names: Vec<_> = body.people.iter().map(|p| p.first_name.as_str()).collect();
        assert_eq!(names, vec!["Asha", "Ravi"]);
        assert_eq!(body.people[1].phone_numbers[0].number(), Some("15550100"));
    }
}
