//! Wire shapes for user records and search payloads.
//!
//! Decoding is parse-or-default: a missing or mistyped optional field becomes
//! `None` instead of failing the whole record, and the payload envelope follows
//! the rules in [`decode_search_payload`].

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::contract::model::{Address, Company, SearchResult, User, UserId};
use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserIdDto {
    Number(u64),
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: UserIdDto,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub ssn: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressDto>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyDto>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressDto {
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyDto {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
}

/// Accept any JSON value; keep it only if it converts into `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| serde_json::from_value(v).ok()))
}

// --- conversions ---

impl From<UserIdDto> for UserId {
    fn from(dto: UserIdDto) -> Self {
        match dto {
            UserIdDto::Number(n) => UserId::Number(n),
            UserIdDto::Text(s) => UserId::Text(s),
        }
    }
}

impl From<&UserId> for UserIdDto {
    fn from(id: &UserId) -> Self {
        match id {
            UserId::Number(n) => UserIdDto::Number(*n),
            UserId::Text(s) => UserIdDto::Text(s.clone()),
        }
    }
}

impl From<UserDto> for User {
    fn from(dto: UserDto) -> Self {
        Self {
            id: dto.id.into(),
            first_name: dto.first_name.unwrap_or_default(),
            last_name: dto.last_name.unwrap_or_default(),
            age: dto.age,
            role: dto.role,
            ssn: dto.ssn,
            email: dto.email,
            phone: dto.phone,
            address: dto.address.map(|a| Address {
                address: a.address,
                city: a.city,
                state: a.state,
                country: a.country,
            }),
            company: dto.company.map(|c| Company {
                name: c.name,
                department: c.department,
                title: c.title,
            }),
            image: dto.image,
        }
    }
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: (&user.id).into(),
            first_name: Some(user.first_name.clone()),
            last_name: Some(user.last_name.clone()),
            age: user.age,
            role: user.role.clone(),
            ssn: user.ssn.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            address: user.address.as_ref().map(|a| AddressDto {
                address: a.address.clone(),
                city: a.city.clone(),
                state: a.state.clone(),
                country: a.country.clone(),
            }),
            company: user.company.as_ref().map(|c| CompanyDto {
                name: c.name.clone(),
                department: c.department.clone(),
                title: c.title.clone(),
            }),
            image: user.image.clone(),
        }
    }
}

// --- payload decoding ---

/// Decode the entries of a `users` array. Entries that are not objects or lack
/// an `id` are dropped.
pub fn decode_users(entries: &[Value]) -> Vec<User> {
    let users: Vec<User> = entries
        .iter()
        .filter_map(|e| UserDto::deserialize(e).ok().map(User::from))
        .collect();
    let dropped = entries.len() - users.len();
    if dropped > 0 {
        debug!(dropped, "Skipped undecodable user entries");
    }
    users
}

/// Parse-or-default decoding of a backend search response:
/// - body must be a JSON object, anything else is `MalformedPayload`
/// - `users` defaults to `[]` when absent or not an array
/// - `total` defaults to `users.len()` when absent or not a non-negative integer
pub fn decode_search_payload(body: &[u8]) -> Result<SearchResult, DomainError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(DomainError::malformed_payload("empty response body"));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| DomainError::malformed_payload(format!("invalid JSON: {e}")))?;

    let Value::Object(obj) = value else {
        return Err(DomainError::malformed_payload(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )));
    };

    let users = obj
        .get("users")
        .and_then(Value::as_array)
        .map(|entries| decode_users(entries))
        .unwrap_or_default();
    let total = obj
        .get("total")
        .and_then(numeric_total)
        .unwrap_or(users.len() as u64);

    Ok(SearchResult { users, total })
}

/// Any JSON number is a total: fractions truncate, negatives clamp to 0.
fn numeric_total(v: &Value) -> Option<u64> {
    let Value::Number(n) = v else {
        return None;
    };
    n.as_u64()
        .or_else(|| n.as_i64().map(|_| 0))
        .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.max(0.0) as u64))
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
