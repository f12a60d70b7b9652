use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DEFAULT_CURRENCY: &str = "EUR";

/// Operation types offered by the create form.
pub const OPERATION_TYPES: &[&str] = &["cash", "entrada", "cripto"];

pub const CURRENCIES: &[&str] = &["EUR", "USD", "GBP"];

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Backend-assigned identifier; the database hands out integers but the
/// client never does arithmetic on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => TransactionId(n.to_string()),
            RawId::Text(s) => TransactionId(s),
        })
    }
}

// NUMERIC columns may come back as strings depending on the backend's encoder.
fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
        Null(()),
    }

    Ok(match RawAmount::deserialize(deserializer)? {
        RawAmount::Number(n) => n,
        RawAmount::Text(s) => s.trim().parse().unwrap_or_else(|_| {
            log::warn!("Unreadable importe {:?}, showing 0", s);
            0.0
        }),
        RawAmount::Null(()) => 0.0,
    })
}

// Nullable TEXT columns: an explicit null reads the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_currency<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default_currency))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    #[default]
    Pendiente,
    RecogidaPendiente,
    Finalizada,
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Pendiente => "pendiente",
            Status::RecogidaPendiente => "recogida_pendiente",
            Status::Finalizada => "finalizada",
            Status::Other(s) => s,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Status::Pendiente => "Pendiente",
            Status::RecogidaPendiente => "Recogida pendiente",
            Status::Finalizada => "Finalizada",
            Status::Other(s) => s,
        }
    }

    /// Transitions the client offers. The backend decides whether a
    /// requested transition is actually legal.
    pub fn next_states(&self) -> Vec<Status> {
        match self {
            Status::Pendiente => vec![Status::Finalizada, Status::RecogidaPendiente],
            Status::RecogidaPendiente => vec![Status::Finalizada],
            Status::Finalizada | Status::Other(_) => Vec::new(),
        }
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pendiente" => Status::Pendiente,
            "recogida_pendiente" => Status::RecogidaPendiente,
            "finalizada" => Status::Finalizada,
            _ => Status::Other(value),
        }
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: Option<TransactionId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tipo: String,
    #[serde(default)]
    pub cliente: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub importe: f64,
    #[serde(default = "default_currency", deserialize_with = "lenient_currency")]
    pub moneda: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub estado: Status,
    #[serde(default)]
    pub usuario: Option<String>,
    #[serde(default, alias = "tienda")]
    pub oficina: Option<String>,
    #[serde(default)]
    pub fecha: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    pub tipo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cliente: Option<String>,
    pub importe: f64,
    pub moneda: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usuario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oficina: Option<String>,
}

impl NewTransaction {
    pub fn new(tipo: impl Into<String>, importe: f64) -> Self {
        Self {
            tipo: tipo.into(),
            cliente: None,
            importe,
            moneda: DEFAULT_CURRENCY.to_string(),
            usuario: None,
            oficina: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cliente: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importe: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moneda: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<Status>,
}

impl TransactionPatch {
    pub fn status(estado: Status) -> Self {
        Self {
            estado: Some(estado),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tipo.is_none()
            && self.cliente.is_none()
            && self.importe.is_none()
            && self.moneda.is_none()
            && self.estado.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginGrant {
    pub token: String,
    pub username: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Created {
    pub id: Option<TransactionId>,
    pub fecha: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Balance {
    pub total: f64,
}

/// `fecha` switches listing into daily-report mode.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransactionFilter {
    pub fecha: Option<chrono::NaiveDate>,
}

impl TransactionFilter {
    pub fn daily(fecha: chrono::NaiveDate) -> Self {
        Self { fecha: Some(fecha) }
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn number_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts `{token}`, `{ok, token}` and `{user: {...}}`. Without a token
/// there is no grant.
pub fn normalize_login(data: &Value) -> Option<LoginGrant> {
    let user = data.get("user").filter(|u| u.is_object());
    let token = str_field(data, "token").or_else(|| user.and_then(|u| str_field(u, "token")))?;
    let username =
        str_field(data, "username").or_else(|| user.and_then(|u| str_field(u, "username")));
    let branch = str_field(data, "tienda")
        .or_else(|| str_field(data, "branch"))
        .or_else(|| user.and_then(|u| str_field(u, "tienda")));

    Some(LoginGrant {
        token: token.to_string(),
        username: username.map(str::to_string),
        branch: branch.map(str::to_string),
    })
}

const LIST_KEYS: &[&str] = &["operaciones", "daily", "data"];

/// Flattens every list shape the backend uses (bare array, `{operaciones}`,
/// `{daily}`, `{data}`) into one vector. Anything else is an empty list.
pub fn normalize_transactions(data: Option<&Value>) -> Vec<Transaction> {
    match data {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match Transaction::deserialize(item) {
                Ok(tx) => Some(tx),
                Err(e) => {
                    log::warn!("Skipping malformed operación: {}", e);
                    None
                }
            })
            .collect(),
        Some(obj @ Value::Object(_)) => LIST_KEYS
            .iter()
            .find_map(|key| obj.get(*key).filter(|v| v.is_array() || v.is_object()))
            .map(|inner| normalize_transactions(Some(inner)))
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

pub fn normalize_created(data: Option<&Value>) -> Created {
    let id = data
        .and_then(|d| d.get("id"))
        .and_then(|id| TransactionId::deserialize(id).ok());
    let fecha = data
        .and_then(|d| str_field(d, "fecha"))
        .map(str::to_string);
    Created { id, fecha }
}

pub fn normalize_balance(data: Option<&Value>) -> Balance {
    Balance {
        total: data.and_then(|d| number_field(d, "total")).unwrap_or(0.0),
    }
}

pub fn format_amount(importe: f64, moneda: &str) -> String {
    format!("{:.2} {}", importe, moneda)
}
