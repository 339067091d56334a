//! Car records as stored in the ledger

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LedgerError, Result};

/// Discriminator written on every record, used to scope predicate queries
pub const DOC_TYPE: &str = "car";

/// Status given to newly created cars
pub const DEFAULT_STATUS: &str = "available";

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

fn default_doc_type() -> String {
    DOC_TYPE.to_string()
}

/// A vehicle record
///
/// Serialized as a flat camelCase JSON object. Fields this type does not
/// know about are kept in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_doc_type")]
    pub doc_type: String,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub year: i64,
    #[serde(default)]
    pub mileage: u64,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Car {
    /// Decode a stored value; `key` is only used for the error message
    pub fn from_bytes(key: &str, bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| LedgerError::InvalidRecord {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    /// Encode for storage
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A value read back from a scan, query or history replay
///
/// Values that are valid JSON are returned parsed; anything else is passed
/// through as text instead of failing the whole listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Parsed(Value),
    Raw(String),
}

impl Record {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => Record::Parsed(value),
            Err(_) => Record::Raw(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Record::Raw(_))
    }

    /// Interpret as a car, if it is one
    pub fn as_car(&self) -> Option<Car> {
        match self {
            Record::Parsed(value) => serde_json::from_value(value.clone()).ok(),
            Record::Raw(_) => None,
        }
    }
}

/// `{key, record}` entry of a listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub key: String,
    pub record: Record,
}

/// One committed version of a car
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub transaction_id: String,
    /// ISO-8601 commit timestamp
    pub timestamp: String,
    pub is_delete: bool,
    /// Snapshot as committed; `None` for delete markers
    pub value: Option<Record>,
}

/// The five cars written by `initLedger`, in key order
pub fn seed_cars() -> Vec<Car> {
    let seed = |color: &str, make: &str, model: &str, owner: &str, year, mileage, price| Car {
        color: color.to_string(),
        doc_type: DOC_TYPE.to_string(),
        make: make.to_string(),
        model: model.to_string(),
        owner: owner.to_string(),
        year,
        mileage,
        price,
        status: DEFAULT_STATUS.to_string(),
        created_at: None,
        last_modified: None,
        extra: Map::new(),
    };

    vec![
        seed("blue", "Toyota", "Prius", "Tomoko", 2020, 15000, 25000.0),
        seed("red", "Ford", "Mustang", "Brad", 2019, 8000, 35000.0),
        seed("green", "Hyundai", "Tucson", "Jin Soo", 2021, 5000, 28000.0),
        seed("yellow", "Volkswagen", "Passat", "Max", 2018, 25000, 22000.0),
        seed("black", "Tesla", "S", "Adriana", 2022, 2000, 75000.0),
    ]
}

// Numeric arguments arrive as free text. Like the ledger's reference
// clients, only a leading number is read ("2020 model" -> 2020).

/// Year from text; zero or unparsable falls back to `default_year`
pub fn parse_year(text: Option<&str>, default_year: i64) -> i64 {
    text.and_then(leading_integer)
        .filter(|y| *y != 0)
        .unwrap_or(default_year)
}

/// Mileage from text; negative or unparsable is 0
pub fn parse_mileage(text: Option<&str>) -> u64 {
    text.and_then(leading_integer)
        .and_then(|m| u64::try_from(m).ok())
        .unwrap_or(0)
}

/// Price from text; unparsable or non-finite is 0
pub fn parse_price(text: Option<&str>) -> f64 {
    text.and_then(leading_float)
        .filter(|p| p.is_finite())
        .unwrap_or(0.0)
}

fn sign_len(s: &str) -> usize {
    usize::from(s.starts_with('+') || s.starts_with('-'))
}

fn digits_len(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

fn leading_integer(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let sign = sign_len(s);
    let digits = digits_len(&s[sign..]);
    if digits == 0 {
        return None;
    }
    s[..sign + digits].parse().ok()
}

fn leading_float(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let mut end = sign_len(s);
    let int_digits = digits_len(&s[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if s[end..].starts_with('.') {
        frac_digits = digits_len(&s[end + 1..]);
        if frac_digits > 0 || int_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    let rest = &s[end..];
    if rest.starts_with('e') || rest.starts_with('E') {
        let exp_sign = sign_len(&rest[1..]);
        let exp_digits = digits_len(&rest[1 + exp_sign..]);
        if exp_digits > 0 {
            end += 1 + exp_sign + exp_digits;
        }
    }
    s[..end].parse().ok()
}
