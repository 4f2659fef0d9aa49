/// Survey entry definitions
///
/// Field values are held the way the SQLite column affinity of the `entries`
/// table stores them. Numeric columns take numbers and numeric strings as
/// numbers and keep anything else (an unanswered question arrives as `""`)
/// as text. JSON `null` and absent keys become SQL NULL. No record is
/// rejected for its field values.
use rusqlite::types::Value;
use serde::{Deserialize, Deserializer};

/// One survey submission (a field visit to a parcel)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Entry {
    /// Title assigned by the collection form
    #[serde(default, deserialize_with = "text_affinity")]
    pub title: Option<String>,

    /// Parcel/lot identifier
    #[serde(default = "null", deserialize_with = "integer_affinity")]
    pub partida: Value,

    /// Declared owner or holder of the parcel
    #[serde(default, deserialize_with = "text_affinity")]
    pub titular: Option<String>,

    /// Visit date, kept exactly as the form encoded it
    #[serde(default, deserialize_with = "text_affinity")]
    pub fecha_visita: Option<String>,

    #[serde(default = "null", deserialize_with = "real_affinity")]
    pub latitud: Value,

    #[serde(default = "null", deserialize_with = "real_affinity")]
    pub longitud: Value,

    /// Official record number
    #[serde(default = "null", deserialize_with = "integer_affinity")]
    pub numero_acta: Value,

    /// Notified amount, stored as text without currency parsing
    #[serde(default, deserialize_with = "text_affinity")]
    pub monto_notificado: Option<String>,
}

impl Entry {
    /// Short human-readable identification for log lines
    pub fn label(&self) -> String {
        format!(
            "'{}' (partida {}, acta {})",
            self.title.as_deref().unwrap_or("NULL"),
            display_value(&self.partida),
            display_value(&self.numero_acta)
        )
    }
}

/// Renders a field value the way `sqlite3` prints it
fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => format!("{:?}", f),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

fn null() -> Value {
    Value::Null
}

/// Parses text SQLite would accept as a numeric literal
///
/// `inf` and `NaN` are not numeric literals to SQLite, so non-finite results
/// count as plain text.
fn numeric_text(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Value::Integer(i));
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => Some(Value::Real(f)),
        _ => None,
    }
}

/// A real that holds an exact integer is stored as INTEGER in an INTEGER column
fn integral(f: f64) -> Value {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Value::Integer(f as i64)
    } else {
        Value::Real(f)
    }
}

fn integer_affinity<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Repr>::deserialize(deserializer)? {
        None => Value::Null,
        Some(Repr::Bool(b)) => Value::Integer(i64::from(b)),
        Some(Repr::Integer(i)) => Value::Integer(i),
        Some(Repr::Real(f)) => integral(f),
        Some(Repr::Text(text)) => match numeric_text(&text) {
            Some(Value::Real(f)) => integral(f),
            Some(value) => value,
            None => Value::Text(text),
        },
    })
}

fn real_affinity<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Repr>::deserialize(deserializer)? {
        None => Value::Null,
        Some(Repr::Bool(b)) => Value::Real(f64::from(u8::from(b))),
        Some(Repr::Integer(i)) => Value::Real(i as f64),
        Some(Repr::Real(f)) => Value::Real(f),
        Some(Repr::Text(text)) => match numeric_text(&text) {
            Some(Value::Integer(i)) => Value::Real(i as f64),
            Some(value) => value,
            None => Value::Text(text),
        },
    })
}

fn text_affinity<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Repr>::deserialize(deserializer)?.map(|repr| match repr {
        Repr::Bool(b) => u8::from(b).to_string(),
        Repr::Integer(i) => i.to_string(),
        Repr::Real(f) => format!("{:?}", f),
        Repr::Text(text) => text,
    }))
}
