use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyfileError {
    #[error("Given wallet file is invalid.")]
    Invalid,
    #[error("Given wallet file is invalid (larger than {limit} bytes).")]
    TooLarge { limit: usize },
    #[error("Unable to read wallet file: {0}")]
    Read(String),
}

/// Encrypted wallet JSON as selected by the user. The structure is owned by
/// the signing backend; only `meta` is looked at here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletFile {
    fields: Map<String, Value>,
}

impl WalletFile {
    /// Parses a keyfile. The top level must be a JSON object. A `meta` field
    /// holding JSON text is decoded in place when possible and kept as the
    /// original string otherwise.
    pub fn parse(text: &str) -> Result<Self, KeyfileError> {
        let value: Value = serde_json::from_str(text).map_err(|_| KeyfileError::Invalid)?;
        let Value::Object(mut fields) = value else {
            return Err(KeyfileError::Invalid);
        };

        if let Some(Value::String(raw_meta)) = fields.get("meta") {
            if let Ok(decoded) = serde_json::from_str::<Value>(raw_meta) {
                fields.insert("meta".to_owned(), decoded);
            }
        }

        Ok(Self { fields })
    }

    pub fn meta(&self) -> Option<&Value> {
        self.fields.get("meta")
    }

    pub fn password_hint(&self) -> Option<&str> {
        self.meta()
            .and_then(|meta| meta.get("passwordHint"))
            .and_then(Value::as_str)
            .filter(|hint| !hint.is_empty())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}
