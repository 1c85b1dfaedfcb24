use std::str::FromStr;

use serde_json::{json, Number, Value as JsonValue};

use crate::firestore::api::{DocumentData, DocumentSnapshot};
use crate::firestore::error::{internal_error, invalid_argument, FirestoreResult};
use crate::firestore::model::{DatabaseId, DocumentKey, ResourcePath};

/// Converts between plain JSON document fields and the typed value encoding
/// used by the Firestore REST API (`{"stringValue": ...}` and friends).
#[derive(Clone, Debug)]
pub struct JsonProtoSerializer {
    database_id: DatabaseId,
}

impl JsonProtoSerializer {
    pub fn new(database_id: DatabaseId) -> Self {
        Self { database_id }
    }

    pub fn encode_document_fields(&self, data: &DocumentData) -> JsonValue {
        json!({
            "fields": encode_map_fields(data)
        })
    }

    /// Decodes a REST `Document` resource into a snapshot keyed by its `name`.
    pub fn decode_document(&self, document: &JsonValue) -> FirestoreResult<DocumentSnapshot> {
        let name = document
            .get("name")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| internal_error("Firestore document missing 'name' field"))?;
        let key = self.parse_document_name(name)?;
        let data = decode_document_fields(document)?;
        Ok(DocumentSnapshot::new(key, Some(data)))
    }

    pub fn parse_document_name(&self, name: &str) -> FirestoreResult<DocumentKey> {
        let prefix = format!("{}/documents/", self.database_id.database_name());
        let relative = name.strip_prefix(&prefix).ok_or_else(|| {
            internal_error(format!(
                "Unexpected document name '{name}' returned by Firestore"
            ))
        })?;
        DocumentKey::from_path(ResourcePath::from_string(relative)?)
    }
}

/// Decodes the `fields` of a REST document; a document without fields is empty.
pub fn decode_document_fields(document: &JsonValue) -> FirestoreResult<DocumentData> {
    let object = document
        .as_object()
        .ok_or_else(|| invalid_argument("Expected object for document"))?;
    let fields = match object.get("fields") {
        Some(fields) => fields
            .as_object()
            .ok_or_else(|| invalid_argument("Expected 'fields' to be an object"))?,
        None => return Ok(DocumentData::new()),
    };

    let mut decoded = DocumentData::new();
    for (key, value) in fields {
        decoded.insert(key.clone(), decode_value(value)?);
    }
    Ok(decoded)
}

fn encode_map_fields(data: &DocumentData) -> JsonValue {
    let mut fields = serde_json::Map::new();
    for (key, value) in data {
        fields.insert(key.clone(), encode_value(value));
    }
    JsonValue::Object(fields)
}

fn encode_value(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Null => json!({ "nullValue": JsonValue::Null }),
        JsonValue::Bool(boolean) => json!({ "booleanValue": boolean }),
        JsonValue::Number(number) => match number.as_i64() {
            Some(integer) => json!({ "integerValue": integer.to_string() }),
            None => json!({ "doubleValue": number.as_f64().unwrap_or_default() }),
        },
        JsonValue::String(string) => json!({ "stringValue": string }),
        JsonValue::Array(values) => {
            let values = values.iter().map(encode_value).collect::<Vec<_>>();
            json!({ "arrayValue": { "values": values } })
        }
        JsonValue::Object(map) => json!({
            "mapValue": {
                "fields": encode_map_fields(map)
            }
        }),
    }
}

fn decode_value(value: &JsonValue) -> FirestoreResult<JsonValue> {
    let object = value
        .as_object()
        .ok_or_else(|| invalid_argument("Expected Firestore value object"))?;
    if object.contains_key("nullValue") {
        return Ok(JsonValue::Null);
    }
    if let Some(bool_value) = object.get("booleanValue") {
        let value = bool_value
            .as_bool()
            .ok_or_else(|| invalid_argument("booleanValue must be bool"))?;
        return Ok(JsonValue::Bool(value));
    }
    if let Some(integer_value) = object.get("integerValue") {
        let parsed = match integer_value {
            JsonValue::String(value) => i64::from_str(value)
                .map_err(|err| invalid_argument(format!("Invalid integerValue: {err}")))?,
            JsonValue::Number(number) => number
                .as_i64()
                .ok_or_else(|| invalid_argument("Integer out of range"))?,
            _ => return Err(invalid_argument("integerValue must be a string or number")),
        };
        return Ok(JsonValue::from(parsed));
    }
    if let Some(double_value) = object.get("doubleValue") {
        let parsed = match double_value {
            JsonValue::Number(number) => number
                .as_f64()
                .ok_or_else(|| invalid_argument("Invalid doubleValue"))?,
            JsonValue::String(value) => value
                .parse::<f64>()
                .map_err(|err| invalid_argument(format!("Invalid doubleValue: {err}")))?,
            _ => return Err(invalid_argument("doubleValue must be a number or string")),
        };
        // NaN and infinities have no JSON form
        return Ok(Number::from_f64(parsed).map_or(JsonValue::Null, JsonValue::Number));
    }
    for textual in [
        "stringValue",
        "timestampValue",
        "referenceValue",
        "bytesValue",
    ] {
        if let Some(text) = object.get(textual) {
            let text = text
                .as_str()
                .ok_or_else(|| invalid_argument(format!("{textual} must be string")))?;
            return Ok(JsonValue::String(text.to_string()));
        }
    }
    if let Some(geo_point) = object.get("geoPointValue") {
        let latitude = geo_point
            .get("latitude")
            .and_then(JsonValue::as_f64)
            .unwrap_or_default();
        let longitude = geo_point
            .get("longitude")
            .and_then(JsonValue::as_f64)
            .unwrap_or_default();
        return Ok(json!({ "latitude": latitude, "longitude": longitude }));
    }
    if let Some(array_value) = object.get("arrayValue") {
        let decoded = match array_value.get("values").and_then(JsonValue::as_array) {
            Some(entries) => entries
                .iter()
                .map(decode_value)
                .collect::<FirestoreResult<Vec<_>>>()?,
            None => Vec::new(),
        };
        return Ok(JsonValue::Array(decoded));
    }
    if let Some(map_value) = object.get("mapValue") {
        return decode_document_fields(map_value).map(JsonValue::Object);
    }

    Err(invalid_argument("Unknown Firestore value type"))
}
