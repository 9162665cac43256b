//! Wire types for the Firestore REST document surface.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::{Venue, VenueFields, VenueId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorStatus {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

/// Document field names used for each venue attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub name: String,
    pub address: String,
    pub hours: String,
    pub lat: String,
    pub lng: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            name: "name".into(),
            address: "address".into(),
            hours: "hours".into(),
            lat: "lat".into(),
            lng: "lng".into(),
        }
    }
}

impl FieldNames {
    /// Paths touched by an edit. Coordinates are never part of it.
    pub fn update_mask(&self) -> [&str; 3] {
        [&self.name, &self.address, &self.hours]
    }
}

pub fn string_value(value: &str) -> Value {
    json!({ "stringValue": value })
}

pub fn double_value(value: f64) -> Value {
    json!({ "doubleValue": value })
}

fn read_string(value: &Value) -> Option<String> {
    value
        .get("stringValue")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn read_number(value: &Value) -> Option<f64> {
    if let Some(raw) = value.get("doubleValue") {
        return match raw {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        };
    }
    match value.get("integerValue")? {
        Value::String(s) => s.parse::<i64>().ok().map(|v| v as f64),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

impl Document {
    pub fn id(&self) -> Option<&str> {
        self.name.rsplit('/').next().filter(|id| !id.is_empty())
    }

    pub fn to_venue(&self, names: &FieldNames) -> Option<Venue> {
        let id = self.id()?;
        let text = |key: &str| self.fields.get(key).and_then(read_string).unwrap_or_default();
        let number = |key: &str| self.fields.get(key).and_then(read_number);

        Some(Venue {
            id: VenueId::new(id),
            name: text(&names.name),
            address: text(&names.address),
            hours: text(&names.hours),
            lat: number(&names.lat),
            lng: number(&names.lng),
        })
    }

    pub fn from_fields(fields: &VenueFields, names: &FieldNames) -> Self {
        let mut map = BTreeMap::new();
        map.insert(names.name.clone(), string_value(&fields.name));
        map.insert(names.address.clone(), string_value(&fields.address));
        map.insert(names.hours.clone(), string_value(&fields.hours));
        if let Some(location) = fields.location {
            map.insert(names.lat.clone(), double_value(location.lat));
            map.insert(names.lng.clone(), double_value(location.lng));
        }

        Self {
            fields: map,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LngLat;

    #[test]
    fn decodes_document_with_mixed_numeric_encodings() {
        let raw = json!({
            "name": "projects/p/databases/(default)/documents/venues/abc123",
            "fields": {
                "name": { "stringValue": "Pub X" },
                "hours": { "stringValue": "12:00 - 00:00" },
                "lat": { "doubleValue": 47.5 },
                "lng": { "integerValue": "21" }
            },
            "createTime": "2024-01-01T00:00:00Z"
        });
        let doc: Document = serde_json::from_value(raw).expect("document");
        let venue = doc.to_venue(&FieldNames::default()).expect("venue");

        assert_eq!(venue.id, VenueId::new("abc123"));
        assert_eq!(venue.name, "Pub X");
        assert_eq!(venue.address, "");
        assert_eq!(venue.lat, Some(47.5));
        assert_eq!(venue.lng, Some(21.0));
    }

    #[test]
    fn decodes_legacy_field_names() {
        let names = FieldNames {
            name: "nev".into(),
            address: "cim".into(),
            hours: "nyitvatartas".into(),
            ..FieldNames::default()
        };
        let doc: Document = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/kocsmak/k1",
            "fields": {
                "nev": { "stringValue": "Kocsma" },
                "cim": { "stringValue": "Fo utca 1" },
                "lat": { "stringValue": "47.5" }
            }
        }))
        .expect("document");

        let venue = doc.to_venue(&names).expect("venue");
        assert_eq!(venue.name, "Kocsma");
        assert_eq!(venue.address, "Fo utca 1");
        assert_eq!(venue.lat, None, "string coordinates are not numbers");
    }

    #[test]
    fn encodes_location_only_when_present() {
        let mut fields = VenueFields {
            name: "Pub X".into(),
            address: String::new(),
            hours: "12:00 - 00:00".into(),
            location: Some(LngLat::new(21.0, 47.0)),
        };
        let names = FieldNames::default();
        let doc = Document::from_fields(&fields, &names);
        assert_eq!(doc.fields["lat"], json!({ "doubleValue": 47.0 }));
        assert_eq!(doc.fields["lng"], json!({ "doubleValue": 21.0 }));

        fields.location = None;
        let doc = Document::from_fields(&fields, &names);
        assert!(!doc.fields.contains_key("lat"));
        assert!(!doc.fields.contains_key("lng"));
        assert!(doc.name.is_empty());
    }
}
