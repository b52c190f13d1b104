//! Attribute form value objects

use serde::{Deserialize, Serialize};

/// Kind of input a schema field asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    #[default]
    Text,
    Multiline,
    Email,
    Numeric,
    Boolean,
    Username,
    Password,
    Enum,
    Timezone,
    Date,
    Time,
    Language,
    TerminalColorScheme,
    QueryParameter,
    Redirect,
}

/// A single editable profile field contributed by a data source's schema.
///
/// Only `name` carries identity; the remaining properties are passed through
/// to whatever renders the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeField {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl AttributeField {
    #[cfg(test)]
    /// Create a field with no options
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            options: None,
        }
    }
}

/// A named, ordered group of attribute fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeForm {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<AttributeField>,
}

impl AttributeForm {
    #[cfg(test)]
    pub fn new(name: &str, fields: Vec<AttributeField>) -> Self {
        Self {
            name: name.to_string(),
            fields,
        }
    }

    /// Names of the fields in display order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_schema_form() {
        let json = r#"[{
            "name": "profile",
            "fields": [
                {"name": "guac-full-name", "type": "TEXT"},
                {"name": "guac-email-address", "type": "EMAIL"},
                {"name": "guac-organizational-role", "type": "ENUM", "options": ["admin", "staff"]}
            ]
        }]"#;

        let forms: Vec<AttributeForm> = serde_json::from_str(json).unwrap();
        assert_eq!(forms.len(), 1);
        assert_eq!(
            forms[0].field_names(),
            vec!["guac-full-name", "guac-email-address", "guac-organizational-role"]
        );
        assert_eq!(forms[0].fields[1].field_type, FieldType::Email);
        assert_eq!(
            forms[0].fields[2].options,
            Some(vec!["admin".to_string(), "staff".to_string()])
        );
    }

    #[test]
    fn test_missing_type_defaults_to_text() {
        let field: AttributeField = serde_json::from_str(r#"{"name": "note"}"#).unwrap();
        assert_eq!(field.field_type, FieldType::Text);
        assert!(field.options.is_none());
    }

    #[test]
    fn test_multi_word_type_names() {
        let field: AttributeField =
            serde_json::from_str(r#"{"name": "scheme", "type": "TERMINAL_COLOR_SCHEME"}"#).unwrap();
        assert_eq!(field.field_type, FieldType::TerminalColorScheme);
    }

    #[test]
    fn test_options_omitted_when_serializing_plain_field() {
        let json = serde_json::to_string(&AttributeField::new("tz", FieldType::Timezone)).unwrap();
        assert_eq!(json, r#"{"name":"tz","type":"TIMEZONE"}"#);
    }

    #[test]
    fn test_form_without_fields() {
        let form: AttributeForm = serde_json::from_str(r#"{"name": "empty"}"#).unwrap();
        assert!(form.fields.is_empty());
    }
}
