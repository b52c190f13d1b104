//! Merge of attribute forms coming from several data sources
//!
//! Each data source contributes its own list of forms. Forms are keyed by name
//! and fields within a form are keyed by name, so that results arriving in any
//! order land in a stable display order: the first time a form or field is
//! seen fixes its position, and later definitions only replace it in place.

use indexmap::IndexMap;

use super::attributes::{AttributeField, AttributeForm};

/// Insertion-ordered registry of every form seen so far
#[derive(Debug, Clone, Default)]
pub struct FormRegistry {
    forms: IndexMap<String, IndexMap<String, AttributeField>>,
}

/// Two registries are equal only if they would display identically, order
/// included. `IndexMap`'s own equality ignores order.
impl PartialEq for FormRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.forms.len() == other.forms.len()
            && self
                .forms
                .iter()
                .zip(&other.forms)
                .all(|((name, fields), (other_name, other_fields))| {
                    name == other_name && fields.iter().eq(other_fields.iter())
                })
    }
}

impl FormRegistry {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one data source's forms into the registry.
    ///
    /// New form names are appended. For a known form, fields with a known
    /// name are overwritten where they stand (the last source registered
    /// wins) and unknown fields are appended.
    pub fn register_forms_from_source(&mut self, forms: &[AttributeForm]) {
        for form in forms {
            let fields = self.forms.entry(form.name.clone()).or_default();
            for field in &form.fields {
                // IndexMap::insert keeps the original slot for an existing key
                fields.insert(field.name.clone(), field.clone());
            }
        }
    }

    /// Materialize the registry as an ordered list of forms
    pub fn snapshot(&self) -> Vec<AttributeForm> {
        self.forms
            .iter()
            .map(|(name, fields)| AttributeForm {
                name: name.clone(),
                fields: fields.values().cloned().collect(),
            })
            .collect()
    }

    /// Number of distinct forms
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    #[cfg(test)]
    /// Look up a merged field definition
    pub fn field(&self, form: &str, field: &str) -> Option<&AttributeField> {
        self.forms.get(form).and_then(|fields| fields.get(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::attributes::FieldType;
    use pretty_assertions::assert_eq;

    fn text(name: &str) -> AttributeField {
        AttributeField::new(name, FieldType::Text)
    }

    fn form(name: &str, fields: Vec<AttributeField>) -> AttributeForm {
        AttributeForm::new(name, fields)
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = FormRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_single_source_keeps_order() {
        let mut registry = FormRegistry::new();
        registry.register_forms_from_source(&[
            form("profile", vec![text("full-name"), text("email")]),
            form("contact", vec![text("phone")]),
        ]);

        let snapshot = registry.snapshot();
        let names: Vec<&str> = snapshot.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["profile", "contact"]);
        assert_eq!(snapshot[0].field_names(), vec!["full-name", "email"]);
    }

    #[test]
    fn test_duplicate_field_overwritten_in_place() {
        let mut registry = FormRegistry::new();
        registry.register_forms_from_source(&[form("F", vec![text("A"), text("B")])]);

        let b_prime = AttributeField::new("B", FieldType::Email);
        registry.register_forms_from_source(&[form("F", vec![b_prime.clone(), text("C")])]);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot[0],
            form("F", vec![text("A"), b_prime, text("C")])
        );
    }

    #[test]
    fn test_existing_form_keeps_position() {
        let mut registry = FormRegistry::new();
        registry.register_forms_from_source(&[form("first", vec![text("a")])]);
        registry.register_forms_from_source(&[form("second", vec![text("b")])]);
        registry.register_forms_from_source(&[form("first", vec![text("c")])]);

        let snapshot = registry.snapshot();
        let names: Vec<&str> = snapshot.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(snapshot[0].field_names(), vec!["a", "c"]);
    }

    #[test]
    fn test_disjoint_sources_commute() {
        let source_a = vec![form("ldap", vec![text("dn"), text("mail")])];
        let source_b = vec![form("totp", vec![text("secret")])];

        let mut forward = FormRegistry::new();
        forward.register_forms_from_source(&source_a);
        forward.register_forms_from_source(&source_b);

        let mut reverse = FormRegistry::new();
        reverse.register_forms_from_source(&source_b);
        reverse.register_forms_from_source(&source_a);

        let by_name = |mut forms: Vec<AttributeForm>| {
            forms.sort_by(|a, b| a.name.cmp(&b.name));
            forms
        };
        assert_eq!(by_name(forward.snapshot()), by_name(reverse.snapshot()));
    }

    #[test]
    fn test_later_source_wins_for_overlapping_field() {
        let first = AttributeField::new("timezone", FieldType::Text);
        let second = AttributeField::new("timezone", FieldType::Timezone);

        let mut registry = FormRegistry::new();
        registry.register_forms_from_source(&[form("prefs", vec![first])]);
        registry.register_forms_from_source(&[form("prefs", vec![second.clone()])]);

        assert_eq!(registry.field("prefs", "timezone"), Some(&second));
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let mut registry = FormRegistry::new();
        registry.register_forms_from_source(&[form("F", vec![text("A")])]);

        assert_eq!(registry.snapshot(), registry.snapshot());
    }

    #[test]
    fn test_empty_source_changes_nothing() {
        let mut registry = FormRegistry::new();
        registry.register_forms_from_source(&[
            form("F", vec![text("A"), text("B")]),
            form("G", vec![text("C")]),
        ]);
        let before = registry.snapshot();

        registry.register_forms_from_source(&[]);
        assert_eq!(registry.snapshot(), before);
    }

    #[test]
    fn test_equality_respects_order() {
        let mut forward = FormRegistry::new();
        forward.register_forms_from_source(&[form("F", vec![text("A")]), form("G", vec![])]);
        let mut reverse = FormRegistry::new();
        reverse.register_forms_from_source(&[form("G", vec![]), form("F", vec![text("A")])]);
        assert_ne!(forward, reverse);

        let mut ab = FormRegistry::new();
        ab.register_forms_from_source(&[form("F", vec![text("A"), text("B")])]);
        let mut ba = FormRegistry::new();
        ba.register_forms_from_source(&[form("F", vec![text("B"), text("A")])]);
        assert_ne!(ab, ba);

        assert_eq!(forward, forward.clone());
    }

    #[test]
    fn test_repeated_field_within_one_form() {
        let mut registry = FormRegistry::new();
        let replacement = AttributeField::new("A", FieldType::Numeric);
        registry.register_forms_from_source(&[form(
            "F",
            vec![text("A"), text("B"), replacement.clone()],
        )]);

        assert_eq!(
            registry.snapshot()[0],
            form("F", vec![replacement, text("B")])
        );
    }

    #[test]
    fn test_registry_never_shrinks() {
        let mut registry = FormRegistry::new();
        registry.register_forms_from_source(&[
            form("one", vec![text("a")]),
            form("two", vec![text("b")]),
        ]);
        registry.register_forms_from_source(&[form("one", vec![])]);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.snapshot()[0].field_names(), vec!["a"]);
    }
}
