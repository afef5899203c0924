use super::types::CredentialTypeDescriptor;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Matches the leading variable of a `{{ var }}` / `{{ var.attr }}` expression
static TEMPLATE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)").expect("template reference pattern is valid")
});

/// Namespaces Tower provides to injectors itself (e.g. `{{ tower.filename }}`)
const RESERVED_NAMESPACES: &[&str] = &["tower", "awx"];

/// Variables referenced in templates, in sorted order
pub fn template_references(template: &str) -> BTreeSet<String> {
    TEMPLATE_REFERENCE
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Injector variables with no matching field in `inputs`.
///
/// Tower rejects such descriptors on its side; this is only used to warn early.
pub fn undeclared_references(descriptor: &CredentialTypeDescriptor) -> BTreeSet<String> {
    let Some(injectors) = &descriptor.injectors else {
        return BTreeSet::new();
    };

    let declared: BTreeSet<&str> = descriptor
        .inputs
        .as_ref()
        .map(|inputs| inputs.field_ids().collect())
        .unwrap_or_default();

    injectors
        .templates()
        .into_iter()
        .flat_map(template_references)
        .filter(|name| !RESERVED_NAMESPACES.contains(&name.as_str()))
        .filter(|name| !declared.contains(name.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{CredentialKind, InputSchema, Injectors};
    use serde_json::json;

    fn descriptor(inputs: serde_json::Value, injectors: serde_json::Value) -> CredentialTypeDescriptor {
        CredentialTypeDescriptor::new("Custom", CredentialKind::Cloud)
            .unwrap()
            .with_inputs(InputSchema::from_value(inputs).unwrap())
            .with_injectors(Injectors::from_value(injectors).unwrap())
    }

    #[test]
    fn test_template_references_handles_spacing_and_attributes() {
        let refs = template_references("{{username}}:{{ password }}@{{ tower.filename }}");
        let refs: Vec<&str> = refs.iter().map(String::as_str).collect();
        assert_eq!(refs, vec!["password", "tower", "username"]);
    }

    #[test]
    fn test_undeclared_references_empty_when_consistent() {
        let d = descriptor(
            json!({"fields": [{"id": "username", "type": "string"}]}),
            json!({"env": {"CUSTOM_USERNAME": "{{ username }}"}}),
        );
        assert!(undeclared_references(&d).is_empty());
    }

    #[test]
    fn test_undeclared_references_reports_missing_fields() {
        let d = descriptor(
            json!({"fields": [{"id": "username"}]}),
            json!({
                "env": {"CUSTOM_URL": "{{ url }}"},
                "extra_vars": {"nested": {"token": "{{ api_token }}"}},
                "file": {"template": "user={{ username }}"}
            }),
        );
        let missing: Vec<String> = undeclared_references(&d).into_iter().collect();
        assert_eq!(missing, vec!["api_token".to_string(), "url".to_string()]);
    }

    #[test]
    fn test_undeclared_references_ignores_reserved_namespaces() {
        let d = descriptor(
            json!({"fields": []}),
            json!({"env": {"CONFIG": "{{ tower.filename }}"}}),
        );
        assert!(undeclared_references(&d).is_empty());
    }
}
