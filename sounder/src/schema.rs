//! JSON schema validation of response bodies.

use serde_json::Value;

/// Validate a response body against a declared JSON schema.
///
/// Returns the first violation, formatted with the JSON-pointer path of the
/// offending value so the failure can be located inside nested payloads.
pub(crate) fn validate_response(instance: &Value, schema: &Value) -> Result<(), String> {
    let validator = match jsonschema::validator_for(schema) {
        Ok(validator) => validator,
        Err(e) => return Err(format!("An unexpected schema validation error occurred: {e}")),
    };
    // Bind the first violation so the boxed error iterator drops before the
    // validator it borrows.
    let first = validator.iter_errors(instance).next();
    match first {
        None => Ok(()),
        Some(error) => {
            let path = error.instance_path.to_string();
            let path = if path.is_empty() { "/".to_string() } else { path };
            Err(format!("At path `{path}`: {error}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn conforming_bodies_pass() {
        let schema = json!({
            "type": "object",
            "properties": { "status": { "type": "string" } },
            "required": ["status"]
        });
        assert_eq!(validate_response(&json!({ "status": "ok" }), &schema), Ok(()));
    }

    #[test]
    fn violations_carry_the_instance_path() {
        let schema = json!({
            "type": "object",
            "properties": {
                "user": {
                    "type": "object",
                    "properties": { "id": { "type": "integer" } },
                    "required": ["id"]
                }
            },
            "required": ["user"]
        });
        let message = validate_response(&json!({ "user": { "id": "abc" } }), &schema).unwrap_err();
        assert!(message.starts_with("At path `/user/id`:"), "got: {message}");
    }

    #[test]
    fn root_level_violations_point_at_the_document_root() {
        let schema = json!({ "type": "object" });
        let message = validate_response(&json!([1, 2, 3]), &schema).unwrap_err();
        assert!(message.starts_with("At path `/`:"), "got: {message}");
    }

    #[test]
    fn malformed_schemas_are_reported_not_panicked() {
        let schema = json!({ "type": "definitely-not-a-type" });
        let message = validate_response(&json!({}), &schema).unwrap_err();
        assert!(
            message.starts_with("An unexpected schema validation error occurred:"),
            "got: {message}"
        );
    }
}
