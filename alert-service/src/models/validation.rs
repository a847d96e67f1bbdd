use crate::error::AlertError;

pub fn require_text(field: &str, value: Option<&str>) -> Result<String, AlertError> {
    let value = value.map(str::trim).unwrap_or_default();

    if value.is_empty() {
        return Err(AlertError::Validation(format!("{} is required", field)));
    }

    Ok(value.to_string())
}

pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn optional_value(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn validate_topic_name(topic: &str) -> Result<(), AlertError> {
    if topic.is_empty() {
        return Err(AlertError::Validation("Topic cannot be empty".to_string()));
    }

    if topic.len() > 900 {
        return Err(AlertError::Validation(
            "Topic too long (maximum 900 characters)".to_string(),
        ));
    }

    let valid_chars = topic
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~' | '%'));

    if !valid_chars {
        return Err(AlertError::Validation(format!(
            "Topic '{}' contains invalid characters",
            topic
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_required_text_is_rejected() {
        assert!(require_text("title", None).is_err());
        assert!(require_text("title", Some("   ")).is_err());
        assert_eq!(require_text("title", Some(" Fire ")).unwrap(), "Fire");
    }

    #[test]
    fn blank_optional_text_becomes_none() {
        assert_eq!(optional_text(Some("  ".to_string())), None);
        assert_eq!(optional_text(None), None);
        assert_eq!(optional_text(Some("Ops".to_string())), Some("Ops".to_string()));
    }

    #[test]
    fn optional_values_keep_surrounding_whitespace() {
        assert_eq!(optional_value(Some(" \t".to_string())), None);
        assert_eq!(
            optional_value(Some(" urgent".to_string())),
            Some(" urgent".to_string())
        );
    }

    #[test]
    fn topic_names_follow_fcm_charset() {
        assert!(validate_topic_name("pasbrimob_ii_users").is_ok());
        assert!(validate_topic_name("all_users").is_ok());
        assert!(validate_topic_name("").is_err());
        assert!(validate_topic_name("bad topic").is_err());
        assert!(validate_topic_name("/topics/x").is_err());
    }
}
