use crate::{MAX_IDENT_LEN, MAX_PATH_LEN};

/// Ensure an identifier is non-empty, short enough and a usable Rust ident
/// (keywords are rejected).
pub(crate) fn validate_ident(ident: &str) -> Result<(), String> {
    if ident.is_empty() {
        return Err("ident is empty".to_string());
    }
    if ident.len() > MAX_IDENT_LEN {
        return Err(format!(
            "ident '{ident}' exceeds max length {MAX_IDENT_LEN}"
        ));
    }
    if syn::parse_str::<syn::Ident>(ident).is_err() {
        return Err(format!("'{ident}' is not a valid identifier"));
    }

    Ok(())
}

/// Ensure a qualified path (`game::Player`) parses as a plain Rust path.
pub(crate) fn validate_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("path is empty".to_string());
    }
    if path.len() > MAX_PATH_LEN {
        return Err(format!("path '{path}' exceeds max length {MAX_PATH_LEN}"));
    }
    if !path.is_ascii() {
        return Err(format!("path '{path}' must be ASCII"));
    }

    for segment in path.split("::") {
        validate_ident(segment).map_err(|e| format!("path '{path}': {e}"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_reserved_words() {
        assert!(validate_ident("").is_err(), "empty identifiers should fail");
        assert!(
            validate_ident("struct").is_err(),
            "reserved keywords should be rejected"
        );
        assert!(validate_ident("9lives").is_err());
    }

    #[test]
    fn accepts_non_reserved_identifier() {
        assert!(validate_ident("custom_ident").is_ok());
        assert!(validate_ident("OnChange").is_ok());
    }

    #[test]
    fn validates_each_path_segment() {
        assert!(validate_path("game::actors::Player").is_ok());
        assert!(validate_path("game::::Player").is_err());
        assert!(validate_path("game::fn::Player").is_err());
    }
}
