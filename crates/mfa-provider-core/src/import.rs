//! Composite import identifiers

use crate::diag::Diagnostic;

/// Split `id` on `/` into exactly as many components as `format` has.
///
/// `format` is the human readable form, e.g.
/// `environmentID/applicationID/pushCredentialID`; it is echoed in the error
/// so the user can see what was expected.
pub fn parse_import_id(id: &str, format: &str) -> Result<Vec<String>, Diagnostic> {
    let expected = format.split('/').count();
    let components: Vec<&str> = id.split('/').collect();

    if components.len() != expected || components.iter().any(|c| c.is_empty()) {
        return Err(Diagnostic::error(
            "Unexpected import identifier",
            format!(
                "Invalid import ID specified (\"{}\").  The ID should be in the format \"{}\".",
                id, format
            ),
        ));
    }

    Ok(components.into_iter().map(str::to_string).collect())
}
