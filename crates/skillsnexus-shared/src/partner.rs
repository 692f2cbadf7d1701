//! Partner console access.

use crate::error::PartnerAccessError;

/// Accept `email` if it ends with one of `allowed_domains` (each written
/// with its leading `@`). Comparison is case-insensitive; the accepted
/// address is returned lower-cased.
pub fn authorize_partner<S: AsRef<str>>(
    email: &str,
    allowed_domains: &[S],
) -> Result<String, PartnerAccessError> {
    let email = email.trim().to_lowercase();
    let allowed = allowed_domains
        .iter()
        .any(|domain| email.ends_with(&domain.as_ref().to_lowercase()));

    if allowed {
        Ok(email)
    } else {
        let listed = allowed_domains
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", ");
        Err(PartnerAccessError::DomainNotAllowed(listed))
    }
}
