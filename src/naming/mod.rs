//! Internal-name derivation for column labels
//!
//! Turns a human display label into the canonical key used inside entry
//! documents:
//! - Lower-cases the label
//! - Collapses runs of whitespace/punctuation into single `_` separators
//! - Trims leading and trailing separators
//!
//! Pure and deterministic; no uniqueness is guaranteed here (the schema
//! engine rejects collisions at table level).

/// Derive the canonical internal name for a display label
///
/// # Example
/// ```
/// use gridstore::naming::derive_name;
///
/// assert_eq!(derive_name("User Name"), "user_name");
/// assert_eq!(derive_name("  E-mail  (work)  "), "e_mail_work");
/// ```
pub fn derive_name(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut pending_sep = false;

    for ch in label.chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
        } else {
            // Whitespace, punctuation, and symbols all collapse into one separator
            pending_sep = true;
        }
    }

    out
}
