//! Placeholder detection for optional display strings.
//!
//! The backend fills unknown overlay fields with sentinel tokens rather than
//! omitting them. Every "is this value usable" decision goes through
//! [`is_meaningful`] so fallbacks behave the same at every call site.

/// Tokens emitted in place of a missing value.
pub const PLACEHOLDER_TOKENS: &[&str] = &["None", "none", "未知", "Unknown"];

/// A value is meaningful when it is present, not blank, and not a placeholder token.
pub fn is_meaningful(value: Option<&str>) -> bool {
    meaningful(value).is_some()
}

/// Pass a value through only if it is meaningful.
pub fn meaningful(value: Option<&str>) -> Option<&str> {
    let v = value?;
    let trimmed = v.trim();
    if trimmed.is_empty() || PLACEHOLDER_TOKENS.contains(&trimmed) {
        return None;
    }
    Some(v)
}
