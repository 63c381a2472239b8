//! Non-destructive merge primitives
//!
//! Three field categories, three rules:
//! - scalar coalesce: fill a gap, never replace a populated value
//! - overwrite with a higher-precision value, but never with an empty one
//! - list append, optionally skipping values already present
//!
//! Blank strings count as absent everywhere.

/// Drop blank strings
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == v.len() {
            Some(v)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Fill `slot` only if it is empty
pub fn coalesce<T>(slot: &mut Option<T>, incoming: Option<T>) {
    if slot.is_none() {
        *slot = incoming;
    }
}

/// Fill an empty string slot with a non-blank incoming value
pub fn coalesce_text(slot: &mut Option<String>, incoming: Option<String>) {
    coalesce(slot, non_blank(incoming));
}

/// Replace `slot` with a non-blank incoming value, keeping it otherwise
pub fn overwrite_text(slot: &mut Option<String>, incoming: Option<String>) {
    if let Some(value) = non_blank(incoming) {
        *slot = Some(value);
    }
}

/// Append non-blank values in order.
///
/// With `dedupe`, values already in the list are skipped.
pub fn append_values<I>(list: &mut Vec<String>, incoming: I, dedupe: bool)
where
    I: IntoIterator<Item = String>,
{
    for value in incoming {
        let Some(value) = non_blank(Some(value)) else {
            continue;
        };
        if dedupe && list.contains(&value) {
            continue;
        }
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coalesce_never_overwrites() {
        let mut slot = Some("Spanish".to_string());
        coalesce_text(&mut slot, Some("French".to_string()));
        assert_eq!(slot.as_deref(), Some("Spanish"));

        coalesce_text(&mut slot, None);
        assert_eq!(slot.as_deref(), Some("Spanish"));
    }

    #[test]
    fn test_coalesce_ignores_blank() {
        let mut slot = None;
        coalesce_text(&mut slot, Some("   ".to_string()));
        assert!(slot.is_none());
    }

    #[test]
    fn test_overwrite_keeps_on_empty() {
        let mut slot = Some("25 October 1881".to_string());
        overwrite_text(&mut slot, Some(String::new()));
        assert_eq!(slot.as_deref(), Some("25 October 1881"));

        overwrite_text(&mut slot, Some("1881-10-25T00:00:00Z".to_string()));
        assert_eq!(slot.as_deref(), Some("1881-10-25T00:00:00Z"));
    }

    #[test]
    fn test_append_with_and_without_dedupe() {
        let mut list = vec!["Royal Academy of San Fernando".to_string()];

        append_values(&mut list, vec!["Royal Academy of San Fernando".to_string()], true);
        assert_eq!(list.len(), 1);

        append_values(&mut list, vec!["Royal Academy of San Fernando".to_string()], false);
        assert_eq!(list.len(), 2);
    }
}
