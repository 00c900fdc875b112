//! Weekday schedule rendering.
//!
//! Class sections store their meeting days as raw integer indices
//! (0 = Sunday .. 6 = Saturday). This module turns that set into the
//! human-readable string shown in approval screens and credential emails.

/// Short weekday labels in the source locale, index 0 = Sunday.
pub const WEEKDAY_LABELS: [&str; 7] = ["CN", "T2", "T3", "T4", "T5", "T6", "T7"];

/// Shown when a section has no schedule recorded at all.
pub const NO_SCHEDULE_FALLBACK: &str = "Chưa có lịch cụ thể";

/// Render a weekday set using the default locale table.
///
/// `None` and the empty slice both mean "no schedule recorded" and yield the
/// fallback sentinel. Otherwise indices are mapped to labels in the order
/// given (never re-sorted); anything outside `0..=6` is dropped silently, so
/// an all-invalid input renders as an empty string rather than the sentinel.
///
/// # Examples
/// ```
/// use service::schedule::format_schedule;
/// assert_eq!(format_schedule(Some(&[1, 3, 5])), "T2, T4, T6");
/// assert_eq!(format_schedule(None), "Chưa có lịch cụ thể");
/// ```
pub fn format_schedule(days: Option<&[i32]>) -> String {
    format_schedule_with(&WEEKDAY_LABELS, NO_SCHEDULE_FALLBACK, days)
}

/// Render a weekday set against a caller-supplied label table and fallback.
/// Kept separate so other locales can reuse the same pass without touching
/// the default table.
pub fn format_schedule_with(labels: &[&str; 7], fallback: &str, days: Option<&[i32]>) -> String {
    let days = match days {
        Some(days) if !days.is_empty() => days,
        _ => return fallback.to_string(),
    };

    let mut out = String::new();
    for &day in days {
        let Ok(idx) = usize::try_from(day) else { continue };
        let Some(label) = labels.get(idx) else { continue };
        if !out.is_empty() {
            out.push_str(", ");
        }
        out.push_str(label);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_input_yields_fallback() {
        assert_eq!(format_schedule(None), NO_SCHEDULE_FALLBACK);
    }

    #[test]
    fn empty_input_yields_fallback() {
        assert_eq!(format_schedule(Some(&[])), NO_SCHEDULE_FALLBACK);
    }

    #[test]
    fn valid_days_join_in_input_order() {
        assert_eq!(format_schedule(Some(&[1, 3, 5])), "T2, T4, T6");
        assert_eq!(format_schedule(Some(&[0, 6])), "CN, T7");
    }

    #[test]
    fn order_is_never_normalized() {
        assert_eq!(format_schedule(Some(&[6, 0, 3])), "T7, CN, T4");
    }

    #[test]
    fn duplicates_are_preserved() {
        assert_eq!(format_schedule(Some(&[2, 2])), "T3, T3");
    }

    #[test]
    fn all_invalid_yields_empty_not_fallback() {
        assert_eq!(format_schedule(Some(&[7, -1])), "");
    }

    #[test]
    fn invalid_entries_are_skipped_without_extra_separators() {
        assert_eq!(format_schedule(Some(&[2, 7, 4])), "T3, T5");
        assert_eq!(format_schedule(Some(&[-1, 1, 100, 3])), "T2, T4");
        assert_eq!(format_schedule(Some(&[7, 0])), "CN");
    }

    #[test]
    fn formatting_is_pure() {
        let days = [1, 9, 5];
        let first = format_schedule(Some(&days));
        let second = format_schedule(Some(&days));
        assert_eq!(first, second);
        assert_eq!(days, [1, 9, 5]);
    }

    #[test]
    fn custom_locale_table() {
        let labels = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
        assert_eq!(format_schedule_with(&labels, "no schedule", Some(&[1, 5])), "Mon, Fri");
        assert_eq!(format_schedule_with(&labels, "no schedule", Some(&[])), "no schedule");
    }
}
