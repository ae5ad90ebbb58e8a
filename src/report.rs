//! Plain-text rendering of a history selection.

use crate::record::NotificationRecord;

pub const SEPARATOR: &str = "========================================\n";

/// Title of the history display notification.
pub const TITLE: &str = "Notifications History";

/// Render records (newest first) into one display text.
///
/// The text always opens with a separator line. Records with neither summary
/// nor body contribute nothing.
pub fn render_history(records: &[NotificationRecord]) -> String {
    let mut text = String::from(SEPARATOR);
    for record in records {
        let Some(content) = record.text() else {
            continue;
        };
        text.push_str("Time: ");
        text.push_str(&record.timestamp);
        text.push('\n');
        text.push_str(&content);
        text.push('\n');
        text.push_str(SEPARATOR);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample;

    #[test]
    fn empty_selection_is_single_separator() {
        assert_eq!(render_history(&[]), SEPARATOR);
    }

    #[test]
    fn body_only_record() {
        let text = render_history(&[sample("Foo", "", "the body")]);
        assert_eq!(
            text,
            format!("{SEPARATOR}Time: 2024-03-01 12:00:00\nthe body\n{SEPARATOR}")
        );
    }

    #[test]
    fn skips_contentless_records() {
        let records = [
            sample("Foo", "Build finished", "all green"),
            sample("Foo", "", ""),
            sample("Bar", "Battery low", ""),
        ];
        let text = render_history(&records);

        assert_eq!(
            text,
            format!(
                "{SEPARATOR}Time: 2024-03-01 12:00:00\nBuild finished\nall green\n{SEPARATOR}\
                 Time: 2024-03-01 12:00:00\nBattery low\n{SEPARATOR}"
            )
        );
    }
}
