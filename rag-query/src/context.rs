//! Context-block and citation-line formatting for a served batch.

use crate::structs::hit::Hit;

/// Delimiter between passages inside the context block.
const HIT_DELIMITER: &str = "\n---\n";

/// Build the context string handed to the completion endpoint.
///
/// Each passage renders as labeled lines, in batch order:
/// `File: <source>\nPage: <page>\nText: <text>`, with passages separated by
/// `\n---\n`. An empty batch produces an empty string.
pub fn build_context(batch: &[Hit]) -> String {
    batch
        .iter()
        .map(|hit| {
            format!(
                "File: {}\nPage: {}\nText: {}",
                hit.source, hit.page, hit.text
            )
        })
        .collect::<Vec<_>>()
        .join(HIT_DELIMITER)
}

/// Build the single citation item emitted after the answer stream.
///
/// One line per hit, in the same order as the batch:
/// `Source: <source> | Page: <page>`.
pub fn build_citations(batch: &[Hit]) -> String {
    batch
        .iter()
        .map(|hit| format!("Source: {} | Page: {}", hit.source, hit.page))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(source: &str, page: i64, text: &str) -> Hit {
        Hit {
            source: source.to_string(),
            page,
            text: text.to_string(),
            score: 0.0,
        }
    }

    #[test]
    fn context_uses_labeled_lines_and_delimiter() {
        let batch = vec![hit("s1", 1, "t1"), hit("s2", 2, "t2")];
        assert_eq!(
            build_context(&batch),
            "File: s1\nPage: 1\nText: t1\n---\nFile: s2\nPage: 2\nText: t2"
        );
    }

    #[test]
    fn empty_batch_builds_empty_context() {
        assert_eq!(build_context(&[]), "");
        assert_eq!(build_citations(&[]), "");
    }

    #[test]
    fn citations_keep_batch_order_and_count() {
        let batch = vec![
            hit("b.pdf", 4, "later"),
            hit("a.pdf", 2, "earlier"),
            hit("b.pdf", 7, "again"),
        ];
        assert_eq!(
            build_citations(&batch),
            "Source: b.pdf | Page: 4\nSource: a.pdf | Page: 2\nSource: b.pdf | Page: 7"
        );
    }
}
