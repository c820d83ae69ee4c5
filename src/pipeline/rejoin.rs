//! Line rejoining: undo the line breaks introduced by column layout and page
//! breaks.
//!
//! A greedy forward merge. The current line keeps absorbing the next one
//! until it ends a sentence or meets a heading. A single blank line is
//! bridged when it looks like a page break in mid-sentence, i.e. the line
//! after it starts lower-case. The classifier is asked again after every
//! merge since the merged line has a new ending.

use super::classify::LineClassifier;

/// Merge physically broken lines into logical lines.
///
/// Input lines are trimmed as they are read. Output lines are joined with
/// `\n`; blank lines that were not bridged are kept.
pub fn rejoin_broken_lines(text: &str, classifier: &LineClassifier) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut result: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let mut line = lines[i].trim().to_string();

        while i + 1 < lines.len() {
            let mut next = lines[i + 1].trim();

            if next.is_empty() {
                let Some(after) = lines.get(i + 2).map(|l| l.trim()) else {
                    break;
                };
                let page_break = after.chars().next().is_some_and(char::is_lowercase)
                    && !classifier.ends_sentence(&line)
                    && !classifier.is_heading(after);
                if !page_break {
                    break;
                }
                // The blank line is consumed even if a heading check below
                // stops the merge.
                i += 1;
                next = after;
            }

            if classifier.is_heading(&line) || classifier.is_heading(next) {
                break;
            }

            // "sedi-" + "ment" → "sediment"; a spaced dash is punctuation.
            if line.ends_with('-') && !line.ends_with(" -") {
                line.pop();
                line.push_str(next);
                i += 1;
                continue;
            }

            if classifier.ends_sentence(&line) {
                break;
            }
            line.push(' ');
            line.push_str(next);
            i += 1;
        }

        result.push(line);
        i += 1;
    }

    result.join("\n")
}
