//! Applies positional spelling corrections to a text.
//!
//! Positions and lengths always refer to the *original* text and count
//! characters, not bytes. Corrections are applied left to right; a running
//! `delta` records how far every later span has drifted in the partially
//! corrected text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One span flagged by the spellchecker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellingMistake {
    pub position: usize,
    pub length: usize,
    pub suggestions: Vec<String>,
}

impl SpellingMistake {
    pub fn new(position: usize, length: usize, suggestions: &[&str]) -> Self {
        Self {
            position,
            length,
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn end(&self) -> usize {
        self.position + self.length
    }

    /// The first suggestion, unless the spellchecker offered none.
    pub fn correction(&self) -> Option<&str> {
        self.suggestions
            .first()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// A correction that was applied, lower-cased for bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MistakeEntry {
    pub wrong: String,
    pub correct: String,
    #[serde(rename = "pos")]
    pub position: usize,
    #[serde(rename = "lang")]
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub corrected_text: String,
    pub entries: Vec<MistakeEntry>,
    /// Input indices of spans that carried no suggestion and were left as is.
    pub skipped: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("mistake {index} spans {position}..{end} beyond the text length {text_len}")]
    OutOfBounds {
        index: usize,
        position: usize,
        end: usize,
        text_len: usize,
    },
    #[error("mistake {index} at {position} overlaps or precedes the span ending at {previous_end}")]
    Unordered {
        index: usize,
        position: usize,
        previous_end: usize,
    },
}

/// Rejects spans that are out of bounds, out of order or overlapping.
pub fn validate(text_len: usize, mistakes: &[SpellingMistake]) -> Result<(), ReconcileError> {
    let mut previous_end = 0usize;
    for (index, mistake) in mistakes.iter().enumerate() {
        let end = mistake
            .position
            .checked_add(mistake.length)
            .filter(|end| *end <= text_len)
            .ok_or(ReconcileError::OutOfBounds {
                index,
                position: mistake.position,
                end: mistake.position.saturating_add(mistake.length),
                text_len,
            })?;

        if mistake.position < previous_end {
            return Err(ReconcileError::Unordered {
                index,
                position: mistake.position,
                previous_end,
            });
        }
        previous_end = end;
    }
    Ok(())
}

/// Chosen corrections in input order, one per span that will be applied.
pub fn chosen_corrections(mistakes: &[SpellingMistake]) -> impl Iterator<Item = &str> {
    mistakes.iter().filter_map(SpellingMistake::correction)
}

/// Applies `mistakes` to `text`. `detect` is called once per applied
/// correction, in order, with the correction as it will appear in the text.
pub fn reconcile<F>(
    text: &str,
    mistakes: &[SpellingMistake],
    mut detect: F,
) -> Result<Reconciliation, ReconcileError>
where
    F: FnMut(&str) -> String,
{
    let original: Vec<char> = text.chars().collect();
    validate(original.len(), mistakes)?;

    let mut corrected = original.clone();
    let mut delta: isize = 0;
    let mut entries = Vec::with_capacity(mistakes.len());
    let mut skipped = Vec::new();

    for (index, mistake) in mistakes.iter().enumerate() {
        let Some(correct) = mistake.correction() else {
            skipped.push(index);
            continue;
        };

        let wrong: String = original[mistake.position..mistake.end()].iter().collect();
        let replacement: Vec<char> = correct.chars().collect();

        // validate() guarantees ascending, disjoint spans, so the shifted start never underflows.
        let start = (mistake.position as isize + delta) as usize;
        let end = start + mistake.length;
        delta += replacement.len() as isize - mistake.length as isize;
        corrected.splice(start..end, replacement);

        entries.push(MistakeEntry {
            wrong: wrong.to_lowercase(),
            correct: correct.to_lowercase(),
            position: mistake.position,
            language: detect(correct),
        });
    }

    Ok(Reconciliation {
        corrected_text: corrected.into_iter().collect(),
        entries,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ru(_: &str) -> String {
        "ru".to_string()
    }

    #[test]
    fn corrects_single_cyrillic_word() {
        let text = "Прагулка по полисаднику";
        let mistakes = vec![SpellingMistake::new(0, 8, &["Прогулка"])];

        let result = reconcile(text, &mistakes, ru).unwrap();

        assert_eq!(result.corrected_text, "Прогулка по полисаднику");
        assert_eq!(
            result.entries,
            vec![MistakeEntry {
                wrong: "прагулка".to_string(),
                correct: "прогулка".to_string(),
                position: 0,
                language: "ru".to_string(),
            }]
        );
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn later_splice_is_shifted_by_delta() {
        // "abc" -> "abcde" grows the text by 2, so the span at original offset 10
        // lands at 12 in the partially corrected text.
        let text = "abc xxxxx yyy zzz";
        let mistakes = vec![
            SpellingMistake::new(0, 3, &["abcde"]),
            SpellingMistake::new(10, 3, &["YES"]),
        ];

        let result = reconcile(text, &mistakes, |_| "en".to_string()).unwrap();

        assert_eq!(result.corrected_text, "abcde xxxxx YES zzz");
        assert_eq!(&result.corrected_text[12..15], "YES");
        assert_eq!(result.entries[1].position, 10);
        assert_eq!(result.entries[1].wrong, "yyy");
    }

    #[test]
    fn shrinking_correction_shifts_left() {
        let text = "helllllo wrld";
        let mistakes = vec![
            SpellingMistake::new(0, 8, &["hello"]),
            SpellingMistake::new(9, 4, &["world"]),
        ];

        let result = reconcile(text, &mistakes, |_| "en".to_string()).unwrap();
        assert_eq!(result.corrected_text, "hello world");
    }

    #[test]
    fn empty_text_without_mistakes_is_unchanged() {
        let result = reconcile("", &[], ru).unwrap();
        assert_eq!(result.corrected_text, "");
        assert!(result.entries.is_empty());
    }

    #[test]
    fn span_without_suggestions_is_skipped() {
        let text = "foo bar baz";
        let mistakes = vec![
            SpellingMistake::new(0, 3, &[]),
            SpellingMistake::new(4, 3, &["bars"]),
        ];

        let result = reconcile(text, &mistakes, |_| "en".to_string()).unwrap();

        assert_eq!(result.corrected_text, "foo bars baz");
        assert_eq!(result.skipped, vec![0]);
        assert_eq!(result.entries.len(), 1);
    }

    #[test]
    fn only_first_suggestion_is_used() {
        let mistakes = vec![SpellingMistake::new(0, 4, &["Тест", "Текст"])];
        let result = reconcile("Тэст", &mistakes, ru).unwrap();
        assert_eq!(result.corrected_text, "Тест");
    }

    #[test]
    fn detect_called_once_per_applied_correction() {
        let mistakes = vec![
            SpellingMistake::new(0, 1, &["A"]),
            SpellingMistake::new(2, 1, &[]),
            SpellingMistake::new(4, 1, &["C"]),
        ];
        let mut seen = Vec::new();
        reconcile("a b c", &mistakes, |word| {
            seen.push(word.to_string());
            "en".to_string()
        })
        .unwrap();
        assert_eq!(seen, vec!["A", "C"]);
    }

    #[test]
    fn overlapping_spans_are_rejected() {
        let mistakes = vec![
            SpellingMistake::new(0, 5, &["x"]),
            SpellingMistake::new(3, 2, &["y"]),
        ];
        let err = reconcile("abcdefgh", &mistakes, ru).unwrap_err();
        assert_eq!(
            err,
            ReconcileError::Unordered {
                index: 1,
                position: 3,
                previous_end: 5
            }
        );
    }

    #[test]
    fn descending_spans_are_rejected() {
        let mistakes = vec![
            SpellingMistake::new(6, 2, &["x"]),
            SpellingMistake::new(0, 2, &["y"]),
        ];
        assert!(matches!(
            reconcile("abcdefgh", &mistakes, ru),
            Err(ReconcileError::Unordered { index: 1, .. })
        ));
    }

    #[test]
    fn span_past_end_is_rejected() {
        let mistakes = vec![SpellingMistake::new(2, 5, &["x"])];
        assert!(matches!(
            reconcile("abcd", &mistakes, ru),
            Err(ReconcileError::OutOfBounds { index: 0, text_len: 4, .. })
        ));
    }

    #[test]
    fn adjacent_spans_are_accepted() {
        let mistakes = vec![
            SpellingMistake::new(0, 2, &["X"]),
            SpellingMistake::new(2, 2, &["Y"]),
        ];
        let result = reconcile("abcd", &mistakes, ru).unwrap();
        assert_eq!(result.corrected_text, "XY");
    }
}
