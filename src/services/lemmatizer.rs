use rsmorphy::prelude::*;

/// Maps a corrected word to the dictionary form used as the mistake key.
pub trait Lemmatizer: Send + Sync {
    fn normalize(&self, word: &str) -> String;
}

/// Keys mistakes by the trimmed, lower-cased word.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowercaseLemmatizer;

impl Lemmatizer for LowercaseLemmatizer {
    fn normalize(&self, word: &str) -> String {
        word.trim().to_lowercase()
    }
}

/// Russian morphology from the OpenCorpora dictionary. Words without Cyrillic
/// letters, or that the analyzer cannot parse, fall back to lower-casing.
pub struct MorphLemmatizer {
    morph: MorphAnalyzer,
}

impl MorphLemmatizer {
    /// Loads the bundled Russian dictionary. Takes a moment; build once at startup.
    pub fn russian() -> Self {
        let morph = MorphAnalyzer::from_file(rsmorphy_dict_ru::DICT_PATH);
        tracing::info!("russian morphology dictionary loaded");
        Self { morph }
    }

    fn normal_form(&self, word: &str) -> Option<String> {
        let parsed = self.morph.parse(word);
        let best = parsed.first()?;
        let lemma = best.lex.get_normal_form(&self.morph).to_lowercase();
        (!lemma.is_empty()).then_some(lemma)
    }
}

impl Lemmatizer for MorphLemmatizer {
    fn normalize(&self, word: &str) -> String {
        let word = LowercaseLemmatizer.normalize(word);
        if !word.chars().any(is_cyrillic) {
            return word;
        }
        self.normal_form(&word).unwrap_or(word)
    }
}

fn is_cyrillic(ch: char) -> bool {
    ('\u{0400}'..='\u{04FF}').contains(&ch)
}
