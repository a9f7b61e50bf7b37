//! Language detection over extracted body text.
//!
//! There is no dependency on a statistical language-ID model; scoring is a
//! handful of cheap signals layered in order of confidence: right-to-left
//! script majority, CJK/Cyrillic code point ranges, then a small stopword
//! scorer for the Latin-script languages the feed corpus actually contains.
//! Anything that scores under the confidence floor defaults to `"en"`.

const MIN_CONFIDENCE: u32 = 5;
const SAMPLE_LEN: usize = 4000;

pub struct LanguageDetector;

impl LanguageDetector {
    /// Best-effort two-letter (or `pt-br`-style) language tag for `text`.
    pub fn detect(text: &str) -> String {
        let sample: String = text.chars().take(SAMPLE_LEN).collect();
        if sample.trim().is_empty() {
            return "en".to_string();
        }

        if let Some(lang) = Self::detect_by_script(&sample) {
            return lang;
        }

        Self::detect_by_stopwords(&sample).unwrap_or_else(|| "en".to_string())
    }

    /// Scripts whose presence alone is decisive: Hebrew, Arabic, CJK, Cyrillic.
    fn detect_by_script(sample: &str) -> Option<String> {
        let total = sample.chars().filter(|c| c.is_alphabetic()).count();
        if total == 0 {
            return None;
        }

        let counts = [
            ("he", is_hebrew as fn(char) -> bool),
            ("ar", is_arabic),
            ("zh", is_cjk),
            ("ru", is_cyrillic),
        ];

        for (lang, predicate) in counts {
            let hits = sample.chars().filter(|&c| predicate(c)).count();
            if hits * 2 > total {
                return Some(lang.to_string());
            }
        }
        None
    }

    fn detect_by_stopwords(sample: &str) -> Option<String> {
        let lowered = sample.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            return None;
        }

        let mut best: Option<(&str, u32)> = None;
        for (lang, stopwords) in STOPWORD_TABLE {
            let score = words.iter().filter(|w| stopwords.contains(w)).count() as u32;
            if best.map(|(_, best_score)| score > best_score).unwrap_or(true) {
                best = Some((lang, score));
            }
        }

        match best {
            Some((lang, score)) if score >= MIN_CONFIDENCE => Some(lang.to_string()),
            _ => None,
        }
    }
}

fn is_hebrew(c: char) -> bool {
    matches!(c as u32, 0x0590..=0x05FF)
}

fn is_arabic(c: char) -> bool {
    matches!(c as u32, 0x0600..=0x06FF | 0x0750..=0x077F)
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32, 0x4E00..=0x9FFF | 0x3040..=0x30FF | 0xAC00..=0xD7AF)
}

fn is_cyrillic(c: char) -> bool {
    matches!(c as u32, 0x0400..=0x04FF)
}

const STOPWORD_TABLE: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "the", "and", "of", "to", "in", "a", "is", "that", "for", "on", "with", "was", "as",
            "it", "by", "at", "from", "this", "be", "are",
        ],
    ),
    (
        "es",
        &[
            "el", "la", "de", "que", "y", "en", "un", "por", "con", "para", "los", "las", "se",
            "su", "es", "al", "lo", "como", "pero", "del",
        ],
    ),
    (
        "fr",
        &[
            "le", "la", "de", "et", "les", "des", "un", "une", "que", "dans", "pour", "est",
            "qui", "au", "aux", "ce", "par", "sur", "ne", "pas",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "und", "das", "den", "ein", "eine", "ist", "von", "zu", "mit", "im",
            "auf", "nicht", "sich", "fur", "auch", "dem", "als", "werden",
        ],
    ),
    (
        "pt",
        &[
            "o", "a", "de", "que", "e", "do", "da", "em", "um", "para", "com", "nao", "uma",
            "os", "no", "se", "na", "por", "mais", "as",
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_english_on_empty_text() {
        assert_eq!(LanguageDetector::detect(""), "en");
    }

    #[test]
    fn defaults_to_english_below_confidence_floor() {
        assert_eq!(LanguageDetector::detect("Xq Zv Wk Plm"), "en");
    }

    #[test]
    fn detects_english_prose() {
        let text = "The report was released on Monday, and it is expected that the \
                     committee will review the findings from the regional office.";
        assert_eq!(LanguageDetector::detect(text), "en");
    }

    #[test]
    fn detects_spanish_prose() {
        let text = "El informe fue publicado el lunes y se espera que el comite revise \
                     los resultados de la oficina regional para el proximo mes con los datos.";
        assert_eq!(LanguageDetector::detect(text), "es");
    }

    #[test]
    fn detects_hebrew_by_script_majority() {
        let text = "זהו טקסט בעברית שמכיל מספר מילים כדי לבדוק את הזיהוי של השפה";
        assert_eq!(LanguageDetector::detect(text), "he");
    }

    #[test]
    fn detects_cjk_by_script_majority() {
        let text = "这是一段用于测试语言检测功能的中文文本内容";
        assert_eq!(LanguageDetector::detect(text), "zh");
    }
}
