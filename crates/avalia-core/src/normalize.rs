//! Accent folding and text normalization.
//!
//! LLM responses mix "Critério" and "Criterio", "Não Conforme" and
//! "Nao Conforme". Keyword matching runs on folded text so both spellings
//! compare equal.

/// Lowercase `text` and strip Latin diacritics.
///
/// Precomposed characters are mapped to their base letter and combining
/// marks (U+0300..=U+036F) are dropped, so decomposed input folds the same
/// way as precomposed input.
pub fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if ('\u{0300}'..='\u{036F}').contains(&c) {
            continue;
        }
        for lower in c.to_lowercase() {
            out.push(base_letter(lower));
        }
    }
    out
}

/// Fold `text` and collapse every run of non-alphanumeric characters into
/// a single space. Used for title comparison.
pub fn normalize_title(text: &str) -> String {
    let folded = fold(text);
    let mut out = String::with_capacity(folded.len());
    let mut pending_space = false;

    for c in folded.chars() {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }

    out
}

fn base_letter(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_portuguese() {
        assert_eq!(fold("Critério"), "criterio");
        assert_eq!(fold("NÃO CONFORME"), "nao conforme");
        assert_eq!(fold("Confiança"), "confianca");
        assert_eq!(fold("Situação"), "situacao");
    }

    #[test]
    fn test_fold_decomposed() {
        // "e" followed by COMBINING ACUTE ACCENT
        assert_eq!(fold("Crite\u{0301}rio"), "criterio");
    }

    #[test]
    fn test_fold_leaves_other_text() {
        assert_eq!(fold("✅ OK 100%"), "✅ ok 100%");
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Princípios **SOLID** "), "principios solid");
        assert_eq!(normalize_title("Tratamento de Erros / Exceções"), "tratamento de erros excecoes");
        assert_eq!(normalize_title("---"), "");
    }
}
