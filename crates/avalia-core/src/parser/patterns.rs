//! Line patterns shared by the extraction passes.
//!
//! Heading patterns run against single lines of the original response
//! (trailing `\r` removed), so byte offsets stay valid for slicing section
//! bodies. Accent tolerance is spelled out in the character classes.
//! Marker patterns run against accent-folded, lowercased text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // =========================================================================
    // SECTION HEADINGS
    // =========================================================================

    /// `## Critério 2.1: Title`, `## Criterio 3 - Title`, `## **Criterion 1**`, `## Critério: Title`
    pub static ref PRIMARY_HEADING: Regex = Regex::new(
        r"(?i)^[ \t]*##[ \t*_]*(?:crit(?:e|é|e\x{0301})rio|criterion)(?:[ \t]*(?:n[º°o]\.?[ \t]*|#[ \t]*)?(?P<num>\d+(?:\.\d+)*)|\b)[ \t]*[:.)\-–—]?(?P<title>.*)$"
    ).unwrap();

    /// `1: Title`, `## 2: Title`, `**Critério 3:** Title`
    pub static ref SIMPLIFIED_HEADING: Regex = Regex::new(
        r"(?i)^[ \t]*(?:#{1,6}[ \t]*)?[*_]*[ \t]*(?:(?:crit(?:e|é|e\x{0301})rio|criterion)[ \t]*)?(?P<num>\d+)[ \t]*[*_]*[ \t]*:(?P<title>.*)$"
    ).unwrap();

    /// Anything shaped like `N:` after non-alphanumeric decoration.
    pub static ref MINIMAL_HEADING: Regex = Regex::new(
        r"(?i)^[^\p{L}\p{N}\r\n]*(?:(?:crit(?:e|é|e\x{0301})rio|criterion)[ \t.]*)?(?P<num>\d+(?:\.\d+)*)[^\p{L}\p{N}:]*:(?P<title>.*)$"
    ).unwrap();

    // =========================================================================
    // SECTION BOUNDARIES
    // =========================================================================

    /// Level-1 or level-2 heading of the closing "general result /
    /// recommendations" section. Deeper headings are criterion subheadings.
    pub static ref SUMMARY_HEADING: Regex = Regex::new(
        r"(?i)^[ \t]*#{1,2}[ \t*_]*(?:\d+[.)]?[ \t]*)?(?:resultados?[ \t]+gera(?:l|is)|recomenda(?:ç|c)(?:õ|o)es[ \t]+gerais|conclus(?:ã|a)o(?:[ \t]+geral)?|resumo(?:[ \t]+geral)?|avalia(?:ç|c)(?:ã|a)o[ \t]+geral|considera(?:ç|c)(?:õ|o)es[ \t]+finais|overall[ \t]+(?:result|assessment|summary)|general[ \t]+(?:result|recommendations)|summary|conclusion)\b.*$"
    ).unwrap();

    /// End-of-document sentinel emitted after the last section.
    pub static ref SENTINEL: Regex = Regex::new(
        r"(?i)^[ \t]*(?:<!--[ \t]*(?:end|fim)\b[^>]*-->|[-=#*_ \t]*(?:fim[ \t]+do[ \t]+relat(?:ó|o)rio|fim[ \t]+da[ \t]+an(?:á|a)lise|end[ \t]+of[ \t]+(?:report|analysis))[-=#*_ \t]*)$"
    ).unwrap();

    /// Opening or closing line of a fenced code block.
    pub static ref CODE_FENCE: Regex = Regex::new(
        r"^[ \t]{0,3}(?:```|~~~)"
    ).unwrap();

    /// Markdown horizontal rule (`---`, `***`, `_ _ _`).
    pub static ref HORIZONTAL_RULE: Regex = Regex::new(
        r"^[ \t]*(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|(?:_[ \t]*){3,})$"
    ).unwrap();

    // =========================================================================
    // STATUS MARKERS (folded text)
    // =========================================================================

    /// Line that labels the verdict: `**Status:** ...`, `- Situação: ...`
    pub static ref STATUS_LABEL: Regex = Regex::new(
        r"^[^\p{L}\n]*(?:status|situacao|conformidade|resultado|avaliacao|veredito|verdict)\b(?P<value>.*)$"
    ).unwrap();

    pub static ref PARTIAL_STATUS: Regex = Regex::new(
        r"\b(?:parcialmente|parcial|partially|partial)\b|⚠|🟡"
    ).unwrap();

    pub static ref NON_CONFORMANT_STATUS: Regex = Regex::new(
        r"\b(?:nao[ \t-]+(?:(?:esta|e|foi|foram|sao|se[ \t]+encontra)[ \t]+)?(?:conforme|atende|atendid[oa]s?)|nao[ \t-]+conformidade|inconforme|desconforme|non[ \t-]?(?:conformant|compliant|conforming)|not[ \t-]+(?:conformant|compliant|met))\b|❌|🔴|✗"
    ).unwrap();

    pub static ref CONFORMANT_STATUS: Regex = Regex::new(
        r"\b(?:conforme|atende|atendido|conformant|compliant|conforming)\b|✅|🟢|✔"
    ).unwrap();

    // =========================================================================
    // CONFIDENCE MARKERS (folded text)
    // =========================================================================

    /// Line that labels the confidence: `**Confiança:** 85%`
    pub static ref CONFIDENCE_LABEL: Regex = Regex::new(
        r"^[^\p{L}\n]*(?:nivel[ \t]+de[ \t]+)?(?:confianca|confidence|certeza)\b[^:\n]*:(?P<value>.*)$"
    ).unwrap();

    /// First number on a labelled line, with optional percent sign.
    pub static ref LABELLED_NUMBER: Regex = Regex::new(
        r"(?P<num>\d+(?:[.,]\d+)?)[ \t]*(?P<pct>%)?"
    ).unwrap();

    /// Unlabelled confidence: a percentage or a decimal in [0, 1].
    pub static ref LOOSE_CONFIDENCE: Regex = Regex::new(
        r"(?P<pct>\d+(?:[.,]\d+)?)[ \t]*%|\b(?P<dec>0[.,]\d+|1[.,]0+)\b"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_heading_variants() {
        for line in [
            "## Critério 1: Legibilidade",
            "## Criterio 1: Legibilidade",
            "## CRITÉRIO 1: Legibilidade",
            "##Critério 1 - Legibilidade",
            "## **Critério 1: Legibilidade**",
            "## Criterion 1: Readability",
            "## Crite\u{0301}rio 1: Legibilidade",
        ] {
            assert!(PRIMARY_HEADING.is_match(line), "should match: {}", line);
        }

        let caps = PRIMARY_HEADING.captures("## Critério 2.1: Coesão").unwrap();
        assert_eq!(&caps["num"], "2.1");
        assert_eq!(caps["title"].trim(), "Coesão");

        let caps = PRIMARY_HEADING.captures("## Critério: Sem número").unwrap();
        assert!(caps.name("num").is_none());
    }

    #[test]
    fn test_primary_heading_rejects() {
        assert!(!PRIMARY_HEADING.is_match("### Critério 1: Nível errado"));
        assert!(!PRIMARY_HEADING.is_match("# Critério 1: Nível errado"));
        assert!(!PRIMARY_HEADING.is_match("## Critérios Avaliados"));
        assert!(!PRIMARY_HEADING.is_match("Critério 1: sem marcador"));
    }

    #[test]
    fn test_simplified_heading() {
        let caps = SIMPLIFIED_HEADING.captures("1: Legibilidade").unwrap();
        assert_eq!(&caps["num"], "1");
        assert!(SIMPLIFIED_HEADING.is_match("## 2: Testes"));
        assert!(SIMPLIFIED_HEADING.is_match("**Critério 3:** Documentação"));
        assert!(!SIMPLIFIED_HEADING.is_match("2.1: Subitem"));
        assert!(!SIMPLIFIED_HEADING.is_match("- 1: Lista"));
    }

    #[test]
    fn test_minimal_heading() {
        assert!(MINIMAL_HEADING.is_match("- 1: Lista"));
        assert!(MINIMAL_HEADING.is_match("**1**: Negrito"));
        assert!(MINIMAL_HEADING.is_match("2.1: Subitem"));
        assert!(!MINIMAL_HEADING.is_match("Linha 42: uso de unwrap"));
    }

    #[test]
    fn test_summary_heading() {
        assert!(SUMMARY_HEADING.is_match("## Resultado Geral"));
        assert!(SUMMARY_HEADING.is_match("## RECOMENDAÇÕES GERAIS"));
        assert!(SUMMARY_HEADING.is_match("# Conclusão"));
        assert!(SUMMARY_HEADING.is_match("## Overall Result"));
        assert!(!SUMMARY_HEADING.is_match("## Critério 1: Resumo"));
        assert!(!SUMMARY_HEADING.is_match("Resultado Geral"));
        assert!(!SUMMARY_HEADING.is_match("### Conclusão"));
        assert!(!SUMMARY_HEADING.is_match("#### Resumo"));
    }

    #[test]
    fn test_confidence_label_anchored() {
        assert!(CONFIDENCE_LABEL.is_match("**confianca:** 85%"));
        assert!(CONFIDENCE_LABEL.is_match("- nivel de confianca: 90%"));
        assert!(CONFIDENCE_LABEL.is_match("**confidence**: 0.8"));
        assert!(!CONFIDENCE_LABEL.is_match("com certeza as 5 funcoes precisam de testes."));
        assert!(!CONFIDENCE_LABEL.is_match("tenho confianca no modulo"));
    }

    #[test]
    fn test_sentinel() {
        assert!(SENTINEL.is_match("<!-- END -->"));
        assert!(SENTINEL.is_match("--- FIM DO RELATÓRIO ---"));
        assert!(SENTINEL.is_match("=== End of Report ==="));
        assert!(!SENTINEL.is_match("O fim do relatório mostra..."));
    }

    #[test]
    fn test_horizontal_rule() {
        assert!(HORIZONTAL_RULE.is_match("---"));
        assert!(HORIZONTAL_RULE.is_match("* * *"));
        assert!(!HORIZONTAL_RULE.is_match("-- "));
        assert!(!HORIZONTAL_RULE.is_match("- item"));
    }
}
