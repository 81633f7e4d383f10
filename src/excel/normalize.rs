use regex::Regex;
use std::sync::LazyLock;

static SPACED_HYPHEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*-\s*").expect("valid regex"));

/// Forma canónica de una etiqueta de turma.
///
/// Mayúsculas, sin espacios alrededor de guiones y sin ningún otro espacio:
/// `"ti - 27"` -> `"TI-27"`, `"TI 27"` -> `"TI27"`. Es idempotente, y debe
/// aplicarse en todo lugar donde se lee o escribe un nombre de turma.
pub fn normalize_turma(raw: &str) -> String {
    let upper = raw.to_uppercase();
    let collapsed = SPACED_HYPHEN.replace_all(upper.trim(), "-");
    collapsed.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Prefijo de curso de una turma normalizada: las letras iniciales (`"TI27"` -> `"TI"`).
pub fn course_prefix(normalized: &str) -> Option<String> {
    let prefix: String = normalized.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    if prefix.is_empty() { None } else { Some(prefix) }
}
