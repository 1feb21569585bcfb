//! Unique, length-bounded sheet names.
//!
//! Each document gets its own sheet named after the file. Names must be unique
//! within a workbook and fit the format's length cap, so labels are cleaned,
//! truncated and, on collision, suffixed `_1`, `_2`, … with the base shortened
//! to make room for the suffix. Uniqueness ignores case, as spreadsheet sheet
//! names and some filesystems do.
//!
//! Once a decimal suffix no longer fits the bound, candidates switch to
//! fixed-width base-36 names (`0a`, `0b`, …) so the bound still holds.

use std::collections::HashSet;

/// Name used when a label is empty after cleaning.
pub const FALLBACK_SHEET_NAME: &str = "Sheet1";

/// Smallest usable bound: leaves room for one base character or a one-digit suffix.
pub const MIN_SHEET_NAME_LEN: usize = 2;

/// Characters the spreadsheet format rejects in sheet names.
const INVALID_CHARS: &[char] = &['/', '\\', '?', '*', '[', ']', ':'];

fn clean_label(label: &str) -> String {
    label
        .chars()
        .map(|c| if INVALID_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

/// `counter` in base 36, left-padded with `0` to `width`. `None` if it does not fit.
fn compact_name(mut counter: u64, width: usize) -> Option<String> {
    let mut digits = Vec::new();
    while counter > 0 {
        let digit = (counter % 36) as u32;
        digits.push(char::from_digit(digit, 36)?);
        counter /= 36;
    }
    if digits.len() > width {
        return None;
    }
    digits.resize(width, '0');
    Some(digits.into_iter().rev().collect())
}

/// Candidate for the `counter`-th collision on `base`.
fn collision_candidate(base: &str, counter: u64, max_len: usize) -> String {
    let suffix = format!("_{counter}");
    let suffix_len = suffix.chars().count();
    if suffix_len <= max_len {
        return format!("{}{suffix}", truncate_chars(base, max_len - suffix_len));
    }
    // Past 36^max_len names the bound cannot hold; fall back to the plain suffix.
    compact_name(counter, max_len).unwrap_or_else(|| format!("{base}{suffix}"))
}

/// Map `label` to an identifier absent from `used`, record it, and return it.
///
/// Deterministic: the same label sequence against the same starting set
/// always yields the same identifiers. `max_len` is raised to
/// `MIN_SHEET_NAME_LEN`; every result then has at most `max_len` characters.
/// Names already in `used` block their case variants.
pub fn sanitize_identifier(label: &str, used: &mut HashSet<String>, max_len: usize) -> String {
    let max_len = max_len.max(MIN_SHEET_NAME_LEN);
    let taken: HashSet<String> = used.iter().map(|name| fold(name)).collect();

    let mut base = truncate_chars(&clean_label(label), max_len);
    if base.is_empty() {
        base = truncate_chars(FALLBACK_SHEET_NAME, max_len);
    }

    let mut candidate = base.clone();
    let mut counter: u64 = 1;
    while taken.contains(&fold(&candidate)) {
        candidate = collision_candidate(&base, counter, max_len);
        counter += 1;
    }

    if candidate.chars().count() > max_len {
        tracing::warn!(name = %candidate, max_len, "Identifier space exhausted; name exceeds bound");
    }
    used.insert(candidate.clone());
    candidate
}

/// Identifiers allocated during one batch run.
///
/// Owned by the run and passed by `&mut`; a new run starts with a new registry.
#[derive(Debug, Clone)]
pub struct SheetNameRegistry {
    used: HashSet<String>,
    max_len: usize,
}

impl SheetNameRegistry {
    pub fn new(max_len: usize) -> Self {
        Self {
            used: HashSet::new(),
            max_len: max_len.max(MIN_SHEET_NAME_LEN),
        }
    }

    pub fn allocate(&mut self, label: &str) -> String {
        sanitize_identifier(label, &mut self.used, self.max_len)
    }

    /// Case-insensitive, like allocation.
    pub fn contains(&self, name: &str) -> bool {
        let folded = fold(name);
        self.used.iter().any(|used| fold(used) == folded)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl Default for SheetNameRegistry {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_SHEET_NAME_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_labels_get_numeric_suffixes() {
        let mut registry = SheetNameRegistry::new(10);
        let names: Vec<String> = ["Login", "Login", "Login"]
            .iter()
            .map(|l| registry.allocate(l))
            .collect();
        assert_eq!(names, vec!["Login", "Login_1", "Login_2"]);
    }

    #[test]
    fn long_labels_are_truncated() {
        let mut registry = SheetNameRegistry::default();
        let label = "Especificacao_de_Requisitos_do_Modulo_de_Pagamentos";
        let name = registry.allocate(label);
        assert_eq!(name.chars().count(), 31);
        assert_eq!(name, &label[..31]);
    }

    #[test]
    fn suffix_shortens_the_base_not_itself() {
        let mut registry = SheetNameRegistry::new(8);
        assert_eq!(registry.allocate("Requisitos"), "Requisit");
        assert_eq!(registry.allocate("Requisitos"), "Requis_1");
        assert_eq!(registry.allocate("Requisitos"), "Requis_2");
    }

    #[test]
    fn suffix_growth_keeps_bound() {
        let mut registry = SheetNameRegistry::new(6);
        let names: Vec<String> = (0..25).map(|_| registry.allocate("Cadastro")).collect();
        assert!(names.iter().all(|n| n.chars().count() <= 6));
        assert_eq!(names[10], "Cad_10");
        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn tiny_bound_still_progresses() {
        let mut registry = SheetNameRegistry::new(0);
        assert_eq!(registry.max_len(), MIN_SHEET_NAME_LEN);
        let names: Vec<String> = (0..5).map(|_| registry.allocate("abc")).collect();
        assert_eq!(names, vec!["ab", "_1", "_2", "_3", "_4"]);
    }

    #[test]
    fn minimum_bound_holds_past_nine_collisions() {
        let mut registry = SheetNameRegistry::new(2);
        let names: Vec<String> = (0..40).map(|_| registry.allocate("ab")).collect();
        assert!(names.iter().all(|n| n.chars().count() <= 2), "{names:?}");
        assert_eq!(names[9], "_9");
        assert_eq!(names[10], "0a");
        assert_eq!(names[11], "0b");
        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn free_function_clamps_tiny_bounds() {
        let mut used = HashSet::new();
        let names: Vec<String> = (0..12)
            .map(|_| sanitize_identifier("abc", &mut used, 0))
            .collect();
        assert_eq!(names[0], "ab");
        assert!(names.iter().all(|n| n.chars().count() <= MIN_SHEET_NAME_LEN));
        assert_eq!(used.len(), 12);
    }

    #[test]
    fn compact_names_are_fixed_width() {
        assert_eq!(compact_name(10, 2).as_deref(), Some("0a"));
        assert_eq!(compact_name(36, 2).as_deref(), Some("10"));
        assert_eq!(compact_name(1295, 2).as_deref(), Some("zz"));
        assert_eq!(compact_name(1296, 2), None);
    }

    #[test]
    fn case_variants_collide() {
        let mut registry = SheetNameRegistry::new(10);
        assert_eq!(registry.allocate("Login"), "Login");
        assert_eq!(registry.allocate("login"), "login_1");
        assert_eq!(registry.allocate("LOGIN"), "LOGIN_2");
        assert!(registry.contains("lOgIn_1"));
    }

    #[test]
    fn empty_label_uses_fallback() {
        let mut registry = SheetNameRegistry::default();
        assert_eq!(registry.allocate(""), "Sheet1");
        assert_eq!(registry.allocate(""), "Sheet1_1");
    }

    #[test]
    fn invalid_characters_are_replaced() {
        let mut registry = SheetNameRegistry::default();
        assert_eq!(registry.allocate("v1/v2: [draft]?*"), "v1_v2_ _draft___");
    }

    #[test]
    fn multibyte_labels_truncate_on_characters() {
        let mut registry = SheetNameRegistry::new(5);
        assert_eq!(registry.allocate("Ações de usuário"), "Ações");
        assert_eq!(registry.allocate("Ações de usuário"), "Açõ_1");
    }

    #[test]
    fn allocation_is_deterministic() {
        let labels = ["Login", "Relatórios", "Login", "", "Relatórios", "Login"];
        let run = || {
            let mut registry = SheetNameRegistry::new(10);
            labels.iter().map(|l| registry.allocate(l)).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn free_function_records_into_caller_set() {
        let mut used: HashSet<String> = ["Resumo".to_string()].into_iter().collect();
        let name = sanitize_identifier("Resumo", &mut used, 31);
        assert_eq!(name, "Resumo_1");
        assert!(used.contains("Resumo_1"));
        assert_eq!(used.len(), 2);
    }

    #[test]
    fn registry_tracks_allocations() {
        let mut registry = SheetNameRegistry::default();
        assert!(registry.is_empty());
        registry.allocate("A");
        assert!(registry.contains("A"));
        assert_eq!(registry.len(), 1);
    }
}
