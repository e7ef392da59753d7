//! Bigram (Dice coefficient) string similarity.

use std::collections::HashMap;

/// Dice coefficient over character bigrams, in [0, 1].
///
/// Whitespace is ignored. Identical strings score 1; strings shorter than
/// two characters share no bigrams and score 0 unless identical.
pub fn dice_coefficient(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.chars().filter(|c| !c.is_whitespace()).collect();
    let b: Vec<char> = b.chars().filter(|c| !c.is_whitespace()).collect();

    if a == b {
        return 1.0;
    }
    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }

    let mut bigrams: HashMap<(char, char), usize> = HashMap::with_capacity(a.len());
    for pair in a.windows(2) {
        *bigrams.entry((pair[0], pair[1])).or_insert(0) += 1;
    }

    let mut shared = 0usize;
    for pair in b.windows(2) {
        if let Some(count) = bigrams.get_mut(&(pair[0], pair[1])) {
            if *count > 0 {
                *count -= 1;
                shared += 1;
            }
        }
    }

    (2 * shared) as f32 / (a.len() + b.len() - 2) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings() {
        assert_eq!(dice_coefficient("cardapio", "cardapio"), 1.0);
        assert_eq!(dice_coefficient("", ""), 1.0);
    }

    #[test]
    fn test_disjoint_strings() {
        assert_eq!(dice_coefficient("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_short_strings() {
        assert_eq!(dice_coefficient("a", "ab"), 0.0);
        assert_eq!(dice_coefficient("a", "a"), 1.0);
    }

    #[test]
    fn test_known_value() {
        // ve eg ga an na / ve eg ga an no -> 4 shared of 10
        let sim = dice_coefficient("vegana", "vegano");
        assert!((sim - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_typo_scores_high() {
        assert!(dice_coefficient("cardapio", "cardapo") > 0.7);
        assert!(dice_coefficient("horario", "horaro") > 0.7);
    }

    #[test]
    fn test_symmetric() {
        let pairs = [("recarga", "recarregar"), ("fila", "filas"), ("pix", "pixel")];
        for (a, b) in pairs {
            assert!((dice_coefficient(a, b) - dice_coefficient(b, a)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_repeated_bigrams_counted_once_each() {
        // "aaaa" has three "aa" bigrams, "aa" only one.
        let sim = dice_coefficient("aaaa", "aa");
        assert!((sim - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_whitespace_ignored() {
        assert_eq!(dice_coefficient("bom dia", "bomdia"), 1.0);
    }
}
