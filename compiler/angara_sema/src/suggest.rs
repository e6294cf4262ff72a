//! "Did you mean?" suggestions.
//!
//! When an identifier or module name fails to resolve, the analyzer asks
//! this module for the closest visible name by Levenshtein edit distance.
//! The suggestion is advisory: it only ever ends up in a `help:` line.
//!
//! # Policy
//!
//! A candidate qualifies when `distance <= max(2, ceil(len / 3))`, where
//! `len` is the byte length of the misspelled name. Among qualifying
//! candidates the smallest distance wins, then the shortest candidate, then
//! the alphabetically first. An exact match is never suggested.

/// Levenshtein edit distance over bytes.
///
/// Insertions, deletions, and substitutions each cost 1. Uses two rolling
/// rows sized by the shorter input, so memory is `O(min(|a|, |b|))`.
///
/// ```
/// use angara_sema::suggest::levenshtein;
///
/// assert_eq!(levenshtein("kitten", "sitting"), 3);
/// assert_eq!(levenshtein("", "abc"), 3);
/// ```
pub fn levenshtein(a: &str, b: &str) -> usize {
    let (long, short) = if a.len() >= b.len() {
        (a.as_bytes(), b.as_bytes())
    } else {
        (b.as_bytes(), a.as_bytes())
    };
    if short.is_empty() {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr: Vec<usize> = vec![0; short.len() + 1];

    for (i, &lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &sc) in short.iter().enumerate() {
            let substitution = prev[j] + usize::from(lc != sc);
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            curr[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

/// Largest edit distance still worth suggesting for a name of `len` bytes.
pub fn suggestion_threshold(len: usize) -> usize {
    len.div_ceil(3).max(2)
}

/// Pick the best near-miss for `name` among `candidates`.
pub fn suggest_similar<'a>(
    name: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<&'a str> {
    suggest_within(name, candidates, suggestion_threshold(name.len()))
}

fn suggest_within<'a>(
    name: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    threshold: usize,
) -> Option<&'a str> {
    if name.is_empty() {
        return None;
    }

    let mut best: Option<(usize, &'a str)> = None;
    for candidate in candidates {
        if candidate == name || name.len().abs_diff(candidate.len()) > threshold {
            continue;
        }
        let distance = levenshtein(name, candidate);
        if distance > threshold {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_distance, best_name)) => {
                (distance, candidate.len(), candidate) < (best_distance, best_name.len(), best_name)
            }
        };
        if better {
            best = Some((distance, candidate));
        }
    }

    best.map(|(_, candidate)| candidate)
}
