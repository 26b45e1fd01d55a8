use std::cmp;
use std::mem;

/// Compute the Levenshtein edit distance between two strings.
///
/// The distance is the minimum number of single-character insertions,
/// deletions and substitutions required to transform `a` into `b`. It is
/// symmetric, zero if and only if the strings are equal, and defined for all
/// inputs, including empty strings.
///
/// Characters are compared by Unicode code point. No case folding or
/// normalization happens here; callers wanting a case-insensitive distance
/// must fold case before calling (the matcher does exactly that).
pub fn levenshtein(a: &str, b: &str) -> usize {
    // Keep the shorter string in the inner dimension so the rolling rows
    // below are O(min(m, n)) in size. The distance is symmetric, so swapping
    // the arguments does not change the result.
    let (short, long) = {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        if a.len() <= b.len() {
            (a, b)
        } else {
            (b, a)
        }
    };
    if short.is_empty() {
        return long.len();
    }

    // Wagner-Fischer, keeping only the previous and current row of the
    // conceptual (long+1) x (short+1) matrix.
    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut cur: Vec<usize> = vec![0; short.len() + 1];
    for (i, &lc) in long.iter().enumerate() {
        cur[0] = i + 1;
        for (j, &sc) in short.iter().enumerate() {
            let cost = if lc == sc { 0 } else { 1 };
            cur[j + 1] = cmp::min(
                prev[j + 1] + 1, // deletion
                cmp::min(
                    cur[j] + 1,     // insertion
                    prev[j] + cost, // substitution
                ),
            );
        }
        mem::swap(&mut prev, &mut cur);
    }
    prev[short.len()]
}

/// Compute the length-normalized Levenshtein distance between two strings.
///
/// The raw edit distance is divided by the character count of the longer
/// string, yielding a value in `[0, 1]` where `0.0` means the strings are
/// identical and `1.0` means they have nothing in common. Two empty strings
/// have a normalized distance of `0.0`.
pub fn normalized_levenshtein(a: &str, b: &str) -> f64 {
    let max_len = cmp::max(a.chars().count(), b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    levenshtein(a, b) as f64 / max_len as f64
}
