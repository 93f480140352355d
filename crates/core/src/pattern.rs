//! Glob patterns for selecting which keys an index covers
//!
//! Supported syntax:
//! - `*` matches any sequence of characters (including none)
//! - `?` matches exactly one character
//! - every other character matches itself
//!
//! Matching is over `char`s, so `?` consumes one Unicode scalar value.

/// Check whether `key` matches the glob `pattern`
///
/// Runs in O(pattern × key) worst case using single-star backtracking.
pub fn matches(pattern: &str, key: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();

    let (mut p, mut k) = (0usize, 0usize);
    // Position of the last `*` seen and the key position it was tried at
    let mut star: Option<(usize, usize)> = None;

    while k < key.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == key[k]) {
            p += 1;
            k += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, k));
            p += 1;
        } else if let Some((star_p, star_k)) = star {
            // Let the last star absorb one more character
            p = star_p + 1;
            k = star_k + 1;
            star = Some((star_p, star_k + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
