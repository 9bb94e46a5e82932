//! Ratcliff/Obershelp similarity between identifiers
//!
//! The ratio is `2 * M / (len(a) + len(b))` where `M` counts the characters in
//! the matching blocks. Blocks are found by taking the longest common substring,
//! then recursing on the pieces left and right of it. Among equally long
//! substrings the one starting earliest in `a` wins, then earliest in `b`.

use std::collections::HashMap;

/// Similarity of two strings in `[0, 1]`, 1.0 when both are empty
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

/// Number of characters covered by the matching blocks of `a` and `b`
pub fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut positions: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &c) in b.iter().enumerate() {
        positions.entry(c).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, size) = longest_match(a, &positions, (a_lo, a_hi), (b_lo, b_hi));
        if size == 0 {
            continue;
        }
        matched += size;
        if a_lo < i && b_lo < j {
            pending.push((a_lo, i, b_lo, j));
        }
        if i + size < a_hi && j + size < b_hi {
            pending.push((i + size, a_hi, j + size, b_hi));
        }
    }
    matched
}

/// Longest common substring of `a[a_lo..a_hi]` and `b[b_lo..b_hi]`
///
/// Returns `(start_in_a, start_in_b, length)`.
fn longest_match(
    a: &[char],
    positions: &HashMap<char, Vec<usize>>,
    (a_lo, a_hi): (usize, usize),
    (b_lo, b_hi): (usize, usize),
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (a_lo, b_lo, 0);

    // run_lengths[j] = length of the common run ending at a[i - 1], b[j]
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();
    for i in a_lo..a_hi {
        let Some(c) = a.get(i) else {
            break;
        };
        let mut next_runs = HashMap::new();
        if let Some(js) = positions.get(c) {
            for &j in js {
                if j < b_lo {
                    continue;
                }
                if j >= b_hi {
                    break;
                }
                let previous = j
                    .checked_sub(1)
                    .and_then(|k| run_lengths.get(&k))
                    .copied()
                    .unwrap_or(0);
                let size = previous + 1;
                next_runs.insert(j, size);
                if size > best_size {
                    best_i = i + 1 - size;
                    best_j = j + 1 - size;
                    best_size = size;
                }
            }
        }
        run_lengths = next_runs;
    }

    (best_i, best_j, best_size)
}
