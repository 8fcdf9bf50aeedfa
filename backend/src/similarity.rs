use shared::GeoPoint;

use crate::models::{MatchResult, Route};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SimilarityError {
    #[error("route has no waypoints")]
    EmptyRoute,
}

/// A similarity score together with the common subsequence behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct Similarity {
    pub score: f64,
    pub common: Vec<GeoPoint>,
}

/// Longest common subsequence of two coordinate sequences.
///
/// Points are compared by exact value equality, not geo-tolerant equality:
/// only waypoints that are bit-identical on both sides can match. Both paths
/// derive from the same routing provider at the same resolution, so shared
/// segments really are identical; independently geocoded points never match.
///
/// # Algorithm
///
/// Classic O(m·n) dynamic programming. `dp[i][j]` is the LCS length of
/// `a[0..i)` and `b[0..j)`:
///
/// ```text
/// dp[i][j] = dp[i-1][j-1] + 1              if a[i-1] == b[j-1]
///          = max(dp[i-1][j], dp[i][j-1])   otherwise
/// ```
///
/// The backtrack from `dp[m][n]` moves up (consuming from `a`) only when
/// `dp[i-1][j] > dp[i][j-1]`; ties consume from `b` first. That fixes one
/// deterministic subsequence among the equally long alternatives.
pub fn longest_common_subsequence(a: &[GeoPoint], b: &[GeoPoint]) -> Vec<GeoPoint> {
    let (m, n) = (a.len(), b.len());
    let mut dp = vec![vec![0usize; n + 1]; m + 1];

    for i in 1..=m {
        for j in 1..=n {
            dp[i][j] = if a[i - 1] == b[j - 1] {
                dp[i - 1][j - 1] + 1
            } else {
                dp[i - 1][j].max(dp[i][j - 1])
            };
        }
    }

    let mut common = Vec::with_capacity(dp[m][n]);
    let (mut i, mut j) = (m, n);
    while i > 0 && j > 0 {
        if a[i - 1] == b[j - 1] {
            common.push(a[i - 1]);
            i -= 1;
            j -= 1;
        } else if dp[i - 1][j] > dp[i][j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    common.reverse();
    common
}

/// Spatial similarity of two paths: LCS length normalized by the shorter
/// path's length, in [0, 1]. An empty path on either side is an error, not
/// a zero score.
pub fn similarity(a: &[GeoPoint], b: &[GeoPoint]) -> Result<Similarity, SimilarityError> {
    if a.is_empty() || b.is_empty() {
        return Err(SimilarityError::EmptyRoute);
    }
    let common = longest_common_subsequence(a, b);
    let score = common.len() as f64 / a.len().min(b.len()) as f64;
    Ok(Similarity { score, common })
}

/// Score every candidate against the user's path, keeping those strictly
/// above `threshold`. Output preserves candidate iteration order; ranking,
/// if any, is the caller's concern. The threshold has no default here.
pub fn compare_candidates(
    user_path: &[GeoPoint],
    candidates: Vec<Route>,
    threshold: f64,
) -> Result<Vec<MatchResult>, SimilarityError> {
    let mut matches = Vec::new();
    for candidate in candidates {
        let Similarity { score, common } = similarity(user_path, &candidate.path)?;
        if score > threshold {
            matches.push(MatchResult {
                route: candidate,
                similarity: score,
                lcs: common,
            });
        }
    }
    Ok(matches)
}
