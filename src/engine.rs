//! Delta-debugging search over a function body.
//!
//! Chunk-based ddmin with growing granularity: start by deleting halves,
//! refine toward single statements only when coarse deletion stops paying.
//! The engine manipulates statement indices into the original body and
//! drives the oracle through an opaque verify closure; it never sees
//! statement text and is agnostic of the task kind baked into `verify`.
//!
//! First improvement wins, leftmost chunk first, and an accepted deletion
//! restarts the sweep at the same granularity over the shorter body. The
//! result is 1-minimal (or better) with respect to contiguous-chunk
//! deletions, not a guaranteed global minimum.

use serde::Serialize;

use crate::error::MinimizeError;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SearchStats {
    pub sweeps: usize,
    pub candidates_tried: usize,
    pub deletions_accepted: usize,
}

/// Minimize a body of `len` statements. `verify(candidate)` must report
/// whether the candidate (indices into the original body, in order) still
/// reproduces the pollution signature; a verify error is fatal and aborts
/// the search. `min_size` is the floor below which no further deletions are
/// proposed (the accepted body may end up smaller when a final deletion
/// lands on a body of exactly `min_size` statements).
pub fn minimize<F>(
    len: usize,
    min_size: usize,
    mut verify: F,
) -> Result<(Vec<usize>, SearchStats), MinimizeError>
where
    F: FnMut(&[usize]) -> Result<bool, MinimizeError>,
{
    let mut body: Vec<usize> = (0..len).collect();
    let mut n: usize = 2;
    let mut stats = SearchStats::default();

    while body.len() >= min_size.max(1) {
        let chunk = std::cmp::max(1, body.len() / n);
        stats.sweeps += 1;

        let mut accepted = false;
        let mut i = 0;
        while i < body.len() {
            let mut candidate = body.clone();
            candidate.drain(i..(i + chunk).min(body.len()));

            stats.candidates_tried += 1;
            if verify(&candidate)? {
                body = candidate;
                stats.deletions_accepted += 1;
                accepted = true;
                break;
            }
            i += chunk;
        }

        if !accepted {
            if n >= body.len() {
                // chunk size 1 and nothing removable: done
                break;
            }
            n = (n * 2).min(body.len());
        }
    }

    Ok((body, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has(c: &[usize], i: usize) -> bool {
        c.contains(&i)
    }

    #[test]
    fn converges_to_jointly_necessary_pair() {
        // statements 0 and 2 together reproduce the pollution; the engine
        // must land exactly on [0, 2]
        let (body, stats) =
            minimize(4, 2, |c| Ok(has(c, 0) && has(c, 2))).unwrap();
        assert_eq!(body, vec![0, 2]);
        assert!(stats.deletions_accepted >= 2);
    }

    #[test]
    fn rejects_candidates_that_break_the_solo_run() {
        // joint outcome needs statement 0, the polluter's own pass needs
        // statement 1; a candidate holding only 0 must be rejected even
        // though the joint check would still hold
        let mut tried: Vec<Vec<usize>> = Vec::new();
        let (body, _) = minimize(4, 2, |c| {
            tried.push(c.to_vec());
            let solo_ok = has(c, 1);
            let joint_ok = has(c, 0);
            Ok(solo_ok && joint_ok)
        })
        .unwrap();

        assert_eq!(body, vec![0, 1]);
        assert!(tried.iter().any(|c| c == &vec![0]));
    }

    #[test]
    fn irreducible_body_is_returned_unchanged() {
        let (body, stats) = minimize(4, 2, |_| Ok(false)).unwrap();
        assert_eq!(body, vec![0, 1, 2, 3]);
        // halves sweep (2 candidates) then singles sweep (4 candidates)
        assert_eq!(stats.candidates_tried, 6);
        assert_eq!(stats.deletions_accepted, 0);
    }

    #[test]
    fn verify_error_aborts_the_search() {
        let mut calls = 0;
        let err = minimize(6, 2, |_| {
            calls += 1;
            if calls == 3 {
                return Err(MinimizeError::Oracle("pytest died".into()));
            }
            Ok(false)
        })
        .unwrap_err();

        assert!(matches!(err, MinimizeError::Oracle(_)));
        assert_eq!(calls, 3);
    }

    #[test]
    fn shrink_is_monotonic_and_order_preserving() {
        let (body, _) = minimize(9, 2, |c| Ok(has(c, 3) && has(c, 7))).unwrap();
        assert_eq!(body, vec![3, 7]);
        assert!(body.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn min_size_floor_stops_further_proposals() {
        // an always-true oracle deletes greedily until the floor gates
        // the next sweep
        let (body, _) = minimize(5, 3, |_| Ok(true)).unwrap();
        assert!(body.len() < 3);

        let (body, _) = minimize(5, 5, |_| Ok(true)).unwrap();
        assert!(body.len() >= 3);
    }

    #[test]
    fn single_statement_body_is_left_alone() {
        let mut calls = 0;
        let (body, _) = minimize(1, 2, |_| {
            calls += 1;
            Ok(true)
        })
        .unwrap();
        assert_eq!(body, vec![0]);
        assert_eq!(calls, 0);
    }
}
