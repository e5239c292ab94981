use crate::embedding::{DomainError, cosine_with_query_norm, norm};

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredIdx {
    pub idx: usize,
    pub score: f32,
}

/// A candidate paired with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub item: T,
    pub score: f32,
}

/// Return indices of the `top_k` most similar vectors (cosine similarity),
/// in descending score order. Equal scores keep their input order.
///
/// Every candidate's dimension is checked against the query before any
/// similarity is computed.
pub fn top_k_cosine(
    haystack: &[Vec<f32>],
    query: &[f32],
    top_k: usize,
) -> Result<Vec<ScoredIdx>, DomainError> {
    if haystack.is_empty() {
        return Ok(Vec::new());
    }
    if query.is_empty() {
        return Err(DomainError::EmptyVector);
    }
    if let Some((index, v)) = haystack.iter().enumerate().find(|(_, v)| v.len() != query.len()) {
        return Err(DomainError::DimensionMismatch {
            expected: query.len(),
            got: v.len(),
            index: Some(index),
        });
    }
    let query_norm = norm(query);
    if query_norm == 0.0 {
        return Err(DomainError::ZeroMagnitude { index: None });
    }

    let mut scored = haystack
        .iter()
        .enumerate()
        .map(|(idx, v)| -> Result<ScoredIdx, DomainError> {
            Ok(ScoredIdx { idx, score: cosine_with_query_norm(query, query_norm, v, idx)? })
        })
        .collect::<Result<Vec<_>, _>>()?;
    // `sort_by` is stable, so ties stay in input order.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_k);
    Ok(scored)
}

/// Rank `candidates` by the cosine similarity of their vectors to `query`.
///
/// `vectors[i]` is the embedding of `candidates[i]`. The result holds
/// `min(k, candidates.len())` entries.
pub fn rank<'a, T>(
    query: &[f32],
    vectors: &[Vec<f32>],
    candidates: &'a [T],
    k: usize,
) -> Result<Vec<Ranked<&'a T>>, DomainError> {
    if candidates.len() != vectors.len() {
        return Err(DomainError::CountMismatch {
            candidates: candidates.len(),
            vectors: vectors.len(),
        });
    }
    let top = top_k_cosine(vectors, query, k)?;
    Ok(top
        .into_iter()
        .map(|s| Ranked { item: &candidates[s.idx], score: s.score })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EPS: f32 = 1e-6;

    #[test]
    fn topk_basic() {
        let hay = vec![
            vec![1.0, 0.0],
            vec![0.7, 0.3],
            vec![0.0, 1.0],
        ];
        let q = vec![1.0, 0.0];
        let res = top_k_cosine(&hay, &q, 2).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].idx, 0);
        assert_eq!(res[1].idx, 1);
    }

    #[test]
    fn unit_axes_example() {
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, 0.0]];
        let names = ["east", "north", "west"];
        let res = rank(&[1.0, 0.0], &vectors, &names, 2).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(*res[0].item, "east");
        assert!((res[0].score - 1.0).abs() < EPS);
        assert_eq!(*res[1].item, "north");
        assert!(res[1].score.abs() < EPS);
    }

    #[test]
    fn identical_copy_scores_one_and_ranks_first() {
        let query = vec![0.3, -1.2, 4.5, 0.01];
        let vectors = vec![
            vec![0.3, -1.0, 4.0, 0.5],
            vec![-0.3, 1.2, -4.5, 0.0],
            query.clone(),
            vec![1.0, 1.0, 1.0, 1.0],
        ];
        let ids = [0, 1, 2, 3];
        let res = rank(&query, &vectors, &ids, 4).unwrap();
        assert_eq!(*res[0].item, 2);
        assert!((res[0].score - 1.0).abs() < EPS);
    }

    #[test]
    fn length_is_min_of_k_and_candidates() {
        let vectors = vec![vec![1.0, 2.0], vec![2.0, 1.0], vec![1.0, 1.0]];
        let ids = ["a", "b", "c"];
        for k in 0..6 {
            let res = rank(&[1.0, 0.5], &vectors, &ids, k).unwrap();
            assert_eq!(res.len(), k.min(ids.len()));
        }
    }

    #[test]
    fn scores_are_non_increasing() {
        let vectors: Vec<Vec<f32>> = (0..16)
            .map(|i| {
                let t = i as f32 * 0.4;
                vec![t.cos(), t.sin(), 0.25]
            })
            .collect();
        let ids: Vec<usize> = (0..vectors.len()).collect();
        let res = rank(&[0.2, 0.9, -0.1], &vectors, &ids, 16).unwrap();
        assert!(res.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn equal_scores_keep_input_order() {
        // Same direction, different magnitudes: identical cosine scores.
        let vectors = vec![vec![0.0, 1.0], vec![2.0, 0.0], vec![0.0, 3.0], vec![5.0, 0.0]];
        let ids = ["n1", "e1", "n2", "e2"];
        let res = rank(&[1.0, 0.0], &vectors, &ids, 4).unwrap();
        let order: Vec<&str> = res.iter().map(|r| *r.item).collect();
        assert_eq!(order, vec!["e1", "e2", "n1", "n2"]);
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let query = vec![0.1; 768];
        let vectors = vec![vec![0.1; 768], vec![0.1; 512]];
        let ids = [0, 1];
        let err = rank(&query, &vectors, &ids, 2).unwrap_err();
        assert_eq!(
            err,
            DomainError::DimensionMismatch { expected: 768, got: 512, index: Some(1) }
        );
    }

    #[test]
    fn mismatch_is_reported_before_zero_vector() {
        let vectors = vec![vec![0.0, 0.0], vec![1.0]];
        let ids = [0, 1];
        let err = rank(&[1.0, 0.0], &vectors, &ids, 2).unwrap_err();
        assert!(matches!(err, DomainError::DimensionMismatch { index: Some(1), .. }));
    }

    #[test]
    fn zero_candidate_is_rejected() {
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 0.0]];
        let ids = [0, 1];
        let err = rank(&[1.0, 0.0], &vectors, &ids, 2).unwrap_err();
        assert_eq!(err, DomainError::ZeroMagnitude { index: Some(1) });
    }

    #[test]
    fn zero_query_is_rejected() {
        let vectors = vec![vec![1.0, 0.0]];
        let err = rank(&[0.0, 0.0], &vectors, &["a"], 1).unwrap_err();
        assert_eq!(err, DomainError::ZeroMagnitude { index: None });
    }

    #[test]
    fn empty_candidates_yield_empty_result() {
        let vectors: Vec<Vec<f32>> = Vec::new();
        let ids: [u8; 0] = [];
        for k in [0, 1, 10] {
            assert!(rank(&[1.0, 0.0], &vectors, &ids, k).unwrap().is_empty());
        }
    }

    #[test]
    fn candidate_count_must_match_vectors() {
        let vectors = vec![vec![1.0, 0.0]];
        let err = rank(&[1.0, 0.0], &vectors, &["a", "b"], 1).unwrap_err();
        assert_eq!(err, DomainError::CountMismatch { candidates: 2, vectors: 1 });
    }
}
