use thiserror::Error;

/// Invalid numeric input to the similarity routines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// `index` is the offending candidate, or `None` for a plain pair.
    #[error("dimension mismatch: expected {expected}, got {got}{}", candidate_suffix(.index))]
    DimensionMismatch {
        expected: usize,
        got: usize,
        index: Option<usize>,
    },

    /// `index` is `None` for the query vector.
    #[error("zero-magnitude vector{}", candidate_suffix(.index))]
    ZeroMagnitude { index: Option<usize> },

    #[error("empty vector")]
    EmptyVector,

    #[error("candidate count mismatch: {candidates} candidates, {vectors} vectors")]
    CountMismatch { candidates: usize, vectors: usize },
}

fn candidate_suffix(index: &Option<usize>) -> String {
    index.map(|i| format!(" (candidate {i})")).unwrap_or_default()
}

/// Euclidean norm, accumulated in f64.
pub fn norm(v: &[f32]) -> f64 {
    v.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt()
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (*x as f64) * (*y as f64)).sum()
}

/// Cosine similarity of `a` and `b`, in `[-1, 1]`.
///
/// Both vectors must be non-empty, of equal length and non-zero; anything
/// else is an error and never a NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, DomainError> {
    if a.is_empty() {
        return Err(DomainError::EmptyVector);
    }
    if a.len() != b.len() {
        return Err(DomainError::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
            index: None,
        });
    }
    let na = norm(a);
    if na == 0.0 {
        return Err(DomainError::ZeroMagnitude { index: None });
    }
    let nb = norm(b);
    if nb == 0.0 {
        return Err(DomainError::ZeroMagnitude { index: Some(0) });
    }
    Ok((dot(a, b) / (na * nb)) as f32)
}

/// Cosine similarity against a query whose norm has already been computed
/// and checked to be non-zero.
pub(crate) fn cosine_with_query_norm(
    query: &[f32],
    query_norm: f64,
    candidate: &[f32],
    index: usize,
) -> Result<f32, DomainError> {
    let nc = norm(candidate);
    if nc == 0.0 {
        return Err(DomainError::ZeroMagnitude { index: Some(index) });
    }
    Ok((dot(query, candidate) / (query_norm * nc)) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_orders_similarities() {
        let q = vec![1.0, 0.0, 0.0];
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.5, 0.5, 0.0];
        let c = vec![0.0, 1.0, 0.0];
        let s_a = cosine_similarity(&q, &a).unwrap();
        let s_b = cosine_similarity(&q, &b).unwrap();
        let s_c = cosine_similarity(&q, &c).unwrap();
        assert!(s_a > s_b && s_b > s_c);
    }

    #[test]
    fn cosine_is_scale_invariant() {
        let s = cosine_similarity(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!((s - 1.0).abs() < 1e-6);
        let s = cosine_similarity(&[1.0, 0.0], &[-3.0, 0.0]).unwrap();
        assert!((s + 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_is_an_error() {
        assert_eq!(
            cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]),
            Err(DomainError::ZeroMagnitude { index: Some(0) })
        );
        assert_eq!(
            cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]),
            Err(DomainError::ZeroMagnitude { index: None })
        );
    }

    #[test]
    fn mismatched_dimensions_are_an_error() {
        let err = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            DomainError::DimensionMismatch { expected: 2, got: 3, index: None }
        );
        assert_eq!(err.to_string(), "dimension mismatch: expected 2, got 3");
    }
}
