//! Index-list conversions to a plain triangle list.

/// Fan-triangulates polygon faces given their arities: face `(v0..vn)` becomes
/// `(v0, vi, vi+1)` for `i in 1..n-1`. Faces with fewer than three corners are dropped.
pub fn fan_triangulate(indices: &[u32], face_arities: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(indices.len() * 3 / 2);
    let mut start = 0usize;
    for &arity in face_arities {
        let n = arity as usize;
        let end = (start + n).min(indices.len());
        let face = &indices[start..end];
        if face.len() >= 3 {
            for i in 1..face.len() - 1 {
                out.extend_from_slice(&[face[0], face[i], face[i + 1]]);
            }
        }
        start = end;
    }
    out
}

/// Triangle strip to triangle list, flipping every odd triangle to keep a consistent winding.
pub fn strip_to_list(indices: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(indices.len().saturating_sub(2) * 3);
    for i in 0..indices.len().saturating_sub(2) {
        if i % 2 == 0 {
            out.extend_from_slice(&[indices[i], indices[i + 1], indices[i + 2]]);
        } else {
            out.extend_from_slice(&[indices[i + 1], indices[i], indices[i + 2]]);
        }
    }
    out
}

/// Triangle fan to triangle list.
pub fn fan_to_list(indices: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(indices.len().saturating_sub(2) * 3);
    for i in 1..indices.len().saturating_sub(1) {
        out.extend_from_slice(&[indices[0], indices[i], indices[i + 1]]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_becomes_two_triangles() {
        assert_eq!(fan_triangulate(&[0, 1, 2, 3], &[4]), vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(fan_triangulate(&[0, 1, 2, 3, 4, 5, 6, 7], &[4, 4]).len(), 12);
    }

    #[test]
    fn mixed_arities() {
        // triangle, quad, pentagon, degenerate edge
        let indices = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13];
        let tris = fan_triangulate(&indices, &[3, 4, 5, 2]);
        assert_eq!(tris.len(), (1 + 2 + 3) * 3);
        assert_eq!(&tris[0..3], &[0, 1, 2]);
        assert_eq!(&tris[3..9], &[3, 4, 5, 3, 5, 6]);
        assert_eq!(&tris[9..12], &[7, 8, 9]);
    }

    #[test]
    fn strip_alternates_winding() {
        assert_eq!(strip_to_list(&[0, 1, 2, 3]), vec![0, 1, 2, 2, 1, 3]);
        assert!(strip_to_list(&[0, 1]).is_empty());
    }

    #[test]
    fn fan_shares_first_vertex() {
        assert_eq!(fan_to_list(&[0, 1, 2, 3]), vec![0, 1, 2, 0, 2, 3]);
        assert!(fan_to_list(&[]).is_empty());
    }
}
