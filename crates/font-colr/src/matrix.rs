//! Affine transform classification.

use kurbo::Affine;

use crate::variable::VariableMatrix;

/// How much of an affine transform is in use, from simplest to most general.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatrixType {
    /// Identity
    None,
    /// Translation only
    Translation,
    /// Equal scale on both axes, no translation
    ScaleUniform,
    /// Different scales on each axis, no translation
    ScaleNonUniform,
    /// Anything else
    Transform,
}

/// Classify a transform.
pub fn matrix_type(matrix: &Affine) -> MatrixType {
    let [a, b, c, d, e, f] = matrix.as_coeffs();
    let linear_identity = a == 1.0 && b == 0.0 && c == 0.0 && d == 1.0;
    if linear_identity && e == 0.0 && f == 0.0 {
        MatrixType::None
    } else if linear_identity {
        MatrixType::Translation
    } else if b == 0.0 && c == 0.0 && e == 0.0 && f == 0.0 {
        if a == d {
            MatrixType::ScaleUniform
        } else {
            MatrixType::ScaleNonUniform
        }
    } else {
        MatrixType::Transform
    }
}

/// The simplest type able to express every one of `types`.
///
/// Identity combines with anything, uniform and non-uniform scales combine
/// into a non-uniform scale, and any other mix needs a full transform.
pub fn merge_matrix_types(types: impl IntoIterator<Item = MatrixType>) -> MatrixType {
    types.into_iter().fold(MatrixType::None, |acc, this| match (acc, this) {
        (MatrixType::None, other) | (other, MatrixType::None) => other,
        (a, b) if a == b => a,
        (MatrixType::ScaleUniform, MatrixType::ScaleNonUniform)
        | (MatrixType::ScaleNonUniform, MatrixType::ScaleUniform) => MatrixType::ScaleNonUniform,
        _ => MatrixType::Transform,
    })
}

/// Short label for a transform: empty for identity, ` dx, dy` for a
/// translation, the six coefficients otherwise.
pub fn matrix_label(matrix: &Affine) -> String {
    let [a, b, c, d, e, f] = matrix.as_coeffs();
    match matrix_type(matrix) {
        MatrixType::None => String::new(),
        MatrixType::Translation => format!(" {}, {}", round(e), round(f)),
        _ => format!(
            " ({},{},{},{},{},{})",
            max_2dp(a),
            max_2dp(b),
            max_2dp(c),
            max_2dp(d),
            round(e),
            round(f)
        ),
    }
}

fn round(value: f64) -> f64 {
    value.round() + 0.0
}

fn max_2dp(value: f64) -> String {
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_string() } else { text.to_string() }
}

impl VariableMatrix {
    /// Most general type across every master.
    pub fn most_complex_type(&self) -> MatrixType {
        merge_matrix_types(self.master_values().map(matrix_type))
    }

    /// Whether coefficient `idx` (`a` through `f`) differs between masters.
    pub fn component_varies(&self, idx: usize) -> bool {
        let mut values = self.master_values().map(|m| m.as_coeffs()[idx]);
        match values.next() {
            Some(first) => values.any(|v| v != first),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use font_types::Tag;
    use painter_font_varmodel::NormalizedLocation;

    #[test]
    fn classify() {
        assert_eq!(matrix_type(&Affine::IDENTITY), MatrixType::None);
        assert_eq!(matrix_type(&Affine::translate((10.0, 0.0))), MatrixType::Translation);
        assert_eq!(matrix_type(&Affine::scale(2.0)), MatrixType::ScaleUniform);
        assert_eq!(matrix_type(&Affine::scale_non_uniform(2.0, 3.0)), MatrixType::ScaleNonUniform);
        assert_eq!(
            matrix_type(&Affine::new([2.0, 0.0, 0.0, 2.0, 5.0, 0.0])),
            MatrixType::Transform
        );
        assert_eq!(matrix_type(&Affine::rotate(0.5)), MatrixType::Transform);
    }

    #[test]
    fn merge() {
        use MatrixType::*;

        assert_eq!(merge_matrix_types([]), None);
        assert_eq!(merge_matrix_types([None, Translation]), Translation);
        assert_eq!(merge_matrix_types([Translation, None]), Translation);
        assert_eq!(merge_matrix_types([Translation, Translation]), Translation);
        assert_eq!(merge_matrix_types([ScaleUniform, ScaleNonUniform]), ScaleNonUniform);
        assert_eq!(merge_matrix_types([Translation, ScaleUniform]), Transform);
    }

    #[test]
    fn labels() {
        assert_eq!(matrix_label(&Affine::IDENTITY), "");
        assert_eq!(matrix_label(&Affine::translate((10.4, -3.6))), " 10, -4");
        assert_eq!(
            matrix_label(&Affine::new([1.5, 0.0, 0.333, 2.0, 0.0, 7.0])),
            " (1.5,0,0.33,2,0,7)"
        );
    }

    #[test]
    fn most_complex_across_masters() {
        let wght = Tag::new(b"wght");
        let matrix = VariableMatrix::with_default(vec![wght], Affine::IDENTITY)
            .with_value(&NormalizedLocation::new().with(wght, 1.0), Affine::translate((0.0, 20.0)));

        assert_eq!(matrix.most_complex_type(), MatrixType::Translation);
        assert!(!matrix.component_varies(4));
        assert!(matrix.component_varies(5));
    }
}
