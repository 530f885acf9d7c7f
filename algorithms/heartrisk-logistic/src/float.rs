use argmin::core::ArgminFloat;

/// A Float trait that captures the requirements we need for the various
/// places we use floats: the toolkit float, what the `argmin` solvers
/// expect and the two labels of the binary encoding used by the loss.
pub trait Float: heartrisk::Float + ArgminFloat {
    const POSITIVE_LABEL: Self;
    const NEGATIVE_LABEL: Self;
}

impl Float for f32 {
    const POSITIVE_LABEL: Self = 1.0;
    const NEGATIVE_LABEL: Self = -1.0;
}

impl Float for f64 {
    const POSITIVE_LABEL: Self = 1.0;
    const NEGATIVE_LABEL: Self = -1.0;
}
