use thiserror::Error;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    BaseCrate(#[from] heartrisk::Error),
    #[error(transparent)]
    LinalgError(#[from] linfa_linalg::LinalgError),
    #[error(transparent)]
    ArgMinError(#[from] argmin::core::Error),
    #[error("the solver finished without a parameter vector")]
    MissingSolution,
    #[error("Expected exactly two classes for logistic regression")]
    WrongNumberOfClasses,
    #[error("Expected `x` and `y` to have same number of rows, got {0} != {1}")]
    MismatchedShapes(usize, usize),
    #[error("Values must be finite and not `Inf`, `-Inf` or `NaN`")]
    InvalidValues,
    #[error("alpha must be a non-negative, finite number")]
    InvalidAlpha,
    #[error("gradient_tolerance must be a positive, finite number")]
    InvalidGradientTolerance,
    #[error("tolerance must be a positive, finite number")]
    InvalidTolerance,
    #[error("max_iterations must be at least one")]
    InvalidMaxIterations,
    #[error("Size of initial parameter guess must be the same as the number of columns in the feature matrix `x`")]
    InvalidInitialParametersGuessSize,
    #[error("Initial parameter guess must be finite")]
    InvalidInitialParametersGuess,
    #[error("significance threshold must lie in (0, 1), got {0}")]
    InvalidThreshold(f64),
    #[error("the feature matrix has no columns")]
    NoFeatures,
    #[error("the Hessian of the log-likelihood is not positive definite, the design matrix may be collinear or perfectly separate the classes")]
    SingularHessian,
    #[error("every column was eliminated before all p-values fell below {0}")]
    EliminationExhausted(f64),
}
