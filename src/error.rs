use thiserror::Error;

pub type AbResult<T> = Result<T, AbError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("index {index} out of range (bound {bound})")]
    IndexOutOfRange { index: usize, bound: usize },
    #[error("dimension mismatch in {op}: {left:?} vs {right:?}")]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },
}

impl AbError {
    pub(crate) fn out_of_range(index: usize, bound: usize) -> Self {
        AbError::IndexOutOfRange { index, bound }
    }
}

impl From<&str> for AbError {
    fn from(e: &str) -> Self {
        AbError::InvalidArgument(e.to_string())
    }
}

impl From<String> for AbError {
    fn from(e: String) -> Self {
        AbError::InvalidArgument(e)
    }
}

impl From<AbError> for String {
    fn from(e: AbError) -> Self {
        format!("{}", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = AbError::out_of_range(4, 4);
        assert_eq!(e.to_string(), "index 4 out of range (bound 4)");
        let e: AbError = "zero rows".into();
        assert_eq!(String::from(e), "invalid argument: zero rows");
    }
}
