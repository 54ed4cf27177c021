//! # Errors
//! Only constructors can fail, and only because of a bad argument.
//! Everything else either returns after blocking or blocks forever.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// a negative semaphore value or a barrier for no threads at all
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<Y> = std::result::Result<Y, Error>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_message() {
        let e = Error::InvalidArgument("cannot create a barrier for 0 threads".to_string());
        assert_eq!(
            "invalid argument: cannot create a barrier for 0 threads",
            e.to_string()
        );
    }
}
