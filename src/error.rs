use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to start worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid pool configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("cube of {x} + {y} does not fit in a 64-bit integer")]
    Overflow { x: i64, y: i64 },
}
