use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("flow network has no nodes to match against")]
    EmptyFlowNetwork,
}

pub type MatchResult<T> = Result<T, MatchError>;
