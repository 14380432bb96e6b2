#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Sankey is a DAG, the original data has cycle!")]
    /// Some edges were never consumed by the topological sort.
    Cycle { remaining_edges: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
