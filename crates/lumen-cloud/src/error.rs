//! Point cloud error types.

/// Errors raised by checked point cloud access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CloudError {
    /// A checked index was not below the cloud length.
    #[error("point index {index} out of range for cloud of {len} points")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The cloud length at the time of the request.
        len: usize,
    },
}
