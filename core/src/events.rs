use std::fmt;

/// Terminal result of converting one work item, produced exactly once.
#[derive(Debug, Clone)]
pub enum Outcome {
    Converted {
        /// Source file name
        name: String,
        /// File name written into the destination directory
        output_name: String,
        /// Source size on disk, bytes
        initial_size: u64,
        /// Converted size on disk, bytes
        compressed_size: u64,
    },
    Failed {
        /// Source file name
        name: String,
        /// Human-readable failure description
        reason: String,
    },
}

impl Outcome {
    pub fn name(&self) -> &str {
        match self {
            Outcome::Converted { name, .. } | Outcome::Failed { name, .. } => name,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

/// Wire text for one outcome, as delivered to progress subscribers.
impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Converted {
                name,
                initial_size,
                compressed_size,
                ..
            } => write!(
                f,
                "Image: {name}, Initial Size: {initial_size} bytes, Compressed Size: {compressed_size} bytes"
            ),
            Outcome::Failed { name, reason } => {
                write!(f, "Error processing image {name}: {reason}")
            }
        }
    }
}

/// Event stream produced by one batch run.
///
/// `Fatal` and `Done` are terminal: nothing follows either of them.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// Enumeration finished; `total` items will be processed.
    Started { total: usize },
    /// One work item finished, in completion order.
    Item(Outcome),
    /// Enumeration failed; the batch produced no item events.
    Fatal(String),
    /// All items processed.
    Done,
}
