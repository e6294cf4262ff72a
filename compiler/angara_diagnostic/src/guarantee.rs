//! Proof that an error diagnostic was emitted.

/// Zero-sized token that can only be created by reporting an error.
///
/// Functions that fail after reporting return `Result<T, ErrorGuaranteed>`
/// so callers never mistake a silent failure for success.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    /// Only the queue mints these.
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }
}

#[cfg(test)]
mod tests;
