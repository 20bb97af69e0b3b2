use thiserror::Error;

/// Errors reported by [`crate::machine::Machine`] when an instruction (or a
/// program load) would corrupt machine state.
///
/// Each error is fatal to the failing call only; the machine itself stays
/// usable and the host decides whether to halt, reset, or report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("program of {size} bytes exceeds the {max} bytes of program memory")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("memory access out of bounds at address {address:#06X}")]
    OutOfBounds { address: u16 },

    #[error("subroutine call overflowed the 16-entry stack")]
    StackOverflow,

    #[error("subroutine return with an empty stack")]
    StackUnderflow,
}
