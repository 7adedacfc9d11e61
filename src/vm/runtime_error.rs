use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Stack underflow")]
    StackUnderflow,
    #[error("Call arity mismatch")]
    ArityMismatch,
    #[error("Unknown opcode {0}")]
    UnknownOpcode(i32),
    #[error("Instruction pointer out of range")]
    IpOutOfRange,
    #[error("Jump target out of range")]
    JumpOutOfRange,
    #[error("Call target out of range")]
    CallOutOfRange,
    #[error("Local index out of range")]
    LocalOutOfRange,
    #[error("String index out of range")]
    StringOutOfRange,
    #[error("Invalid entry function")]
    InvalidEntry,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
