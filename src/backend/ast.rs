use std::fmt::{Display, Formatter};

/// A memory cell of the target stack machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub u8);

impl Address {
    /// Where a compiled function leaves its result.
    pub const RETURN: Address = Address(0);
    /// Where the caller places the two `byte` arguments.
    pub const PARAMS: [Address; 2] = [Address(1), Address(2)];
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inst {
    /// Push an immediate, kept as its source text.
    PushI(String),
    /// Pop the top of the stack into memory.
    Pop(Address),
    Halt,
}

impl Display for Inst {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Inst::PushI(value) => write!(f, "pushi {}", value),
            Inst::Pop(address) => write!(f, "pop {}", address),
            Inst::Halt => write!(f, "halt"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub name: String,
    pub body: Vec<Inst>,
}

impl Program {
    pub fn new(name: String, body: Vec<Inst>) -> Self {
        Self { name, body }
    }
}
