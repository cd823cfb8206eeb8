use std::collections::HashMap;
use std::fmt::{self, Display};

use crate::error::{Error, ErrorType, Result};
use crate::lexer::SourceRange;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Literal(i64),
    Register(String),
}

impl Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(value) => write!(f, "{}", value),
            Operand::Register(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOp {
    Mov(Operand),
    Inc,
    Dec,
    Add(Operand),
    Sub(Operand),
    Mul(Operand),
    Div(Operand),
}

impl RegisterOp {
    pub fn name(&self) -> &'static str {
        match self {
            RegisterOp::Mov(_) => "mov",
            RegisterOp::Inc => "inc",
            RegisterOp::Dec => "dec",
            RegisterOp::Add(_) => "add",
            RegisterOp::Sub(_) => "sub",
            RegisterOp::Mul(_) => "mul",
            RegisterOp::Div(_) => "div",
        }
    }

    pub fn operand(&self) -> Option<&Operand> {
        match self {
            RegisterOp::Inc | RegisterOp::Dec => None,
            RegisterOp::Mov(operand)
            | RegisterOp::Add(operand)
            | RegisterOp::Sub(operand)
            | RegisterOp::Mul(operand)
            | RegisterOp::Div(operand) => Some(operand),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JumpKind {
    Jmp,
    Je,
    Jne,
    Jge,
    Jg,
    Jle,
    Jl,
}

impl JumpKind {
    pub fn name(&self) -> &'static str {
        match self {
            JumpKind::Jmp => "jmp",
            JumpKind::Je => "je",
            JumpKind::Jne => "jne",
            JumpKind::Jge => "jge",
            JumpKind::Jg => "jg",
            JumpKind::Jle => "jle",
            JumpKind::Jl => "jl",
        }
    }

    /// Whether a jump of this kind is taken for the given comparison flag.
    /// An unset flag never satisfies a conditional jump.
    pub fn is_taken(&self, flag: Flag) -> bool {
        use Flag::*;

        match self {
            JumpKind::Jmp => true,
            JumpKind::Je => flag == Equal,
            JumpKind::Jne => matches!(flag, Greater | Less),
            JumpKind::Jge => matches!(flag, Equal | Greater),
            JumpKind::Jg => flag == Greater,
            JumpKind::Jle => matches!(flag, Equal | Less),
            JumpKind::Jl => flag == Less,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flag {
    #[default]
    Unset,
    Equal,
    Greater,
    Less,
}

impl From<std::cmp::Ordering> for Flag {
    fn from(ordering: std::cmp::Ordering) -> Self {
        match ordering {
            std::cmp::Ordering::Equal => Flag::Equal,
            std::cmp::Ordering::Greater => Flag::Greater,
            std::cmp::Ordering::Less => Flag::Less,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Comment,
    Label { name: String },
    RegisterOp { op: RegisterOp, target: String },
    Compare { left: Operand, right: Operand },
    Jump { kind: JumpKind, target: String },
    Call { target: String },
    Return,
    End,
    Message { template: String },
}

impl Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match self {
            Comment => write!(f, ";"),
            Label { name } => write!(f, "{}:", name),
            Instruction::RegisterOp { op, target } => match op.operand() {
                Some(operand) => write!(f, "{} {}, {}", op.name(), target, operand),
                None => write!(f, "{} {}", op.name(), target),
            },
            Compare { left, right } => write!(f, "cmp {}, {}", left, right),
            Jump { kind, target } => write!(f, "{} {}", kind.name(), target),
            Call { target } => write!(f, "call {}", target),
            Return => write!(f, "ret"),
            End => write!(f, "end"),
            Message { template } => write!(f, "msg {}", template),
        }
    }
}

/// A parsed program: the instruction sequence, where the index of an
/// instruction is the line it was parsed from, plus the label table.
#[derive(Debug, Clone)]
pub struct Program {
    instructions: Vec<Instruction>,
    instruction_ranges: Vec<SourceRange>,
    labels: HashMap<String, usize>,
}

impl Program {
    /// `instruction_ranges` may be empty for programs that were not parsed
    /// from text; otherwise it holds one range per instruction.
    pub fn new(
        instructions: Vec<Instruction>,
        instruction_ranges: Vec<SourceRange>,
    ) -> Result<Self> {
        assert!(instruction_ranges.is_empty() || instruction_ranges.len() == instructions.len());

        let mut labels = HashMap::new();
        for (index, instruction) in instructions.iter().enumerate() {
            if let Instruction::Label { name } = instruction {
                if labels.insert(name.clone(), index).is_some() {
                    let message = format!("Label '{}' already defined", name);
                    return Err(match instruction_ranges.get(index) {
                        Some(range) => Error::new_with_range(ErrorType::Parse, message, *range),
                        None => Error::new(ErrorType::Parse, message),
                    });
                }
            }
        }

        Ok(Self {
            instructions,
            instruction_ranges,
            labels,
        })
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    pub fn get_range(&self, index: usize) -> Option<SourceRange> {
        self.instruction_ranges.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn find_label(&self, name: &str) -> Result<usize> {
        self.labels.get(name).copied().ok_or_else(|| {
            Error::new(ErrorType::UnknownLabel, format!("Unknown label '{}'", name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_truth_table() {
        use Flag::*;
        use JumpKind::*;

        let table = [
            (Je, [false, true, false, false]),
            (Jne, [false, false, true, true]),
            (Jge, [false, true, true, false]),
            (Jg, [false, false, true, false]),
            (Jle, [false, true, false, true]),
            (Jl, [false, false, false, true]),
            (Jmp, [true, true, true, true]),
        ];

        for (kind, expected) in table {
            for (flag, taken) in [Unset, Equal, Greater, Less].into_iter().zip(expected) {
                assert_eq!(kind.is_taken(flag), taken, "{} with {:?}", kind.name(), flag);
            }
        }
    }

    #[test]
    fn program_duplicate_label() {
        let program = Program::new(
            vec![
                Instruction::Label { name: "f".to_string() },
                Instruction::Return,
                Instruction::Label { name: "f".to_string() },
            ],
            vec![],
        );

        let error = program.unwrap_err();
        assert_eq!(error.error_type, ErrorType::Parse);
        assert_eq!(error.message, "Label 'f' already defined");
    }

    #[test]
    fn program_find_label() -> Result<()> {
        let program = Program::new(
            vec![
                Instruction::Comment,
                Instruction::Label { name: "loop".to_string() },
                Instruction::End,
            ],
            vec![],
        )?;

        assert_eq!(program.find_label("loop")?, 1);
        assert_eq!(
            program.find_label("missing").unwrap_err().error_type,
            ErrorType::UnknownLabel
        );
        Ok(())
    }

    #[test]
    fn instruction_display() {
        let instruction = Instruction::RegisterOp {
            op: RegisterOp::Add(Operand::Literal(-3)),
            target: "a".to_string(),
        };
        assert_eq!(instruction.to_string(), "add a, -3");

        let instruction = Instruction::Jump {
            kind: JumpKind::Jle,
            target: "done".to_string(),
        };
        assert_eq!(instruction.to_string(), "jle done");
    }
}
