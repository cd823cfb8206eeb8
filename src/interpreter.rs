use std::fmt::{self, Display};

use log::{debug, trace};

use crate::error::{Error, ErrorType, Result};
use crate::instruction::{Flag, Instruction, Operand, Program, RegisterOp};
use crate::registers::Registers;
use crate::template::interpolate;

pub const DEFAULT_STEP_LIMIT: usize = 10_000_000;

/// Result of a program that finished without emitting a message.
pub const NO_OUTPUT: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Text(String),
    /// The program ran past its last instruction without reaching `end`.
    OutOfBounds,
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{}", value),
            Value::Text(text) => write!(f, "{}", text),
            Value::OutOfBounds => write!(f, "{}", NO_OUTPUT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    pub instruction_pointer: usize,
    pub next_instruction_pointer: usize,
    pub flag: Flag,
    pub registers: Registers,
    pub call_stack: Vec<usize>,
    pub result: Value,
    pub output: Vec<String>,
    pub steps: usize,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            instruction_pointer: 0,
            next_instruction_pointer: 1,
            flag: Flag::Unset,
            registers: Registers::new(),
            call_stack: vec![],
            result: Value::Integer(NO_OUTPUT),
            output: vec![],
            steps: 0,
        }
    }

    pub fn read(&self, operand: &Operand) -> Result<i64> {
        match operand {
            Operand::Literal(value) => Ok(*value),
            Operand::Register(name) => self.registers.find(name),
        }
    }

    fn into_outcome(self) -> Outcome {
        Outcome {
            value: self.result,
            registers: self.registers,
            output: self.output,
            steps: self.steps,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub value: Value,
    pub registers: Registers,
    /// Every message emitted during the run; `value` holds the last one.
    pub output: Vec<String>,
    pub steps: usize,
}

fn floor_div(dividend: i64, divisor: i64) -> Option<i64> {
    let quotient = dividend.checked_div(divisor)?;
    if dividend % divisor != 0 && (dividend < 0) != (divisor < 0) {
        quotient.checked_sub(1)
    } else {
        Some(quotient)
    }
}

fn checked(target: &str, op: &RegisterOp, value: Option<i64>) -> Result<i64> {
    value.ok_or_else(|| {
        Error::new(
            ErrorType::Overflow,
            format!("'{}' overflowed register '{}'", op.name(), target),
        )
    })
}

pub struct Interpreter<'a> {
    program: &'a Program,
    step_limit: Option<usize>,
}

impl<'a> Interpreter<'a> {
    pub fn new(program: &'a Program) -> Self {
        Self {
            program,
            step_limit: Some(DEFAULT_STEP_LIMIT),
        }
    }

    /// Caps the number of dispatched instructions; `None` runs unbounded.
    pub fn with_step_limit(mut self, step_limit: Option<usize>) -> Self {
        self.step_limit = step_limit;
        self
    }

    pub fn run(&self) -> Result<Outcome> {
        let mut context = ExecutionContext::new();

        loop {
            let instruction = match self.program.get(context.instruction_pointer) {
                Some(instruction) => instruction,
                None => {
                    debug!(
                        "Instruction pointer {} is out of bounds",
                        context.instruction_pointer
                    );
                    context.result = Value::OutOfBounds;
                    break;
                }
            };

            if *instruction == Instruction::End {
                break;
            }

            if let Some(limit) = self.step_limit {
                if context.steps >= limit {
                    return Err(Error::new(
                        ErrorType::StepLimitExceeded,
                        format!("Program did not reach 'end' within {} steps", limit),
                    )
                    .or_range(self.program.get_range(context.instruction_pointer)));
                }
            }

            trace!(
                "{:>4}: {:<24} flag={:?}",
                context.instruction_pointer,
                instruction.to_string(),
                context.flag
            );

            context.steps += 1;
            context.next_instruction_pointer = context.instruction_pointer + 1;
            self.execute_instruction(&mut context, instruction)
                .map_err(|e| e.or_range(self.program.get_range(context.instruction_pointer)))?;
            context.instruction_pointer = context.next_instruction_pointer;
        }

        debug!(
            "Finished after {} steps with {:?}",
            context.steps, context.result
        );

        Ok(context.into_outcome())
    }

    /// Executes a single instruction against `context`. The caller is
    /// expected to have set `next_instruction_pointer` to the following
    /// instruction; jumps, calls and returns overwrite it.
    pub fn execute_instruction(
        &self,
        context: &mut ExecutionContext,
        instruction: &Instruction,
    ) -> Result<()> {
        use Instruction::*;

        match instruction {
            Comment | Label { .. } | End => {}
            Instruction::RegisterOp { op, target } => {
                execute_register_operation(context, op, target)?
            }
            Compare { left, right } => {
                let left = context.read(left)?;
                let right = context.read(right)?;
                context.flag = Flag::from(left.cmp(&right));
            }
            Jump { kind, target } => {
                if kind.is_taken(context.flag) {
                    let label = self.program.find_label(target)?;
                    debug!("{} taken to '{}'", kind.name(), target);
                    context.next_instruction_pointer = label + 1;
                }
            }
            Call { target } => {
                let label = self.program.find_label(target)?;
                context.call_stack.push(context.instruction_pointer + 1);
                debug!("call '{}', depth {}", target, context.call_stack.len());
                context.next_instruction_pointer = label + 1;
            }
            Return => {
                let address = context.call_stack.pop().ok_or_else(|| {
                    Error::new(
                        ErrorType::EmptyCallStack,
                        "'ret' without a caller to return to".to_string(),
                    )
                })?;
                debug!("ret to {}", address);
                context.next_instruction_pointer = address;
            }
            Message { template } => {
                let text = interpolate(template, &context.registers)?;
                debug!("msg {:?}", text);
                context.output.push(text.clone());
                context.result = Value::Text(text);
            }
        }

        Ok(())
    }
}

fn execute_register_operation(
    context: &mut ExecutionContext,
    op: &RegisterOp,
    target: &str,
) -> Result<()> {
    let value = match op {
        RegisterOp::Mov(source) => context.read(source)?,
        RegisterOp::Inc => checked(target, op, context.registers.find(target)?.checked_add(1))?,
        RegisterOp::Dec => checked(target, op, context.registers.find(target)?.checked_sub(1))?,
        RegisterOp::Add(source) => {
            let value = context.read(source)?;
            checked(target, op, context.registers.find(target)?.checked_add(value))?
        }
        RegisterOp::Sub(source) => {
            let value = context.read(source)?;
            checked(target, op, context.registers.find(target)?.checked_sub(value))?
        }
        RegisterOp::Mul(source) => {
            let value = context.read(source)?;
            checked(target, op, context.registers.find(target)?.checked_mul(value))?
        }
        RegisterOp::Div(source) => {
            let divisor = context.read(source)?;
            if divisor == 0 {
                return Err(Error::new(
                    ErrorType::DivisionByZero,
                    format!("Division of register '{}' by zero", target),
                ));
            }
            checked(target, op, floor_div(context.registers.find(target)?, divisor))?
        }
    };

    context.registers.insert(target, value);
    Ok(())
}

pub fn run(program: &Program) -> Result<Outcome> {
    Interpreter::new(program).run()
}
