use log::{debug, trace};

use crate::{
    error::{Error, ErrorType, Result},
    instruction::{Instruction, JumpKind, Operand, Program, RegisterOp},
    lexer::{LineLexer, SourceRange, Token, TokenType},
};

/// Parses a whole program. Every line, including blank, comment and label
/// lines, becomes exactly one instruction so that instruction indices match
/// line numbers.
pub fn parse_program(source: &str) -> Result<Program> {
    let (instructions, ranges): (Vec<_>, Vec<_>) =
        Parser::new(source).collect::<Result<Vec<_>>>()?.into_iter().unzip();

    let program = Program::new(instructions, ranges)?;
    debug!(
        "Parsed {} instructions with {} labels",
        program.len(),
        program.label_count()
    );

    Ok(program)
}

pub struct Parser<'a> {
    lines: std::str::Split<'a, char>,
    offset: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.split('\n'),
            offset: 0,
        }
    }

    pub fn parse_line(line: &'a str, offset: usize) -> Result<Instruction> {
        let mut lexer = LineLexer::new(line, offset);

        let opcode = match lexer.next_token()? {
            Some(token) => token,
            None => return Ok(Instruction::Comment),
        };

        if opcode.token_type != TokenType::Identifier {
            return Err(Error::new_with_range(
                ErrorType::Parse,
                format!("Expected an instruction or label, but got '{}'", opcode.value),
                opcode.range,
            ));
        }

        // Message templates contain quotes the line lexer does not know about,
        // so they are taken verbatim.
        if opcode.value == "msg" {
            let (rest, range) = lexer.remainder();
            let template = strip_comment(rest).trim();
            if template != ":" {
                return parse_message(opcode, template, range);
            }
        }

        let mut tokens = vec![];
        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }

        if let [colon] = &tokens[..] {
            if colon.token_type == TokenType::Colon {
                return Ok(Instruction::Label {
                    name: opcode.value.to_string(),
                });
            }
        }

        let mut args = Arguments::new(opcode, tokens);
        let instruction = match opcode.value {
            "mov" | "inc" | "dec" | "add" | "sub" | "mul" | "div" => {
                parse_register_operation(&mut args)?
            }
            "cmp" | "jmp" | "je" | "jne" | "jge" | "jg" | "jle" | "jl" => {
                parse_label_jump(&mut args)?
            }
            "call" | "ret" | "end" => parse_function_call(&mut args)?,
            name => {
                return Err(Error::new_with_range(
                    ErrorType::Parse,
                    format!("Unknown instruction '{}'", name),
                    opcode.range,
                ))
            }
        };
        args.finish()?;

        Ok(instruction)
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = Result<(Instruction, SourceRange)>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        let offset = self.offset;
        self.offset += line.len() + 1;

        let range = SourceRange::new(offset, offset + line.trim_end().len());
        let instruction = Self::parse_line(line, offset);
        if let Ok(instruction) = &instruction {
            trace!("{:?} -> {:?}", line, instruction);
        }

        Some(instruction.map(|instruction| (instruction, range)))
    }
}

/// Cuts a `;` comment off a message template, ignoring semicolons that sit
/// inside a quoted segment.
fn strip_comment(text: &str) -> &str {
    let mut quoted = false;
    for (index, c) in text.char_indices() {
        match c {
            '\'' => quoted = !quoted,
            ';' if !quoted => return &text[..index],
            _ => {}
        }
    }
    text
}

fn parse_message(opcode: Token, template: &str, range: SourceRange) -> Result<Instruction> {
    if template.is_empty() {
        return Err(Error::new_with_range(
            ErrorType::Parse,
            "Expected a message template after 'msg'".to_string(),
            opcode.range.expand(&range),
        ));
    }

    Ok(Instruction::Message {
        template: template.to_string(),
    })
}

struct Arguments<'a> {
    opcode: Token<'a>,
    tokens: Vec<Token<'a>>,
    index: usize,
}

impl<'a> Arguments<'a> {
    fn new(opcode: Token<'a>, tokens: Vec<Token<'a>>) -> Self {
        Self {
            opcode,
            tokens,
            index: 0,
        }
    }

    fn last_range(&self) -> SourceRange {
        self.tokens
            .get(self.index.saturating_sub(1))
            .map(|token| token.range)
            .unwrap_or(self.opcode.range)
    }

    fn consume(&mut self, expected: &str) -> Result<Token<'a>> {
        match self.tokens.get(self.index) {
            Some(token) => {
                self.index += 1;
                Ok(*token)
            }
            None => Err(Error::new_with_range(
                ErrorType::Parse,
                format!("Expected {} for '{}'", expected, self.opcode.value),
                self.last_range(),
            )),
        }
    }

    fn consume_assert(&mut self, token_type: TokenType, expected: &str) -> Result<Token<'a>> {
        let token = self.consume(expected)?;
        if token.token_type != token_type {
            return Err(Error::new_with_range(
                ErrorType::Parse,
                format!(
                    "Expected {} for '{}', but got '{}'",
                    expected, self.opcode.value, token.value
                ),
                token.range,
            ));
        }
        Ok(token)
    }

    fn name(&mut self, expected: &str) -> Result<String> {
        Ok(self
            .consume_assert(TokenType::Identifier, expected)?
            .value
            .to_string())
    }

    fn separator(&mut self) -> Result<()> {
        self.consume_assert(TokenType::Comma, "','").map(|_| ())
    }

    fn operand(&mut self) -> Result<Operand> {
        let token = self.consume("a register or integer")?;
        match token.token_type {
            TokenType::IntegerLiteral => token.value.parse::<i64>().map(Operand::Literal).map_err(
                |_| {
                    Error::new_with_range(
                        ErrorType::Parse,
                        format!("Integer literal '{}' is out of range", token.value),
                        token.range,
                    )
                },
            ),
            TokenType::Identifier => Ok(Operand::Register(token.value.to_string())),
            _ => Err(Error::new_with_range(
                ErrorType::Parse,
                format!(
                    "Expected a register or integer for '{}', but got '{}'",
                    self.opcode.value, token.value
                ),
                token.range,
            )),
        }
    }

    fn finish(self) -> Result<()> {
        match self.tokens.get(self.index) {
            Some(token) => Err(Error::new_with_range(
                ErrorType::Parse,
                format!(
                    "Unexpected '{}' after '{}' instruction",
                    token.value, self.opcode.value
                ),
                token.range,
            )),
            None => Ok(()),
        }
    }
}

fn parse_register_operation(args: &mut Arguments) -> Result<Instruction> {
    let target = args.name("a target register")?;

    let op = match args.opcode.value {
        "inc" => RegisterOp::Inc,
        "dec" => RegisterOp::Dec,
        opcode => {
            args.separator()?;
            let operand = args.operand()?;
            match opcode {
                "mov" => RegisterOp::Mov(operand),
                "add" => RegisterOp::Add(operand),
                "sub" => RegisterOp::Sub(operand),
                "mul" => RegisterOp::Mul(operand),
                "div" => RegisterOp::Div(operand),
                _ => unreachable!(),
            }
        }
    };

    Ok(Instruction::RegisterOp { op, target })
}

fn parse_label_jump(args: &mut Arguments) -> Result<Instruction> {
    let kind = match args.opcode.value {
        "cmp" => {
            let left = args.operand()?;
            args.separator()?;
            let right = args.operand()?;
            return Ok(Instruction::Compare { left, right });
        }
        "jmp" => JumpKind::Jmp,
        "je" => JumpKind::Je,
        "jne" => JumpKind::Jne,
        "jge" => JumpKind::Jge,
        "jg" => JumpKind::Jg,
        "jle" => JumpKind::Jle,
        "jl" => JumpKind::Jl,
        _ => unreachable!(),
    };

    Ok(Instruction::Jump {
        kind,
        target: args.name("a label")?,
    })
}

fn parse_function_call(args: &mut Arguments) -> Result<Instruction> {
    match args.opcode.value {
        "call" => Ok(Instruction::Call {
            target: args.name("a label")?,
        }),
        "ret" => Ok(Instruction::Return),
        "end" => Ok(Instruction::End),
        _ => unreachable!(),
    }
}
