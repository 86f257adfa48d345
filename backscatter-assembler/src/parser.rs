//! Assembly parser
//!
//! Parses one source line at a time into statements. Mnemonics and operand
//! names are case-insensitive; commas between operands are optional.

use crate::error::{AssemblerError, Result};
use crate::lexer::Token;
use backscatter_spec::instruction::{
    JmpCondition, MovDestination, MovOp, MovSource, OutDestination, SetDestination, Target,
};
use backscatter_spec::{Instruction, Operation, PinLevel};
use logos::Logos;

/// Directive of the dialect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `.program name`
    Program(String),
    /// `.side_set count [opt]`
    SideSet { count: u8, optional: bool },
    /// `.wrap_target`
    WrapTarget,
    /// `.wrap`
    Wrap,
}

/// One parsed element of a source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Directive(Directive),
    Label(String),
    Instruction(Instruction),
}

/// Parse a source line into its statements (empty for blank lines)
pub fn parse_line(text: &str, line: usize) -> Result<Vec<Statement>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(text);
    while let Some(token) = lexer.next() {
        match token {
            Ok(Token::Newline) => {}
            Ok(token) => tokens.push(token),
            Err(()) => {
                return Err(AssemblerError::SyntaxError {
                    line,
                    column: lexer.span().start + 1,
                    message: format!("unexpected input '{}'", lexer.slice()),
                })
            }
        }
    }

    let mut cursor = Cursor::new(&tokens, line);
    let mut statements = Vec::new();

    if let Some(Token::Directive(name)) = cursor.peek() {
        let name = name.to_lowercase();
        cursor.advance();
        statements.push(Statement::Directive(parse_directive(&name, &mut cursor)?));
        cursor.expect_end()?;
        return Ok(statements);
    }

    if let (Some(Token::Identifier(name)), Some(Token::Colon)) = (cursor.peek(), cursor.peek_at(1)) {
        statements.push(Statement::Label(name.clone()));
        cursor.advance();
        cursor.advance();
    }

    if !cursor.at_end() {
        statements.push(Statement::Instruction(parse_instruction_tokens(&mut cursor)?));
    }

    Ok(statements)
}

/// Parse a single instruction from assembly text
pub fn parse_instruction(text: &str) -> Result<Instruction> {
    let mut statements = parse_line(text, 0)?;
    match statements.pop() {
        Some(Statement::Instruction(instruction)) if statements.is_empty() => Ok(instruction),
        _ => Err(AssemblerError::SyntaxError {
            line: 0,
            column: 0,
            message: "Expected a single instruction".to_string(),
        }),
    }
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token], line: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            line,
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Consume `token` if it comes next
    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn syntax_error(&self, message: impl Into<String>) -> AssemblerError {
        AssemblerError::SyntaxError {
            line: self.line,
            column: self.pos + 1,
            message: message.into(),
        }
    }

    fn identifier(&mut self, expected: &str) -> Result<String> {
        match self.advance() {
            Some(Token::Identifier(name)) => Ok(name.to_lowercase()),
            Some(token) => Err(self.syntax_error(format!("Expected {}, found {:?}", expected, token))),
            None => Err(self.syntax_error(format!("Expected {}", expected))),
        }
    }

    fn number(&mut self, expected: &str) -> Result<u32> {
        match self.advance() {
            Some(token) => token
                .value()
                .ok_or_else(|| self.syntax_error(format!("Expected {}, found {:?}", expected, token))),
            None => Err(self.syntax_error(format!("Expected {}", expected))),
        }
    }

    fn bounded(&mut self, what: &'static str, max: u32) -> Result<u32> {
        let value = self.number(what)?;
        if value > max {
            return Err(AssemblerError::ValueOutOfRange {
                line: self.line,
                what,
                value,
                max,
            });
        }
        Ok(value)
    }

    fn expect_end(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(self.syntax_error(format!("Unexpected {:?}", token))),
        }
    }

    fn invalid_operand(&self, operand: impl Into<String>) -> AssemblerError {
        AssemblerError::InvalidOperand {
            line: self.line,
            operand: operand.into(),
        }
    }
}

fn parse_directive(name: &str, cursor: &mut Cursor) -> Result<Directive> {
    match name {
        "program" => Ok(Directive::Program(cursor.identifier("program name")?)),
        "side_set" => {
            let count = cursor.bounded("side-set count", 5)? as u8;
            let optional = match cursor.peek() {
                Some(Token::Identifier(word)) if word.eq_ignore_ascii_case("opt") => {
                    cursor.advance();
                    true
                }
                _ => false,
            };
            Ok(Directive::SideSet { count, optional })
        }
        "wrap_target" => Ok(Directive::WrapTarget),
        "wrap" => Ok(Directive::Wrap),
        other => Err(AssemblerError::InvalidDirective(other.to_string())),
    }
}

fn parse_instruction_tokens(cursor: &mut Cursor) -> Result<Instruction> {
    let mnemonic = cursor.identifier("instruction")?;

    let operation = match mnemonic.as_str() {
        "jmp" => parse_jmp(cursor)?,
        "out" => {
            let destination = parse_out_destination(cursor)?;
            cursor.eat(&Token::Comma);
            let bit_count = cursor.bounded("bit count", 32)?;
            if bit_count == 0 {
                return Err(AssemblerError::ValueOutOfRange {
                    line: cursor.line,
                    what: "bit count",
                    value: 0,
                    max: 32,
                });
            }
            Operation::Out {
                destination,
                bit_count: bit_count as u8,
            }
        }
        "mov" => {
            let destination = parse_mov_destination(cursor)?;
            cursor.eat(&Token::Comma);
            let op = if cursor.eat(&Token::Bang) || cursor.eat(&Token::Tilde) {
                MovOp::Invert
            } else if cursor.eat(&Token::DoubleColon) {
                MovOp::Reverse
            } else {
                MovOp::None
            };
            let source = parse_mov_source(cursor)?;
            Operation::Mov {
                destination,
                op,
                source,
            }
        }
        "set" => {
            let destination = parse_set_destination(cursor)?;
            cursor.eat(&Token::Comma);
            let value = cursor.bounded("set value", 31)? as u8;
            Operation::Set { destination, value }
        }
        _ => {
            return Err(AssemblerError::UnknownInstruction {
                line: cursor.line,
                mnemonic,
            })
        }
    };

    let mut instruction = Instruction::new(operation);
    let mut seen_side = false;
    let mut seen_delay = false;
    while !cursor.at_end() {
        match cursor.peek() {
            Some(Token::Identifier(word)) if word.eq_ignore_ascii_case("side") && !seen_side => {
                cursor.advance();
                let value = cursor.bounded("side-set value", 1)?;
                instruction.side = PinLevel::from_value(value as u8);
                seen_side = true;
            }
            Some(Token::LBracket) if !seen_delay => {
                cursor.advance();
                instruction.delay = cursor.bounded("delay", 31)? as u8;
                if !cursor.eat(&Token::RBracket) {
                    return Err(cursor.syntax_error("Expected ']'"));
                }
                seen_delay = true;
            }
            Some(token) => return Err(cursor.syntax_error(format!("Unexpected {:?}", token))),
            None => break,
        }
    }

    Ok(instruction)
}

fn parse_jmp(cursor: &mut Cursor) -> Result<Operation> {
    let condition = match (cursor.peek(), cursor.peek_at(1)) {
        (Some(Token::Bang), Some(Token::Identifier(reg))) => {
            let condition = match reg.to_lowercase().as_str() {
                "x" => JmpCondition::XZero,
                "y" => JmpCondition::YZero,
                "osre" => JmpCondition::OsrNotEmpty,
                other => return Err(cursor.invalid_operand(format!("!{}", other))),
            };
            cursor.advance();
            cursor.advance();
            condition
        }
        (Some(Token::Identifier(reg)), Some(Token::Decrement)) => {
            let condition = match reg.to_lowercase().as_str() {
                "x" => JmpCondition::XPostDecrement,
                "y" => JmpCondition::YPostDecrement,
                other => return Err(cursor.invalid_operand(format!("{}--", other))),
            };
            cursor.advance();
            cursor.advance();
            condition
        }
        (Some(Token::Identifier(x)), Some(Token::NotEqual)) if x.eq_ignore_ascii_case("x") => {
            cursor.advance();
            cursor.advance();
            match cursor.identifier("y")?.as_str() {
                "y" => JmpCondition::XNotEqualY,
                other => return Err(cursor.invalid_operand(format!("x!={}", other))),
            }
        }
        // `pin` is a condition only when a target follows
        (Some(Token::Identifier(pin)), Some(_)) if pin.eq_ignore_ascii_case("pin") => {
            cursor.advance();
            JmpCondition::Pin
        }
        _ => JmpCondition::Always,
    };
    cursor.eat(&Token::Comma);

    let target = match cursor.advance() {
        Some(Token::Identifier(label)) => Target::Label(label.clone()),
        Some(token) => match token.value() {
            Some(address) if address < 32 => Target::Address(address as u8),
            Some(address) => {
                return Err(AssemblerError::ValueOutOfRange {
                    line: cursor.line,
                    what: "jump address",
                    value: address,
                    max: 31,
                })
            }
            None => return Err(cursor.syntax_error(format!("Expected jump target, found {:?}", token))),
        },
        None => return Err(cursor.syntax_error("Expected jump target")),
    };

    Ok(Operation::Jmp { condition, target })
}

fn parse_out_destination(cursor: &mut Cursor) -> Result<OutDestination> {
    let name = cursor.identifier("OUT destination")?;
    match name.as_str() {
        "pins" => Ok(OutDestination::Pins),
        "x" => Ok(OutDestination::X),
        "y" => Ok(OutDestination::Y),
        "null" => Ok(OutDestination::Null),
        "pindirs" => Ok(OutDestination::Pindirs),
        "pc" => Ok(OutDestination::Pc),
        "isr" => Ok(OutDestination::Isr),
        "exec" => Ok(OutDestination::Exec),
        _ => Err(cursor.invalid_operand(name)),
    }
}

fn parse_mov_destination(cursor: &mut Cursor) -> Result<MovDestination> {
    let name = cursor.identifier("MOV destination")?;
    match name.as_str() {
        "pins" => Ok(MovDestination::Pins),
        "x" => Ok(MovDestination::X),
        "y" => Ok(MovDestination::Y),
        "exec" => Ok(MovDestination::Exec),
        "pc" => Ok(MovDestination::Pc),
        "isr" => Ok(MovDestination::Isr),
        "osr" => Ok(MovDestination::Osr),
        _ => Err(cursor.invalid_operand(name)),
    }
}

fn parse_mov_source(cursor: &mut Cursor) -> Result<MovSource> {
    let name = cursor.identifier("MOV source")?;
    match name.as_str() {
        "pins" => Ok(MovSource::Pins),
        "x" => Ok(MovSource::X),
        "y" => Ok(MovSource::Y),
        "null" => Ok(MovSource::Null),
        "status" => Ok(MovSource::Status),
        "isr" => Ok(MovSource::Isr),
        "osr" => Ok(MovSource::Osr),
        _ => Err(cursor.invalid_operand(name)),
    }
}

fn parse_set_destination(cursor: &mut Cursor) -> Result<SetDestination> {
    let name = cursor.identifier("SET destination")?;
    match name.as_str() {
        "pins" => Ok(SetDestination::Pins),
        "x" => Ok(SetDestination::X),
        "y" => Ok(SetDestination::Y),
        "pindirs" => Ok(SetDestination::Pindirs),
        _ => Err(cursor.invalid_operand(name)),
    }
}
