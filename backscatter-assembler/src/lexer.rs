//! # Lexer for the PIO assembly dialect

use logos::Logos;

/// Tokens of one source line
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")] // Skip whitespace (not newlines)
#[logos(skip r";[^\n]*")] // Skip comments
#[logos(skip r"//[^\n]*")]
pub enum Token {
    /// Identifier (mnemonics, operands, labels)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    /// Decimal number
    #[regex(r"[0-9]+", |lex| lex.slice().parse().ok())]
    Number(u32),

    /// Hexadecimal number
    #[regex(r"0x[0-9a-fA-F]+", |lex| u32::from_str_radix(&lex.slice()[2..], 16).ok())]
    Hex(u32),

    /// Binary number
    #[regex(r"0b[01]+", |lex| u32::from_str_radix(&lex.slice()[2..], 2).ok())]
    Binary(u32),

    /// Directive (.program, .side_set, .wrap_target, .wrap)
    #[regex(r"\.[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice()[1..].to_string())]
    Directive(String),

    #[token(",")]
    Comma,

    /// Colon (for labels)
    #[token(":")]
    Colon,

    /// Bit-reverse prefix of a MOV source
    #[token("::")]
    DoubleColon,

    /// Negation: `!x` conditions and inverted MOV sources
    #[token("!")]
    Bang,

    /// Alternative invert prefix
    #[token("~")]
    Tilde,

    /// Post-decrement in `x--` / `y--`
    #[token("--")]
    Decrement,

    #[token("!=")]
    NotEqual,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[regex(r"\n")]
    Newline,
}

impl Token {
    /// Numeric value of a number token in any base
    pub fn value(&self) -> Option<u32> {
        match self {
            Token::Number(n) | Token::Hex(n) | Token::Binary(n) => Some(*n),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexer_numbers() {
        let mut lex = Token::lexer("42 0x1A 0b1010");
        assert_eq!(lex.next(), Some(Ok(Token::Number(42))));
        assert_eq!(lex.next(), Some(Ok(Token::Hex(0x1A))));
        assert_eq!(lex.next(), Some(Ok(Token::Binary(0b1010))));
    }

    #[test]
    fn test_lexer_directive() {
        let mut lex = Token::lexer(".program backscatter\n.side_set 1 opt");
        assert_eq!(lex.next(), Some(Ok(Token::Directive("program".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Identifier("backscatter".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Newline)));
        assert_eq!(lex.next(), Some(Ok(Token::Directive("side_set".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Number(1))));
        assert_eq!(lex.next(), Some(Ok(Token::Identifier("opt".to_string()))));
    }

    #[test]
    fn test_lexer_conditions() {
        let tokens: Vec<_> = Token::lexer("jmp x--, loop_1 jmp !x send_0 x!=y")
            .map(|t| t.unwrap())
            .collect();
        assert_eq!(
            tokens,
            vec![
                Token::Identifier("jmp".to_string()),
                Token::Identifier("x".to_string()),
                Token::Decrement,
                Token::Comma,
                Token::Identifier("loop_1".to_string()),
                Token::Identifier("jmp".to_string()),
                Token::Bang,
                Token::Identifier("x".to_string()),
                Token::Identifier("send_0".to_string()),
                Token::Identifier("x".to_string()),
                Token::NotEqual,
                Token::Identifier("y".to_string()),
            ]
        );
    }

    #[test]
    fn test_lexer_skips_comments() {
        let tokens: Vec<_> = Token::lexer("set pins, 1 [7] ; switch output off // again")
            .map(|t| t.unwrap())
            .collect();
        assert_eq!(
            tokens,
            vec![
                Token::Identifier("set".to_string()),
                Token::Identifier("pins".to_string()),
                Token::Comma,
                Token::Number(1),
                Token::LBracket,
                Token::Number(7),
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn test_lexer_mov_prefixes() {
        let tokens: Vec<_> = Token::lexer("mov osr, ::isr mov x, !y")
            .map(|t| t.unwrap())
            .collect();
        assert!(tokens.contains(&Token::DoubleColon));
        assert!(tokens.contains(&Token::Bang));
    }

    #[test]
    fn test_lexer_rejects_unknown_character() {
        let mut lex = Token::lexer("set pins, $");
        lex.next();
        lex.next();
        lex.next();
        assert!(matches!(lex.next(), Some(Err(_))));
    }
}
