use rule_runtime::Symbol;

/// A rule token, classified by its role in the rule grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenAngle,
    CloseAngle,
    /// Separates repetition bounds and is otherwise a literal.
    Comma,
    Union,
    /// The explicit concatenation marker. Adjacent operands are concatenated
    /// without it.
    Concat,
    Star,
    Plus,
    Question,
    /// A literal or a wildcard marker.
    Operand(&'a str),
}

impl<'a> Token<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::OpenBrace => "{",
            Token::CloseBrace => "}",
            Token::OpenAngle => "<",
            Token::CloseAngle => ">",
            Token::Comma => ",",
            Token::Union => "|",
            Token::Concat => ".",
            Token::Star => "*",
            Token::Plus => "+",
            Token::Question => "?",
            Token::Operand(operand) => operand,
        }
    }

    /// Returns the transition symbol of a token that stands for itself.
    pub fn as_symbol(&self) -> Option<Symbol> {
        match self {
            Token::Operand(operand) => Some(Symbol::from(*operand)),
            Token::Comma => Some(Symbol::literal(",")),
            _ => None,
        }
    }
}

impl<'a> From<&'a str> for Token<'a> {
    fn from(src: &'a str) -> Self {
        match src {
            "(" => Token::OpenParen,
            ")" => Token::CloseParen,
            "{" => Token::OpenBrace,
            "}" => Token::CloseBrace,
            "<" => Token::OpenAngle,
            ">" => Token::CloseAngle,
            "," => Token::Comma,
            "|" => Token::Union,
            "." => Token::Concat,
            "*" => Token::Star,
            "+" => Token::Plus,
            "?" => Token::Question,
            operand => Token::Operand(operand),
        }
    }
}

impl std::fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_classify_rule_tokens() {
        let input_output = [
            ("(", Token::OpenParen, None),
            ("|", Token::Union, None),
            (",", Token::Comma, Some(Symbol::literal(","))),
            ("$", Token::Operand("$"), Some(Symbol::Word)),
            ("airfare", Token::Operand("airfare"), Some(Symbol::literal("airfare"))),
        ];

        for (test_id, (input, token, symbol)) in input_output.into_iter().enumerate() {
            let classified = Token::from(input);
            assert_eq!(
                (test_id, token, symbol),
                (test_id, classified, classified.as_symbol())
            );
            assert_eq!(input, classified.as_str());
        }
    }
}
