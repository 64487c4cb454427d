//! Restricted arithmetic evaluator for the `calc` command.
//!
//! Deliberately supports nothing beyond `+ - * / %`, parentheses, unary
//! minus and decimal literals. The upstream design delegated `calc` input to
//! a general-purpose evaluator; this parser is the restricted replacement.

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum CalcError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected trailing input")]
    TrailingInput,
    #[error("invalid number")]
    InvalidNumber,
    #[error("division by zero")]
    DivisionByZero,
}

/// Evaluate an arithmetic expression.
pub fn evaluate(input: &str) -> Result<f64, CalcError> {
    let mut p = Parser::new(input);
    let value = p.expr()?;
    p.skip_ws();
    if p.peek().is_some() {
        return Err(CalcError::TrailingInput);
    }
    Ok(value)
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut acc = self.term()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('+') => {
                    self.bump();
                    acc += self.term()?;
                }
                Some('-') => {
                    self.bump();
                    acc -= self.term()?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut acc = self.factor()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('*') => {
                    self.bump();
                    acc *= self.factor()?;
                }
                Some('/') => {
                    self.bump();
                    let rhs = self.factor()?;
                    if rhs == 0.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    acc /= rhs;
                }
                Some('%') => {
                    self.bump();
                    let rhs = self.factor()?;
                    if rhs == 0.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    acc %= rhs;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn factor(&mut self) -> Result<f64, CalcError> {
        self.skip_ws();
        match self.peek() {
            Some('-') => {
                self.bump();
                Ok(-self.factor()?)
            }
            Some('(') => {
                self.bump();
                let inner = self.expr()?;
                self.skip_ws();
                match self.bump() {
                    Some(')') => Ok(inner),
                    Some(c) => Err(CalcError::UnexpectedChar(c)),
                    None => Err(CalcError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(CalcError::UnexpectedChar(c)),
            None => Err(CalcError::UnexpectedEnd),
        }
    }

    fn number(&mut self) -> Result<f64, CalcError> {
        let mut raw = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            raw.push(self.bump().unwrap());
        }
        raw.parse::<f64>().map_err(|_| CalcError::InvalidNumber)
    }
}
