//! Arithmetic expression evaluation for the transaction amount field
//!
//! Users can type `2+3*4` into the amount input and get the computed value.
//! Evaluation is a plain recursive-descent parser over the fixed operator
//! set `{+,-,*,/,(,)}` and decimal literals; there is no runtime code
//! construction and nothing here can execute anything.
//!
//! The contract the input field relies on: evaluation never fails loudly.
//! A string that cannot be evaluated comes back unchanged so the user can
//! keep editing it.

/// Evaluate a user-typed arithmetic string.
///
/// Characters outside `[0-9+\-*/.()]` are stripped before evaluation. An
/// empty sanitized string yields `""`. Division by zero follows IEEE-754
/// (`"Infinity"`, `"NaN"` for `0/0`). A string that does not parse as an
/// expression (e.g. a trailing operator) is returned as-is, unsanitized.
pub fn evaluate_expression(input: &str) -> String {
    let sanitized: String = input
        .chars()
        .filter(|c| matches!(c, '0'..='9' | '+' | '-' | '*' | '/' | '.' | '(' | ')'))
        .collect();

    if sanitized.is_empty() {
        return String::new();
    }

    match Parser::new(&sanitized).parse() {
        Some(value) => render_number(value),
        None => input.to_string(),
    }
}

/// Render an `f64` the way the UI expects: integral values without a
/// fractional part, `Infinity`/`-Infinity`/`NaN` spelled out.
fn render_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        // Normalize -0 to "0"
        return "0".to_string();
    }
    format!("{}", value)
}

/// Recursive-descent parser with standard precedence: unary sign binds
/// tightest, then `*`/`/`, then `+`/`-`, all left-associative, parentheses
/// override. At most one unary sign per operand: `10*-2` parses but
/// `10--5` does not (the field treats repeated signs as a typo in
/// progress, so the raw input comes back for further editing).
struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        // Sanitized input is ASCII only
        Self {
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Option<f64> {
        let value = self.expression()?;
        // Trailing garbage (e.g. an unmatched `)`) is a parse failure
        if self.pos == self.bytes.len() {
            Some(value)
        } else {
            None
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn expression(&mut self) -> Option<f64> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(b'+') => {
                    self.bump();
                    value += self.term()?;
                }
                Some(b'-') => {
                    self.bump();
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Some(value)
    }

    fn term(&mut self) -> Option<f64> {
        let mut value = self.factor()?;
        loop {
            match self.peek() {
                Some(b'*') => {
                    self.bump();
                    value *= self.factor()?;
                }
                Some(b'/') => {
                    self.bump();
                    // IEEE-754 division: x/0 is ±Infinity, 0/0 is NaN
                    value /= self.factor()?;
                }
                _ => break,
            }
        }
        Some(value)
    }

    fn factor(&mut self) -> Option<f64> {
        match self.peek()? {
            b'+' => {
                self.bump();
                self.primary()
            }
            b'-' => {
                self.bump();
                Some(-self.primary()?)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Option<f64> {
        match self.peek()? {
            b'(' => {
                self.bump();
                let value = self.expression()?;
                if self.peek() == Some(b')') {
                    self.bump();
                    Some(value)
                } else {
                    None
                }
            }
            b'0'..=b'9' | b'.' => self.number(),
            _ => None,
        }
    }

    fn number(&mut self) -> Option<f64> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9') | Some(b'.')) {
            self.bump();
        }
        let literal = std::str::from_utf8(&self.bytes[start..self.pos]).ok()?;
        // Rejects malformed literals such as "1.2.3" or a lone "."
        literal.parse::<f64>().ok()
    }
}
