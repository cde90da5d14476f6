use super::dataset::ParseInstanceError;

/// A nested list of integers, e.g. `[[1, 2], (3, 4)]`.
///
/// Square brackets, parentheses and braces are all read as sequences.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Literal {
    Int(i64),
    Seq(Vec<Literal>),
}

impl Literal {
    pub(crate) fn parse(text: &str) -> Result<Literal, ParseInstanceError> {
        let mut parser = Parser { text, pos: 0 };
        let literal = parser.literal()?;
        parser.skip_whitespace();
        match parser.peek() {
            None => Ok(literal),
            Some(c) => Err(ParseInstanceError::UnexpectedChar { position: parser.pos, found: c as char }),
        }
    }
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn literal(&mut self) -> Result<Literal, ParseInstanceError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'[') => self.seq(b']'),
            Some(b'(') => self.seq(b')'),
            Some(b'{') => self.seq(b'}'),
            Some(b'-' | b'0'..=b'9') => self.int(),
            Some(c) => Err(ParseInstanceError::UnexpectedChar { position: self.pos, found: c as char }),
            None => Err(ParseInstanceError::UnexpectedEnd),
        }
    }

    fn seq(&mut self, close: u8) -> Result<Literal, ParseInstanceError> {
        self.pos += 1;
        let mut items = vec![];
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(Literal::Seq(items));
            }
            items.push(self.literal()?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(c) if c == close => {}
                Some(c) => return Err(ParseInstanceError::UnexpectedChar { position: self.pos, found: c as char }),
                None => return Err(ParseInstanceError::UnexpectedEnd),
            }
        }
    }

    fn int(&mut self) -> Result<Literal, ParseInstanceError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        Ok(Literal::Int(self.text[start..self.pos].parse()?))
    }
}
