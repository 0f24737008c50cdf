use logos::{Lexer, Logos};

use crate::error::{SchemeError, SchemeResult};
use crate::heap::Heap;
use crate::symbol::{sym, SymbolTable};
use crate::value::Value;

/// Token grammar: brackets, dot, quote, signed 64-bit integers, and
/// symbols starting with a letter or one of `< = > * / #`, continuing
/// with those plus digits and `? ! -`. A bare `+` or `-` not followed by
/// a digit is a symbol.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    #[token("(")]
    Open,
    #[token(")")]
    Close,
    #[token(".")]
    Dot,
    #[token("'")]
    Quote,
    // Literals outside i64 range fail the callback and lex as errors.
    #[regex(r"[+-]?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Number(i64),
    #[regex(r"[A-Za-z<=>*/#][A-Za-z0-9<=>*/#?!-]*", |lex| lex.slice().to_owned())]
    #[token("+", |lex| lex.slice().to_owned())]
    #[token("-", |lex| lex.slice().to_owned())]
    Symbol(String),
}

/// Recursive-descent parser producing heap-allocated forms. Lexing is
/// lazy with one token of lookahead, so text after the requested form is
/// never touched.
pub struct Reader<'a> {
    lexer: Lexer<'a, Token>,
    lookahead: Option<Token>,
    heap: &'a mut Heap,
    symbols: &'a mut SymbolTable,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a str, heap: &'a mut Heap, symbols: &'a mut SymbolTable) -> Self {
        Reader {
            lexer: Token::lexer(input),
            lookahead: None,
            heap,
            symbols,
        }
    }

    /// Read one form. Returns None when the input holds no more tokens.
    pub fn read(&mut self) -> SchemeResult<Option<Value>> {
        self.fill()?;
        if self.lookahead.is_none() {
            return Ok(None);
        }
        Ok(Some(self.read_expr()?))
    }

    /// Byte offset just past the last consumed token.
    pub fn position(&self) -> usize {
        if self.lookahead.is_some() {
            self.lexer.span().start
        } else {
            self.lexer.span().end
        }
    }

    fn fill(&mut self) -> SchemeResult<()> {
        if self.lookahead.is_none() {
            self.lookahead = match self.lexer.next() {
                Some(Ok(token)) => Some(token),
                Some(Err(())) => {
                    return Err(SchemeError::Syntax("unknown token in input".into()));
                }
                None => None,
            };
        }
        Ok(())
    }

    fn next_token(&mut self) -> SchemeResult<Option<Token>> {
        self.fill()?;
        Ok(self.lookahead.take())
    }

    fn read_expr(&mut self) -> SchemeResult<Value> {
        let token = self
            .next_token()?
            .ok_or_else(|| SchemeError::Syntax("unexpected end of input".into()))?;
        match token {
            Token::Number(n) => Ok(Value::Number(n)),
            Token::Symbol(name) => Ok(Value::Symbol(self.symbols.intern(&name))),
            Token::Open => self.read_list(),
            Token::Close => Err(SchemeError::Syntax("unexpected ')'".into())),
            Token::Dot => Err(SchemeError::Syntax("unexpected '.'".into())),
            Token::Quote => {
                // 'x reads as (quote x).
                let quoted = self.read_expr()?;
                let inner = self.heap.alloc_cell(quoted, Value::Nil);
                let outer = self
                    .heap
                    .alloc_cell(Value::Symbol(sym::QUOTE), Value::Cell(inner));
                Ok(Value::Cell(outer))
            }
        }
    }

    /// Read list elements up to the matching ')', with an optional
    /// dotted tail after at least one element.
    fn read_list(&mut self) -> SchemeResult<Value> {
        let mut elements = Vec::new();
        let mut tail = Value::Nil;
        loop {
            self.fill()?;
            match self.lookahead {
                None => return Err(SchemeError::Syntax("unterminated list".into())),
                Some(Token::Close) => {
                    self.lookahead = None;
                    break;
                }
                Some(Token::Dot) if !elements.is_empty() => {
                    self.lookahead = None;
                    tail = self.read_expr()?;
                    match self.next_token()? {
                        Some(Token::Close) => break,
                        _ => {
                            return Err(SchemeError::Syntax(
                                "missing ')' after dotted tail".into(),
                            ));
                        }
                    }
                }
                Some(_) => elements.push(self.read_expr()?),
            }
        }

        let mut result = tail;
        for value in elements.into_iter().rev() {
            result = Value::Cell(self.heap.alloc_cell(value, result));
        }
        Ok(result)
    }
}

/// Read one form from `input` starting at byte offset `pos`. Returns the
/// form and the offset where reading stopped, or None when only
/// whitespace remains. Callers evaluating multi-form sources re-enter
/// here with the returned offset, so forms not yet parsed never hold
/// heap references the collector cannot see.
pub fn read_one_at(
    input: &str,
    pos: usize,
    heap: &mut Heap,
    symbols: &mut SymbolTable,
) -> SchemeResult<Option<(Value, usize)>> {
    let mut reader = Reader::new(&input[pos..], heap, symbols);
    match reader.read()? {
        Some(value) => {
            let end = pos + reader.position();
            Ok(Some((value, end)))
        }
        None => Ok(None),
    }
}
