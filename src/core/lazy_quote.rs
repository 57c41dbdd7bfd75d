// Byte-stream rewrite that gives the tokenizer lazy-quote semantics.
// Inside a quoted field, a quote not followed by the delimiter, a line end,
// another quote, or end of input is kept as a literal quote.
// Only quote bytes are inserted; line numbers of the rewritten stream match the input.
use std::io::{self, Read};

const CHUNK: usize = 8 * 1024;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    RecordStart,
    FieldStart,
    Unquoted,
    Quoted,
    /// A quote was seen inside a quoted field; the next byte decides its meaning.
    QuoteInQuoted,
    Comment,
}

pub(crate) struct LazyQuotes<R> {
    inner: R,
    quote: u8,
    delimiter: u8,
    comment: Option<u8>,
    state: State,
    chunk: Box<[u8]>,
    out: Vec<u8>,
    pos: usize,
    eof: bool,
}

impl<R: Read> LazyQuotes<R> {
    pub(crate) fn new(inner: R, delimiter: u8, quote: u8, comment: Option<u8>) -> Self {
        Self {
            inner,
            quote,
            delimiter,
            comment,
            state: State::RecordStart,
            chunk: vec![0; CHUNK].into_boxed_slice(),
            out: Vec::with_capacity(CHUNK + CHUNK / 2),
            pos: 0,
            eof: false,
        }
    }

    fn refill(&mut self) -> io::Result<()> {
        self.out.clear();
        self.pos = 0;
        while self.out.is_empty() && !self.eof {
            let n = match self.inner.read(&mut self.chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };
            if n == 0 {
                self.eof = true;
                if self.state == State::QuoteInQuoted {
                    self.out.push(self.quote);
                    self.state = State::FieldStart;
                }
                break;
            }
            for index in 0..n {
                let byte = self.chunk[index];
                self.rewrite(byte);
            }
        }
        Ok(())
    }

    fn rewrite(&mut self, byte: u8) {
        let quote = self.quote;
        match self.state {
            State::RecordStart if Some(byte) == self.comment => {
                self.state = State::Comment;
                self.out.push(byte);
            }
            State::RecordStart | State::FieldStart => {
                self.state = if byte == quote {
                    State::Quoted
                } else {
                    self.after_unquoted(byte)
                };
                self.out.push(byte);
            }
            State::Unquoted => {
                self.state = self.after_unquoted(byte);
                self.out.push(byte);
            }
            State::Quoted => {
                if byte == quote {
                    self.state = State::QuoteInQuoted;
                } else {
                    self.out.push(byte);
                }
            }
            State::QuoteInQuoted => {
                if byte == quote {
                    self.out.extend_from_slice(&[quote, quote]);
                    self.state = State::Quoted;
                } else if byte == self.delimiter {
                    self.out.extend_from_slice(&[quote, byte]);
                    self.state = State::FieldStart;
                } else if is_line_end(byte) {
                    self.out.extend_from_slice(&[quote, byte]);
                    self.state = State::RecordStart;
                } else {
                    // bare quote: escape it and stay inside the field
                    self.out.extend_from_slice(&[quote, quote, byte]);
                    self.state = State::Quoted;
                }
            }
            State::Comment => {
                if byte == b'\n' {
                    self.state = State::RecordStart;
                }
                self.out.push(byte);
            }
        }
    }

    fn after_unquoted(&self, byte: u8) -> State {
        if byte == self.delimiter {
            State::FieldStart
        } else if is_line_end(byte) {
            State::RecordStart
        } else {
            State::Unquoted
        }
    }
}

fn is_line_end(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

impl<R: Read> Read for LazyQuotes<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos == self.out.len() {
            self.refill()?;
        }
        let pending = &self.out[self.pos..];
        let n = pending.len().min(buf.len());
        buf[..n].copy_from_slice(&pending[..n]);
        self.pos += n;
        Ok(n)
    }
}
