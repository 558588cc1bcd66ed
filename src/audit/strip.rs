//! Comment stripping for HCL sources
//!
//! Produces the text that rules are matched against. Handles:
//! - `/* ... */` block comments (non-nesting, may span lines)
//! - `#` and `//` line comments, whole-line or trailing
//! - `"..."` strings with escapes and `${ }` / `%{ }` templates
//! - `<<EOF` / `<<-EOF` heredocs
//!
//! Comment markers inside strings and heredocs are inert. A block comment is
//! recognised at its opening marker before any line is classified, so lines
//! inside it (including ones that start with `#`) are never looked at on their
//! own.
//!
//! Line structure is kept: whole-line comments become empty lines, block
//! comments keep their newlines, and a block comment that closes on the line it
//! opened becomes a single space so the tokens around it stay apart.

/// Nesting inside a quoted string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Str,
    /// Inside `${ ... }`; counts unmatched `{` opened within the template
    Template(usize),
}

struct Stripper {
    chars: Vec<char>,
    pos: usize,
    out: String,
    /// Byte offset in `out` where the current line starts
    line_start: usize,
    /// Whether the current line has emitted anything besides whitespace
    line_has_code: bool,
    contexts: Vec<Context>,
    pending_heredoc: Option<String>,
}

/// Remove comments from `content`.
///
/// Pattern-level approximation: the input is not parsed, so malformed HCL
/// (an unterminated string, say) is recovered from at the next newline.
pub fn strip_comments(content: &str) -> String {
    Stripper::new(content).run()
}

impl Stripper {
    fn new(content: &str) -> Self {
        Self {
            chars: content.chars().collect(),
            pos: 0,
            out: String::with_capacity(content.len()),
            line_start: 0,
            line_has_code: false,
            contexts: Vec::new(),
            pending_heredoc: None,
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn emit(&mut self, c: char) {
        self.out.push(c);
        if !c.is_whitespace() {
            self.line_has_code = true;
        }
    }

    fn run(mut self) -> String {
        while let Some(c) = self.peek(0) {
            if c == '\n' {
                self.newline();
                continue;
            }
            match self.contexts.last().copied() {
                None => self.code(c),
                Some(Context::Str) => self.string(c),
                Some(Context::Template(depth)) => self.template(c, depth),
            }
        }
        self.out
    }

    fn newline(&mut self) {
        // Strings cannot span lines; recover rather than swallow the file.
        self.contexts.clear();
        self.out.push('\n');
        self.pos += 1;
        self.line_start = self.out.len();
        self.line_has_code = false;
        if let Some(marker) = self.pending_heredoc.take() {
            self.heredoc_body(&marker);
        }
    }

    fn code(&mut self, c: char) {
        match (c, self.peek(1)) {
            ('#', _) | ('/', Some('/')) => self.line_comment(),
            ('/', Some('*')) => self.block_comment(),
            ('"', _) => {
                self.contexts.push(Context::Str);
                self.emit(c);
                self.pos += 1;
            }
            ('<', Some('<')) => self.heredoc_opener(),
            _ => {
                self.emit(c);
                self.pos += 1;
            }
        }
    }

    fn string(&mut self, c: char) {
        match (c, self.peek(1)) {
            ('\\', Some(next)) if next != '\n' => {
                self.emit(c);
                self.emit(next);
                self.pos += 2;
            }
            // `$${` and `%%{` are literal `${` and `%{`, not templates
            ('$', Some('$')) | ('%', Some('%')) if self.peek(2) == Some('{') => {
                self.emit(c);
                self.emit(c);
                self.emit('{');
                self.pos += 3;
            }
            ('$', Some('{')) | ('%', Some('{')) => {
                self.emit(c);
                self.emit('{');
                self.pos += 2;
                self.contexts.push(Context::Template(0));
            }
            ('"', _) => {
                self.emit(c);
                self.pos += 1;
                self.contexts.pop();
            }
            _ => {
                self.emit(c);
                self.pos += 1;
            }
        }
    }

    fn template(&mut self, c: char, depth: usize) {
        match c {
            '"' => self.contexts.push(Context::Str),
            '{' => self.set_template_depth(depth + 1),
            '}' if depth == 0 => {
                self.contexts.pop();
            }
            '}' => self.set_template_depth(depth - 1),
            _ => {}
        }
        self.emit(c);
        self.pos += 1;
    }

    fn set_template_depth(&mut self, depth: usize) {
        if let Some(top) = self.contexts.last_mut() {
            *top = Context::Template(depth);
        }
    }

    fn line_comment(&mut self) {
        if !self.line_has_code {
            self.out.truncate(self.line_start);
        }
        while let Some(c) = self.peek(0) {
            if c == '\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn block_comment(&mut self) {
        self.pos += 2;
        let mut spanned_lines = false;
        loop {
            match (self.peek(0), self.peek(1)) {
                // Unterminated: the rest of the file is comment.
                (None, _) => break,
                (Some('*'), Some('/')) => {
                    self.pos += 2;
                    break;
                }
                (Some('\n'), _) => {
                    self.out.push('\n');
                    self.line_start = self.out.len();
                    self.line_has_code = false;
                    spanned_lines = true;
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }
        if !spanned_lines {
            self.out.push(' ');
        }
    }

    fn heredoc_opener(&mut self) {
        let mut cursor = self.pos + 2;
        if self.chars.get(cursor) == Some(&'-') {
            cursor += 1;
        }
        let ident_start = cursor;
        while let Some(&c) = self.chars.get(cursor) {
            let valid = if cursor == ident_start {
                c.is_ascii_alphabetic() || c == '_'
            } else {
                c.is_ascii_alphanumeric() || c == '_'
            };
            if !valid {
                break;
            }
            cursor += 1;
        }

        if cursor > ident_start {
            let marker: String = self.chars[ident_start..cursor].iter().collect();
            self.pending_heredoc = Some(marker);
        }
        for i in self.pos..cursor {
            let c = self.chars[i];
            self.emit(c);
        }
        self.pos = cursor;
    }

    /// Copy heredoc lines verbatim up to and including the terminator line.
    /// The terminator's own newline is left for the main loop.
    fn heredoc_body(&mut self, marker: &str) {
        while self.pos < self.chars.len() {
            let start = self.pos;
            while self.pos < self.chars.len() && self.chars[self.pos] != '\n' {
                self.pos += 1;
            }
            let line: String = self.chars[start..self.pos].iter().collect();
            self.out.push_str(&line);
            if line.trim() == marker {
                self.line_has_code = true;
                return;
            }
            if self.pos < self.chars.len() {
                self.out.push('\n');
                self.pos += 1;
                self.line_start = self.out.len();
            }
        }
    }
}
