//! Line-oriented writer for generated configuration files.

use std::io::{self, Write};

/// Comment syntax of a configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentSyntax {
    /// `# text` (YAML, shell)
    Hash,
    /// `// text` (Kotlin DSL, Groovy)
    DoubleSlash,
    /// `<!-- text -->` (XML)
    Xml,
}

impl CommentSyntax {
    /// Render `text` as a single comment line.
    pub fn comment(&self, text: &str) -> String {
        match (self, text.is_empty()) {
            (CommentSyntax::Hash, true) => "#".to_string(),
            (CommentSyntax::Hash, false) => format!("# {text}"),
            (CommentSyntax::DoubleSlash, true) => "//".to_string(),
            (CommentSyntax::DoubleSlash, false) => format!("// {text}"),
            (CommentSyntax::Xml, true) => "<!-- -->".to_string(),
            (CommentSyntax::Xml, false) => format!("<!-- {text} -->"),
        }
    }
}

/// Writes indented lines and comments to an output stream.
pub struct ConfigWriter<'a> {
    out: &'a mut dyn Write,
    syntax: CommentSyntax,
    indent: usize,
    indent_width: usize,
}

impl<'a> ConfigWriter<'a> {
    pub fn new(out: &'a mut dyn Write, syntax: CommentSyntax) -> Self {
        Self {
            out,
            syntax,
            indent: 0,
            indent_width: 2,
        }
    }

    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    pub fn syntax(&self) -> CommentSyntax {
        self.syntax
    }

    /// Write `text` at the current indentation. Empty text writes a bare newline.
    pub fn write_line(&mut self, text: &str) -> io::Result<()> {
        if text.is_empty() {
            return writeln!(self.out);
        }
        let pad = self.indent * self.indent_width;
        writeln!(self.out, "{:pad$}{}", "", text, pad = pad)
    }

    pub fn write_blank_line(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    /// Write `text` as one comment line in this file's syntax.
    pub fn write_comment(&mut self, text: &str) -> io::Result<()> {
        let line = self.syntax.comment(text);
        self.write_line(&line)
    }

    /// Run `body` one indentation level deeper.
    pub fn indented<F>(&mut self, body: F) -> io::Result<()>
    where
        F: FnOnce(&mut Self) -> io::Result<()>,
    {
        self.indent += 1;
        let result = body(self);
        self.indent -= 1;
        result
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
