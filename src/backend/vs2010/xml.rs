//! Minimal XML writer for MSBuild project files.
//!
//! MSBuild files are flat and predictable, so a push/pop writer with
//! two-space indentation covers everything the backend needs.

use std::fmt::Write;

/// Escape text content (`<`, `>`, `&`).
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value (text escapes plus quotes).
pub fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

/// An indenting XML writer.
pub struct XmlWriter {
    buf: String,
    stack: Vec<&'static str>,
}

impl XmlWriter {
    /// Start a document with the UTF-8 declaration.
    pub fn new() -> Self {
        XmlWriter {
            buf: "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n".to_string(),
            stack: Vec::new(),
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.stack.len() {
            self.buf.push_str("  ");
        }
    }

    fn write_attrs(&mut self, attrs: &[(&str, &str)]) {
        for (key, value) in attrs {
            write!(self.buf, " {}=\"{}\"", key, escape_attr(value)).unwrap();
        }
    }

    /// Open an element; must be matched by [`XmlWriter::close`].
    pub fn open(&mut self, tag: &'static str, attrs: &[(&str, &str)]) {
        self.indent();
        self.buf.push('<');
        self.buf.push_str(tag);
        self.write_attrs(attrs);
        self.buf.push_str(">\n");
        self.stack.push(tag);
    }

    /// Close the most recently opened element.
    pub fn close(&mut self) {
        let tag = self.stack.pop().expect("close without open");
        self.indent();
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push_str(">\n");
    }

    /// A self-closing element.
    pub fn empty(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.indent();
        self.buf.push('<');
        self.buf.push_str(tag);
        self.write_attrs(attrs);
        self.buf.push_str(" />\n");
    }

    /// `<tag>text</tag>` on one line.
    pub fn text_elem(&mut self, tag: &str, attrs: &[(&str, &str)], text: &str) {
        self.indent();
        self.buf.push('<');
        self.buf.push_str(tag);
        self.write_attrs(attrs);
        write!(self.buf, ">{}</{}>\n", escape_text(text), tag).unwrap();
    }

    /// Finish the document.
    pub fn finish(self) -> String {
        debug_assert!(self.stack.is_empty(), "unclosed elements: {:?}", self.stack);
        self.buf
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}
