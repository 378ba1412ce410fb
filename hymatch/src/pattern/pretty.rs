//! RcDoc-based pretty-printer with termcolor annotations for [`Pattern`].
//!
//! Patterns are rendered as a `switch` block, one node per step:
//!
//! ```text
//! switch {
//!   case is Point bind { x -> my_x, y -> my_y } => 0
//!   null => 1
//!   default => 2
//! }
//! ```
use std::{
    fmt,
    io::{self, Write},
};

use pretty::{FmtWrite, RcDoc, RenderAnnotated};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::pattern::{OrPattern, Pattern};

/// Styles used to annotate parts of the pretty-printed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Punct,   // braces, commas, arrows
    Keyword, // switch, case, null, default, is, bind, with
    Literal, // compared values and case indices
    Ident,   // field names
    Type,    // tested types
}

impl Style {
    fn to_color_spec(self) -> ColorSpec {
        let mut s = ColorSpec::new();
        match self {
            Style::Punct => {
                s.set_dimmed(true);
            }
            Style::Keyword => {
                s.set_fg(Some(Color::Cyan)).set_bold(true);
            }
            Style::Literal => {
                s.set_fg(Some(Color::Yellow));
            }
            Style::Ident => {
                s.set_fg(Some(Color::Green)).set_bold(true);
            }
            Style::Type => {
                s.set_fg(Some(Color::Magenta));
            }
        }
        s
    }
}

fn styled<U: fmt::Display>(style: Style, s: U) -> RcDoc<'static, Style> {
    RcDoc::as_string(s).annotate(style)
}

fn punct(s: &'static str) -> RcDoc<'static, Style> {
    styled(Style::Punct, s)
}

fn kw(s: &'static str) -> RcDoc<'static, Style> {
    styled(Style::Keyword, s)
}

fn ident(s: &str) -> RcDoc<'static, Style> {
    styled(Style::Ident, s)
}

fn or_doc(or: &OrPattern) -> RcDoc<'static, Style> {
    let mut arms = Vec::with_capacity(or.cases.len() + 2);
    for case in &or.cases {
        arms.push(kw("case").append(RcDoc::space()).append(to_doc(case)));
    }
    if let Some(case) = &or.null_case {
        arms.push(kw("null").append(RcDoc::space()).append(to_doc(case)));
    }
    if let Some(case) = &or.default_case {
        arms.push(kw("default").append(RcDoc::space()).append(to_doc(case)));
    }

    kw("switch")
        .append(RcDoc::space())
        .append(punct("{"))
        .append(
            RcDoc::hardline()
                .append(RcDoc::intersperse(arms, RcDoc::hardline()))
                .nest(2),
        )
        .append(RcDoc::hardline())
        .append(punct("}"))
}

fn to_doc(pattern: &Pattern) -> RcDoc<'static, Style> {
    match pattern {
        Pattern::Terminal(index) => punct("=>")
            .append(RcDoc::space())
            .append(styled(Style::Literal, index)),
        Pattern::Equal { value, next } => punct("==")
            .append(RcDoc::space())
            .append(styled(Style::Literal, format!("{value:?}")))
            .append(RcDoc::line())
            .append(to_doc(next))
            .group(),
        Pattern::TypeTest { ty, capture, next } => {
            let mut doc = kw("is")
                .append(RcDoc::space())
                .append(styled(Style::Type, ty.name()));
            if let Some(name) = capture {
                doc = doc
                    .append(RcDoc::space())
                    .append(punct("@"))
                    .append(RcDoc::space())
                    .append(ident(name));
            }
            doc.append(RcDoc::line()).append(to_doc(next)).group()
        }
        Pattern::Bind { bindings, next } => {
            let pairs = bindings.iter().map(|binding| {
                ident(&binding.source)
                    .append(RcDoc::space())
                    .append(punct("->"))
                    .append(RcDoc::space())
                    .append(ident(&binding.destination))
            });
            kw("bind")
                .append(RcDoc::space())
                .append(punct("{"))
                .append(RcDoc::space())
                .append(RcDoc::intersperse(pairs, punct(",").append(RcDoc::space())))
                .append(RcDoc::space())
                .append(punct("}"))
                .append(RcDoc::line())
                .append(to_doc(next))
                .group()
        }
        Pattern::Redirect { name, next } => kw("with")
            .append(RcDoc::space())
            .append(ident(name))
            .append(RcDoc::line())
            .append(to_doc(next))
            .group(),
        Pattern::Or(or) => or_doc(or),
    }
}

// A writer that maps Style annotations to termcolor ColorSpec on a WriteColor sink.
struct ColorWriter<'w, W: WriteColor + Write> {
    out: &'w mut W,
}

impl<'a, 'w, W: WriteColor + Write> RenderAnnotated<'a, Style> for ColorWriter<'w, W> {
    fn push_annotation(&mut self, ann: &'a Style) -> io::Result<()> {
        self.out.set_color(&ann.to_color_spec())
    }
    fn pop_annotation(&mut self) -> io::Result<()> {
        self.out.reset()
    }
}

impl<'w, W: WriteColor + Write> pretty::Render for ColorWriter<'w, W> {
    type Error = io::Error;
    fn write_str(&mut self, s: &str) -> io::Result<usize> {
        self.out.write_all(s.as_bytes())?;
        Ok(s.len())
    }
    fn write_str_all(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }
    fn fail_doc(&self) -> Self::Error {
        io::Error::other("render failed")
    }
}

impl Pattern {
    /// Annotated document for this pattern, for composing or rendering manually.
    pub fn pretty_doc(&self) -> RcDoc<'static, Style> {
        to_doc(self)
    }

    /// Render with colors to any termcolor writer at the given width.
    pub fn pretty_render_to<W: WriteColor + Write>(&self, width: usize, out: &mut W) -> io::Result<()> {
        let mut cw = ColorWriter { out };
        self.pretty_doc().render_raw(width, &mut cw)
    }

    /// Print to stdout with colors (TTY-aware), at the terminal width or 80.
    pub fn pretty_print(&self) -> io::Result<()> {
        let width = term_size::dimensions().map(|(w, _)| w).unwrap_or(80);
        let stdout = StandardStream::stdout(ColorChoice::Auto);
        let mut stdout = stdout.lock();
        self.pretty_render_to(width, &mut stdout)
    }

    /// Plain string rendering, 80 columns wide.
    pub fn pretty_string(&self) -> String {
        let mut buf = String::new();
        let _ = self.pretty_doc().render_fmt(80, &mut buf);
        buf
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut w = FmtWrite::new(f);
        self.pretty_doc().render_raw(80, &mut w)
    }
}
