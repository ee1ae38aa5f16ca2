//! Parsing of SVG path data strings into an [`SvgPath`] command stream.
//!
//! # Syntax
//!
//! The accepted syntax is the SVG path data syntax: single ASCII command
//! letters (uppercase absolute, lowercase relative) followed by their
//! operands. Repeated operands after a command are implicit repetitions of
//! that command, with one exception: implicit operands after `M`/`m` are
//! line-to's of the same case.

use crate::{Positioning, SvgCommand, SvgPath};
use nib_geom::arrayvec::ArrayString;

use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ParseError {
    #[error("Line {line} Column {column}: Expected number, got {src:?}.")]
    ExpectedNumber { src: String, line: i32, column: i32 },
    #[error("Line {line} Column {column}: Invalid number {src:?}.")]
    InvalidNumber { src: String, line: i32, column: i32 },
    #[error("Line {line} Column {column}: Expected flag (0/1), got {src:?}.")]
    ExpectedFlag { src: char, line: i32, column: i32 },
    #[error("Line {line} Column {column}: Invalid command {command:?}.")]
    InvalidCommand {
        command: char,
        line: i32,
        column: i32,
    },
    #[error("Line {line} Column {column}: Unsupported command {command:?}.")]
    UnsupportedCommand {
        command: char,
        line: i32,
        column: i32,
    },
    #[error("Unexpected end of path data.")]
    UnexpectedEnd,
    #[error("Too many commands in one path.")]
    TooManyCommands,
    #[error("Malformed attribute {name:?}.")]
    MalformedAttribute { name: String },
}

/// Parse `src`, replacing the previous content of `path`.
pub fn parse(path: &mut SvgPath, src: &str) -> Result<(), ParseError> {
    path.clear();
    append_path(path, src)
}

/// Parse `src`, appending to the commands already in `path`.
pub fn append_path(path: &mut SvgPath, src: &str) -> Result<(), ParseError> {
    let mut src = Source::new(src);
    parse_source(path, &mut src)
}

// A buffered iterator of characters keeping track of line and column.
pub(crate) struct Source<'l> {
    src: core::str::Chars<'l>,
    current: char,
    line: i32,
    col: i32,
    finished: bool,
}

impl<'l> Source<'l> {
    pub(crate) fn new(text: &'l str) -> Self {
        let mut src = text.chars();

        let (current, finished) = match src.next() {
            Some(c) => (c, false),
            None => (' ', true),
        };

        let line = if current == '\n' { 1 } else { 0 };

        Source {
            src,
            current,
            line,
            col: 0,
            finished,
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.finished && (self.current.is_whitespace() || self.current == ',') {
            self.advance_one();
        }
    }

    fn advance_one(&mut self) {
        if self.finished {
            return;
        }
        match self.src.next() {
            Some('\n') => {
                self.current = '\n';
                self.line += 1;
                self.col = -1;
            }
            Some(c) => {
                self.current = c;
                self.col += 1;
            }
            None => {
                self.current = '~';
                self.finished = true;
            }
        }
    }
}

pub(crate) fn parse_source(path: &mut SvgPath, src: &mut Source) -> Result<(), ParseError> {
    // Implicit operands at the very start of a path are treated as an
    // absolute move-to, and a leading relative move-to is relative to the
    // origin, so both cases behave as absolute coordinates.
    let mut implicit_cmd = 'M';

    src.skip_whitespace();

    while !src.finished {
        let mut cmd = src.current;
        let cmd_line = src.line;
        let cmd_col = src.col;

        if cmd.is_ascii_alphabetic() {
            src.advance_one();
        } else {
            cmd = implicit_cmd;
        }

        let positioning = if cmd.is_lowercase() {
            Positioning::Relative
        } else {
            Positioning::Absolute
        };

        match cmd {
            'm' | 'M' => {
                let x = parse_number(src)?;
                let y = parse_number(src)?;
                path.push(SvgCommand::MoveTo(positioning), &[x, y])?;
            }
            'l' | 'L' => {
                let x = parse_number(src)?;
                let y = parse_number(src)?;
                path.push(SvgCommand::LineTo(positioning), &[x, y])?;
            }
            'h' | 'H' => {
                let x = parse_number(src)?;
                path.push(SvgCommand::HorizontalLineTo(positioning), &[x])?;
            }
            'v' | 'V' => {
                let y = parse_number(src)?;
                path.push(SvgCommand::VerticalLineTo(positioning), &[y])?;
            }
            'c' | 'C' => {
                let x1 = parse_number(src)?;
                let y1 = parse_number(src)?;
                let x2 = parse_number(src)?;
                let y2 = parse_number(src)?;
                let x = parse_number(src)?;
                let y = parse_number(src)?;
                path.push(SvgCommand::CubicTo(positioning), &[x1, y1, x2, y2, x, y])?;
            }
            's' | 'S' => {
                let x2 = parse_number(src)?;
                let y2 = parse_number(src)?;
                let x = parse_number(src)?;
                let y = parse_number(src)?;
                path.push(SvgCommand::SmoothCubicTo(positioning), &[x2, y2, x, y])?;
            }
            'q' | 'Q' => {
                let x1 = parse_number(src)?;
                let y1 = parse_number(src)?;
                let x = parse_number(src)?;
                let y = parse_number(src)?;
                path.push(SvgCommand::QuadraticTo(positioning), &[x1, y1, x, y])?;
            }
            't' | 'T' => {
                let x = parse_number(src)?;
                let y = parse_number(src)?;
                path.push(SvgCommand::SmoothQuadraticTo(positioning), &[x, y])?;
            }
            'a' | 'A' => {
                let rx = parse_number(src)?;
                let ry = parse_number(src)?;
                let x_rotation = parse_number(src)?;
                let large_arc = parse_flag(src)?;
                let sweep = parse_flag(src)?;
                let x = parse_number(src)?;
                let y = parse_number(src)?;
                path.push(
                    SvgCommand::ArcTo(positioning),
                    &[rx, ry, x_rotation, large_arc, sweep, x, y],
                )?;
            }
            'z' | 'Z' => {
                path.push(SvgCommand::Close, &[])?;
            }
            // Bearing commands from the SVG 2 draft are recognized but not
            // implemented.
            'b' | 'B' => {
                return Err(ParseError::UnsupportedCommand {
                    command: cmd,
                    line: cmd_line,
                    column: cmd_col,
                });
            }
            _ => {
                return Err(ParseError::InvalidCommand {
                    command: cmd,
                    line: cmd_line,
                    column: cmd_col,
                });
            }
        }

        implicit_cmd = match cmd {
            'm' => 'l',
            'M' => 'L',
            'z' => 'm',
            'Z' => 'M',
            c => c,
        };

        src.skip_whitespace();
    }

    Ok(())
}

fn parse_number(src: &mut Source) -> Result<f32, ParseError> {
    src.skip_whitespace();

    if src.finished {
        return Err(ParseError::UnexpectedEnd);
    }

    let line = src.line;
    let column = src.col;

    let mut buffer = ArrayString::<64>::new();
    let mut has_digits = false;

    if src.current == '-' || src.current == '+' {
        push_char(&mut buffer, src.current, line, column)?;
        src.advance_one();
    }

    while src.current.is_ascii_digit() && !src.finished {
        has_digits = true;
        push_char(&mut buffer, src.current, line, column)?;
        src.advance_one();
    }

    if src.current == '.' && !src.finished {
        push_char(&mut buffer, '.', line, column)?;
        src.advance_one();

        while src.current.is_ascii_digit() && !src.finished {
            has_digits = true;
            push_char(&mut buffer, src.current, line, column)?;
            src.advance_one();
        }
    }

    if (src.current == 'e' || src.current == 'E') && !src.finished {
        push_char(&mut buffer, src.current, line, column)?;
        src.advance_one();

        if src.current == '-' || src.current == '+' {
            push_char(&mut buffer, src.current, line, column)?;
            src.advance_one();
        }

        while src.current.is_ascii_digit() && !src.finished {
            push_char(&mut buffer, src.current, line, column)?;
            src.advance_one();
        }
    }

    if !has_digits {
        return Err(ParseError::ExpectedNumber {
            src: buffer.as_str().to_string(),
            line,
            column,
        });
    }

    match buffer.parse::<f32>() {
        Ok(value) => Ok(value),
        Err(_) => Err(ParseError::InvalidNumber {
            src: buffer.as_str().to_string(),
            line,
            column,
        }),
    }
}

fn push_char(
    buffer: &mut ArrayString<64>,
    c: char,
    line: i32,
    column: i32,
) -> Result<(), ParseError> {
    buffer.try_push(c).map_err(|_| ParseError::InvalidNumber {
        src: buffer.as_str().to_string(),
        line,
        column,
    })
}

fn parse_flag(src: &mut Source) -> Result<f32, ParseError> {
    src.skip_whitespace();
    match src.current {
        '1' => {
            src.advance_one();
            Ok(1.0)
        }
        '0' => {
            src.advance_one();
            Ok(0.0)
        }
        _ => Err(ParseError::ExpectedFlag {
            src: src.current,
            line: src.line,
            column: src.col,
        }),
    }
}
