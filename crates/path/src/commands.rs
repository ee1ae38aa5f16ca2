//! The parsed command stream: commands in one array, packed `f32` operands
//! in another.

use crate::parser::ParseError;
use nib_geom::limits::MAX_PATH_COMMANDS;

/// Whether a command's operands are absolute coordinates or offsets from
/// the current position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Positioning {
    Absolute,
    Relative,
}

impl Positioning {
    #[inline]
    pub fn is_relative(self) -> bool {
        self == Positioning::Relative
    }
}

/// One SVG path command.
///
/// Operands live in the owning [`SvgPath`]'s packed data array; arc flags
/// are packed as `0.0` / `1.0` alongside the other operands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum SvgCommand {
    /// `M`/`m`: 2 operands (x, y).
    MoveTo(Positioning),
    /// `L`/`l`: 2 operands (x, y).
    LineTo(Positioning),
    /// `H`/`h`: 1 operand (x).
    HorizontalLineTo(Positioning),
    /// `V`/`v`: 1 operand (y).
    VerticalLineTo(Positioning),
    /// `C`/`c`: 6 operands (x1, y1, x2, y2, x, y).
    CubicTo(Positioning),
    /// `S`/`s`: 4 operands (x2, y2, x, y).
    SmoothCubicTo(Positioning),
    /// `Q`/`q`: 4 operands (x1, y1, x, y).
    QuadraticTo(Positioning),
    /// `T`/`t`: 2 operands (x, y).
    SmoothQuadraticTo(Positioning),
    /// `A`/`a`: 7 operands (rx, ry, x-rotation, large-arc, sweep, x, y).
    ArcTo(Positioning),
    /// `Z`/`z`: no operands.
    Close,
}

impl SvgCommand {
    /// How many packed operands the command consumes.
    pub fn num_operands(self) -> usize {
        match self {
            SvgCommand::MoveTo(_) => 2,
            SvgCommand::LineTo(_) => 2,
            SvgCommand::HorizontalLineTo(_) => 1,
            SvgCommand::VerticalLineTo(_) => 1,
            SvgCommand::CubicTo(_) => 6,
            SvgCommand::SmoothCubicTo(_) => 4,
            SvgCommand::QuadraticTo(_) => 4,
            SvgCommand::SmoothQuadraticTo(_) => 2,
            SvgCommand::ArcTo(_) => 7,
            SvgCommand::Close => 0,
        }
    }
}

/// A parsed path: parallel arrays of commands and packed operands.
///
/// The storage is allocated once up front and reused; [`crate::parser::parse`]
/// clears it, [`crate::parser::append_path`] accumulates into it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SvgPath {
    commands: Vec<SvgCommand>,
    data: Vec<f32>,
}

impl SvgPath {
    /// An empty path with its full capacity allocated up front.
    pub fn new() -> Self {
        SvgPath {
            commands: Vec::with_capacity(MAX_PATH_COMMANDS),
            // Arcs are the widest command at 7 operands; 4 per command is a
            // comfortable average for real icon sets.
            data: Vec::with_capacity(MAX_PATH_COMMANDS * 4),
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.data.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[SvgCommand] {
        &self.commands
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Iterate over commands paired with their operand slices.
    pub fn iter(&self) -> SvgPathIter<'_> {
        SvgPathIter {
            commands: self.commands.iter(),
            data: &self.data,
            offset: 0,
        }
    }

    pub(crate) fn push(
        &mut self,
        command: SvgCommand,
        operands: &[f32],
    ) -> Result<(), ParseError> {
        debug_assert_eq!(command.num_operands(), operands.len());

        if self.commands.len() >= MAX_PATH_COMMANDS {
            return Err(ParseError::TooManyCommands);
        }

        self.commands.push(command);
        self.data.extend_from_slice(operands);

        Ok(())
    }

    /// Number of commands currently stored.
    pub fn num_commands(&self) -> usize {
        self.commands.len()
    }

    /// Rewrite the command at `index` from a relative to an absolute
    /// move-to. Used when appending independent path elements so that a
    /// leading `m` cannot chain onto the previous element's endpoint.
    pub(crate) fn make_move_to_absolute(&mut self, index: usize) {
        if let Some(cmd @ SvgCommand::MoveTo(Positioning::Relative)) = self.commands.get_mut(index)
        {
            *cmd = SvgCommand::MoveTo(Positioning::Absolute);
        }
    }
}

/// Iterator over `(command, operands)` pairs of an [`SvgPath`].
pub struct SvgPathIter<'l> {
    commands: core::slice::Iter<'l, SvgCommand>,
    data: &'l [f32],
    offset: usize,
}

impl<'l> Iterator for SvgPathIter<'l> {
    type Item = (SvgCommand, &'l [f32]);

    fn next(&mut self) -> Option<Self::Item> {
        let command = *self.commands.next()?;
        let start = self.offset;
        self.offset += command.num_operands();

        Some((command, &self.data[start..self.offset]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iter_pairs_operands() {
        let mut path = SvgPath::new();
        path.push(SvgCommand::MoveTo(Positioning::Absolute), &[10.0, 20.0])
            .unwrap();
        path.push(SvgCommand::LineTo(Positioning::Relative), &[5.0, 5.0])
            .unwrap();
        path.push(SvgCommand::Close, &[]).unwrap();

        let mut iter = path.iter();
        assert_eq!(
            iter.next(),
            Some((
                SvgCommand::MoveTo(Positioning::Absolute),
                &[10.0f32, 20.0][..]
            ))
        );
        assert_eq!(
            iter.next(),
            Some((SvgCommand::LineTo(Positioning::Relative), &[5.0f32, 5.0][..]))
        );
        assert_eq!(iter.next(), Some((SvgCommand::Close, &[][..])));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn clear_allows_reuse() {
        let mut path = SvgPath::new();
        path.push(SvgCommand::MoveTo(Positioning::Absolute), &[1.0, 2.0])
            .unwrap();
        path.clear();
        assert!(path.is_empty());
        assert!(path.data().is_empty());
    }
}
