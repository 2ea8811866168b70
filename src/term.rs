use std::convert::TryFrom;
use std::io::{stdout, Stdout, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::event::{poll, read, Event};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use log::warn;

use crate::config::{Config, Rgb};
use crate::geometry::PixelRect;
use crate::input::{EventSource, InputEvent};
use crate::render::Surface;
use crate::TermInt;

// A grid cell is two columns wide so it looks square in a terminal font.
const COLUMNS_PER_CELL: u32 = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Glyph {
    fn blank(color: Rgb) -> Self {
        Glyph { ch: ' ', fg: color, bg: color }
    }
}

/// Off-screen buffer of terminal cells, addressed in pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    cols: TermInt,
    rows: TermInt,
    cell_size: u32,
    glyphs: Vec<Glyph>,
}

impl Frame {
    pub fn new(cols: TermInt, rows: TermInt, cell_size: u32) -> Self {
        let glyphs = vec![Glyph::blank(Rgb(0, 0, 0)); cols as usize * rows as usize];
        Frame { cols, rows, cell_size, glyphs }
    }

    /// Terminal size needed to show the whole screen of `config`.
    pub fn size_for(config: &Config) -> Result<(TermInt, TermInt)> {
        let cols = config.screen_width / config.cell_size * COLUMNS_PER_CELL;
        let rows = config.screen_height / config.cell_size;
        let cols = TermInt::try_from(cols).with_context(|| format!("Board needs {} columns, more than a terminal can have", cols))?;
        let rows = TermInt::try_from(rows).with_context(|| format!("Board needs {} rows, more than a terminal can have", rows))?;
        Ok((cols, rows))
    }

    /// Cells whose glyph differs from `previous`, as `(col, row, glyph)`.
    pub fn diff<'a>(&'a self, previous: &'a Frame) -> impl Iterator<Item = (TermInt, TermInt, Glyph)> + 'a {
        let cols = self.cols;
        self.glyphs.iter().zip(previous.glyphs.iter()).enumerate()
            .filter(|(_, (now, before))| now != before)
            .map(move |(i, (now, _))| ((i % cols as usize) as TermInt, (i / cols as usize) as TermInt, *now))
    }

    pub fn cells(&self) -> impl Iterator<Item = (TermInt, TermInt, Glyph)> + '_ {
        let cols = self.cols;
        self.glyphs.iter().enumerate()
            .map(move |(i, g)| ((i % cols as usize) as TermInt, (i / cols as usize) as TermInt, *g))
    }

    ///////////////////////////////////////////////////////////////////////////

    fn index(&self, col: TermInt, row: TermInt) -> usize {
        self.cols as usize * row as usize + col as usize
    }

    // Half-open column and row ranges covered by `rect`, clipped to the frame.
    fn span(&self, rect: PixelRect) -> Option<((TermInt, TermInt), (TermInt, TermInt))> {
        let to_col = |px: u32| (px * COLUMNS_PER_CELL / self.cell_size).min(self.cols as u32) as TermInt;
        let to_row = |px: u32| (px / self.cell_size).min(self.rows as u32) as TermInt;

        let cols = (to_col(rect.x), to_col(rect.x + rect.width));
        let rows = (to_row(rect.y), to_row(rect.y + rect.height));

        if cols.0 >= cols.1 || rows.0 >= rows.1 {
            None
        } else {
            Some((cols, rows))
        }
    }

    fn put(&mut self, col: TermInt, row: TermInt, glyph: Glyph) {
        let i = self.index(col, row);
        self.glyphs[i] = glyph;
    }
}

impl Surface for Frame {
    fn fill(&mut self, color: Rgb) {
        for g in self.glyphs.iter_mut() {
            *g = Glyph::blank(color);
        }
    }

    fn fill_rect(&mut self, rect: PixelRect, fill: Rgb, outline: Rgb) {
        let ((x0, x1), (y0, y1)) = match self.span(rect) {
            Some(span) => span,
            None => return,
        };

        for y in y0..y1 {
            for x in x0..x1 {
                let ch = if x == x0 {'['} else if x == x1 - 1 {']'} else {' '};
                self.put(x, y, Glyph { ch, fg: outline, bg: fill });
            }
        }
    }

    fn stroke_rect(&mut self, rect: PixelRect, color: Rgb) {
        let ((x0, x1), (y0, y1)) = match self.span(rect) {
            Some(span) => span,
            None => return,
        };
        let (end_x, end_y) = (x1 - 1, y1 - 1);

        for y in y0..y1 {
            for x in x0..x1 {
                let on_x_edge = x == x0 || x == end_x;
                let on_y_edge = y == y0 || y == end_y;
                let ch = match (on_x_edge, on_y_edge) {
                    (true, true) => '+',
                    (false, true) => '-',
                    (true, false) => '|',
                    (false, false) => continue,
                };
                let bg = self.glyphs[self.index(x, y)].bg;
                self.put(x, y, Glyph { ch, fg: color, bg });
            }
        }
    }

    fn present(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Owns the terminal for as long as it lives: alternate screen, raw mode and
/// hidden cursor are set up on `open` and undone on drop.
pub struct TermManager {
    stdout: Stdout,
    back: Frame,
    front: Frame,
    drawn: bool,
}

impl TermManager {
    pub fn open(config: &Config) -> Result<Self> {
        let (cols, rows) = Frame::size_for(config)?;
        let (width, height) = terminal::size().context("Error reading terminal size")?;
        if width < cols || height < rows {
            bail!("Terminal is {}x{}, the board needs at least {}x{}", width, height, cols, rows);
        }

        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen).context("Error entering alt screen")?;
        let mut term = TermManager {
            stdout,
            back: Frame::new(cols, rows, config.cell_size),
            front: Frame::new(cols, rows, config.cell_size),
            drawn: false,
        };

        // From here on, dropping `term` restores whatever was already changed
        terminal::enable_raw_mode().context("Error setting raw mode")?;
        execute!(term.stdout, cursor::Hide, cursor::DisableBlinking, terminal::Clear(ClearType::All))
            .context("Error hiding cursor")?;
        Ok(term)
    }

    fn restore(&mut self) -> Result<()> {
        leave(&mut self.stdout, terminal::disable_raw_mode)
    }
}

// Undoes `TermManager::open`. Every step runs even if an earlier one failed; the first error is kept.
fn leave<W: Write>(out: &mut W, disable_raw_mode: impl FnOnce() -> crossterm::Result<()>) -> Result<()> {
    let raw = disable_raw_mode().context("Error unsetting raw mode");
    let screen = execute!(out, style::ResetColor, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
        .context("Error leaving alt screen");
    raw.and(screen)
}

impl Drop for TermManager {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!("Could not restore terminal: {:#}", e);
        }
    }
}

impl Surface for TermManager {
    fn fill(&mut self, color: Rgb) {
        self.back.fill(color);
    }

    fn fill_rect(&mut self, rect: PixelRect, fill: Rgb, outline: Rgb) {
        self.back.fill_rect(rect, fill, outline);
    }

    fn stroke_rect(&mut self, rect: PixelRect, color: Rgb) {
        self.back.stroke_rect(rect, color);
    }

    fn present(&mut self) -> Result<()> {
        let changes: Vec<_> = if self.drawn {
            self.back.diff(&self.front).collect()
        } else {
            self.back.cells().collect()
        };

        for (col, row, glyph) in changes {
            queue!(
                self.stdout,
                cursor::MoveTo(col, row),
                style::SetForegroundColor(glyph.fg.into()),
                style::SetBackgroundColor(glyph.bg.into()),
                style::Print(glyph.ch)
            ).context("Error drawing frame")?;
        }

        self.stdout.flush().context("Error flushing")?;
        self.front.clone_from(&self.back);
        self.drawn = true;
        Ok(())
    }
}

impl EventSource for TermManager {
    fn poll_events(&mut self) -> Result<Vec<InputEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(0)).context("Error polling input")? {
            if let Event::Key(ev) = read().context("Error reading input")? {
                events.extend(InputEvent::from_key(&ev));
            }
        }

        Ok(events)
    }
}

impl From<Rgb> for style::Color {
    fn from(c: Rgb) -> Self {
        style::Color::Rgb { r: c.0, g: c.1, b: c.2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    const BG: Rgb = Rgb(0, 0, 0);
    const BORDER: Rgb = Rgb(1, 1, 1);
    const FILL: Rgb = Rgb(2, 2, 2);

    fn frame() -> Frame {
        // 4x3 grid of 20px cells
        let mut frame = Frame::new(8, 3, 20);
        frame.fill(BG);
        frame
    }

    fn glyph(frame: &Frame, col: TermInt, row: TermInt) -> Glyph {
        frame.glyphs[frame.index(col, row)]
    }

    fn row_text(frame: &Frame, row: TermInt) -> String {
        (0..8).map(|col| glyph(frame, col, row).ch).collect()
    }

    #[test]
    fn size_for_default_config() {
        assert_eq!(Frame::size_for(&Config::default()).unwrap(), (64, 24));
    }

    #[test]
    fn size_for_rejects_boards_wider_than_a_terminal() {
        // 40000 cells fit a GridInt, but not at two columns each
        let config = Config { screen_width: 40_000, screen_height: 20, cell_size: 1, ..Config::default() };
        assert!(config.validate().is_ok());

        let err = Frame::size_for(&config).unwrap_err();
        assert!(err.to_string().contains("80000 columns"));
    }

    #[test]
    fn leaving_still_restores_screen_when_raw_mode_fails() {
        let mut out: Vec<u8> = vec![];
        let res = leave(&mut out, || Err(io::Error::new(io::ErrorKind::Other, "no tty").into()));

        let err = res.unwrap_err();
        assert!(err.to_string().contains("raw mode"));

        let written = String::from_utf8_lossy(&out);
        assert!(written.contains("\x1b[?25h"), "cursor not shown: {:?}", written);
        assert!(written.contains("\x1b[?1049l"), "alt screen not left: {:?}", written);
    }

    #[test]
    fn leaving_succeeds_when_every_step_does() {
        let mut out: Vec<u8> = vec![];
        assert!(leave(&mut out, || Ok(())).is_ok());
        assert!(!out.is_empty());
    }

    #[test]
    fn cell_rect_becomes_bracket_pair() {
        let mut frame = frame();
        frame.fill_rect(PixelRect::new(20, 20, 20, 20), FILL, BORDER);

        assert_eq!(row_text(&frame, 1), "  []    ");
        assert_eq!(glyph(&frame, 2, 1), Glyph { ch: '[', fg: BORDER, bg: FILL });
        assert_eq!(glyph(&frame, 3, 1), Glyph { ch: ']', fg: BORDER, bg: FILL });
        assert_eq!(glyph(&frame, 2, 0), Glyph::blank(BG));
    }

    #[test]
    fn stroke_outlines_whole_screen() {
        let mut frame = frame();
        frame.stroke_rect(PixelRect::new(0, 0, 80, 60), BORDER);

        assert_eq!(row_text(&frame, 0), "+------+");
        assert_eq!(row_text(&frame, 1), "|      |");
        assert_eq!(row_text(&frame, 2), "+------+");
        assert_eq!(glyph(&frame, 0, 1).bg, BG);
    }

    #[test]
    fn rects_are_clipped() {
        let mut frame = frame();
        frame.fill_rect(PixelRect::new(60, 40, 40, 40), FILL, BORDER);
        assert_eq!(row_text(&frame, 2), "      []");
        frame.fill_rect(PixelRect::new(200, 0, 20, 20), FILL, BORDER);
        assert_eq!(row_text(&frame, 0), "        ");
    }

    #[test]
    fn diff_reports_only_changed_cells() {
        let before = frame();
        let mut after = before.clone();
        after.fill_rect(PixelRect::new(0, 40, 20, 20), FILL, BORDER);

        let changes: Vec<_> = after.diff(&before).collect();
        assert_eq!(changes, vec![
            (0, 2, Glyph { ch: '[', fg: BORDER, bg: FILL }),
            (1, 2, Glyph { ch: ']', fg: BORDER, bg: FILL }),
        ]);
        assert_eq!(after.diff(&after).count(), 0);
    }
}
