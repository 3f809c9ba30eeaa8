mod metrics;
mod month;
mod pdf;
pub(crate) use self::metrics::text_width;
pub(crate) use self::month::{render_month, Placement};
pub(crate) use self::pdf::PdfSurface;
use crate::style::{Font, Rgb, CM};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Point {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl Point {
    pub(crate) const fn new(x: f32, y: f32) -> Point {
        Point { x, y }
    }

    pub(crate) fn offset(self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        self.offset(rhs.x, rhs.y)
    }
}

/// An axis-aligned rectangle in PDF user space, anchored at its lower-left
/// corner
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Rect {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl Rect {
    pub(crate) const fn new(x: f32, y: f32, width: f32, height: f32) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub(crate) fn centered(center: Point, width: f32, height: f32) -> Rect {
        Rect::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            width,
            height,
        )
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Align {
    /// Text starts at the anchor point
    Left,
    /// Text is horizontally centered on the anchor point
    Center,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Half {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Paint {
    Stroke(f32),
    FillStroke(f32),
}

/// A single drawing primitive
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DrawOp {
    FillRect {
        rect: Rect,
        color: Rgb,
    },
    StrokeRect {
        rect: Rect,
        color: Rgb,
        width: f32,
        dash: Option<f32>,
    },
    Text {
        text: String,
        at: Point,
        align: Align,
        font: Font,
        color: Rgb,
    },
    Circle {
        center: Point,
        radius: f32,
        color: Rgb,
        paint: Paint,
    },
    HalfDisc {
        center: Point,
        radius: f32,
        half: Half,
        color: Rgb,
    },
    SetFillColor(Rgb),
}

/// What part of the calendar a drawing command belongs to
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Layer {
    Background,
    Title,
    WeekdayHeader,
    CellBackground,
    WeekNumber,
    DayNumber,
    Equinox,
    MoonPhase,
    Birthday,
    CutGuide,
    Reset,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Command {
    pub(crate) layer: Layer,
    pub(crate) op: DrawOp,
}

impl Command {
    pub(crate) fn new(layer: Layer, op: DrawOp) -> Command {
        Command { layer, op }
    }
}

/// Page dimensions in points
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PageSize {
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl PageSize {
    pub(crate) const A4: PageSize = PageSize {
        width: 21.0 * CM,
        height: 29.7 * CM,
    };

    pub(crate) fn landscape(self) -> PageSize {
        PageSize {
            width: self.height.max(self.width),
            height: self.height.min(self.width),
        }
    }
}

/// A drawing target that accepts pages of drawing commands
pub(crate) trait Surface {
    type Error;

    /// Starts a new page; all following commands are drawn onto it.
    fn begin_page(&mut self, size: PageSize) -> Result<(), Self::Error>;

    fn draw(&mut self, command: Command) -> Result<(), Self::Error>;
}

/// A surface that only records what is drawn on it
#[cfg(test)]
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct DisplayList {
    pub(crate) pages: Vec<(PageSize, Vec<Command>)>,
}

#[cfg(test)]
impl DisplayList {
    pub(crate) fn commands(&self) -> impl Iterator<Item = &Command> {
        self.pages.iter().flat_map(|(_, cmds)| cmds)
    }

    pub(crate) fn count(&self, layer: Layer) -> usize {
        self.commands().filter(|c| c.layer == layer).count()
    }

    pub(crate) fn texts(&self, layer: Layer) -> Vec<&str> {
        self.commands()
            .filter(|c| c.layer == layer)
            .filter_map(|c| match &c.op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl Surface for DisplayList {
    type Error = std::convert::Infallible;

    fn begin_page(&mut self, size: PageSize) -> Result<(), Self::Error> {
        self.pages.push((size, Vec::new()));
        Ok(())
    }

    fn draw(&mut self, command: Command) -> Result<(), Self::Error> {
        match self.pages.last_mut() {
            Some((_, cmds)) => cmds.push(command),
            None => self.pages.push((PageSize::A4, vec![command])),
        }
        Ok(())
    }
}
