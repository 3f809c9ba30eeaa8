use crate::annotations::AnnotationBook;
use crate::calendar::MonthRef;
use crate::render::{
    render_month, Align, Command, DrawOp, Layer, PageSize, Placement, Point, Rect, Surface,
};
use crate::style::{Font, Rgb, StyleConfig, CM};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which yearly PDFs to produce
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum Format {
    /// Four months per A4 portrait page, with cut guides
    Paged,
    /// All twelve months on one A4 landscape page
    Sheet,
    #[default]
    Both,
}

impl Format {
    pub(crate) fn paged(self) -> bool {
        matches!(self, Format::Paged | Format::Both)
    }

    pub(crate) fn sheet(self) -> bool {
        matches!(self, Format::Sheet | Format::Both)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Format::Paged => "paged",
            Format::Sheet => "sheet",
            Format::Both => "both",
        };
        f.write_str(s)
    }
}

impl FromStr for Format {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Format, ParseFormatError> {
        match s {
            "paged" => Ok(Format::Paged),
            "sheet" => Ok(Format::Sheet),
            "both" => Ok(Format::Both),
            _ => Err(ParseFormatError(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("invalid format {0:?}; expected \"paged\", \"sheet\", or \"both\"")]
pub(crate) struct ParseFormatError(String);

pub(crate) fn paged_file_name(year: i32) -> String {
    format!("calendar_{year}_office.pdf")
}

pub(crate) fn sheet_file_name(year: i32) -> String {
    format!("calendar_{year}_full.pdf")
}

pub(crate) const STRIP_FILE_STEM: &str = "calendar_strip";

const MONTHS_PER_PAGE: usize = 4;

/// Month offsets within a paged page: left column top and bottom, then right
/// column top and bottom
const PAGED_OFFSETS: [Point; MONTHS_PER_PAGE] = [
    Point::new(0.0, 5.7 * CM),
    Point::new(0.0, 0.0),
    Point::new(10.0 * CM, 5.7 * CM),
    Point::new(10.0 * CM, 0.0),
];

const YEAR_TITLE_SIZE: f32 = 18.0;

/// Offset of every month on the sheet, in points
const SHEET_OFFSET: Point = Point::new(13.0, 12.0);

const SHEET_COLUMNS: [f32; 3] = [2.0 * CM, 12.0 * CM, 22.0 * CM];

/// Lays the months of `january`'s year out four to an A4 portrait page, with
/// a pair of dashed cut guides per page
pub(crate) fn paged<S: Surface>(
    surface: &mut S,
    january: MonthRef,
    book: &mut AnnotationBook,
    style: &StyleConfig,
) -> Result<(), S::Error> {
    let size = PageSize::A4;
    let origin = Point::new(
        (size.width - 16.5 * CM) / 2.0,
        (size.height - 1.0 * CM) / 2.0,
    );
    let months = january.rest_of_year().collect::<Vec<_>>();
    for chunk in months.chunks(MONTHS_PER_PAGE) {
        surface.begin_page(size)?;
        for (&month, offset) in std::iter::zip(chunk, PAGED_OFFSETS) {
            render_month(
                surface,
                month,
                Placement::new(origin, offset),
                book.for_year(month.year()),
                style,
            )?;
        }
        for x in [origin.x - 2.0 * CM, origin.x + 8.0 * CM] {
            surface.draw(Command::new(
                Layer::CutGuide,
                DrawOp::StrokeRect {
                    rect: Rect::new(x, origin.y + 0.7 * CM, 10.0 * CM, 13.0 * CM),
                    color: Rgb::GRAY,
                    width: 0.5,
                    dash: Some(3.0),
                },
            ))?;
        }
    }
    Ok(())
}

/// Lays all months of `january`'s year out on a single A4 landscape page in a
/// 3-column, 4-row grid under a year title
pub(crate) fn sheet<S: Surface>(
    surface: &mut S,
    january: MonthRef,
    book: &mut AnnotationBook,
    style: &StyleConfig,
) -> Result<(), S::Error> {
    let size = PageSize::A4.landscape();
    surface.begin_page(size)?;
    surface.draw(Command::new(
        Layer::Title,
        DrawOp::Text {
            text: january.year().to_string(),
            at: Point::new(size.width / 2.0, size.height - 0.5 * CM),
            align: Align::Center,
            font: Font {
                face: style.face(),
                size: YEAR_TITLE_SIZE,
            },
            color: style.palette.normal_text,
        },
    ))?;
    let mut row_y = size.height - 8.5 * CM;
    let months = january.rest_of_year().collect::<Vec<_>>();
    for row in months.chunks(SHEET_COLUMNS.len()) {
        for (&month, x) in std::iter::zip(row, SHEET_COLUMNS) {
            render_month(
                surface,
                month,
                Placement::new(Point::new(x, row_y), SHEET_OFFSET),
                book.for_year(month.year()),
                style,
            )?;
        }
        row_y -= 5.0 * CM;
    }
    Ok(())
}

/// Dimensions of the widget strip, in points
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StripGeometry {
    pub(crate) months: u8,
    pub(crate) page_width: f32,
    pub(crate) month_height: f32,
    pub(crate) top_margin: f32,
    /// Horizontal position of every month
    pub(crate) x: f32,
    /// Upward shift of every month within its band
    pub(crate) y_nudge: f32,
}

impl Default for StripGeometry {
    fn default() -> StripGeometry {
        StripGeometry {
            months: 6,
            page_width: 8.0 * CM,
            month_height: 5.5 * CM,
            top_margin: 0.8 * CM,
            x: 0.3 * CM,
            y_nudge: 0.5 * CM,
        }
    }
}

impl StripGeometry {
    pub(crate) fn page_size(&self) -> PageSize {
        PageSize {
            width: self.page_width,
            height: f32::from(self.months) * self.month_height + self.top_margin,
        }
    }
}

/// Stacks `geometry.months` consecutive months starting at `start` in a single
/// column on one page.  The window continues into the following year when it
/// runs past December.
pub(crate) fn strip<S: Surface>(
    surface: &mut S,
    start: MonthRef,
    geometry: &StripGeometry,
    book: &mut AnnotationBook,
    style: &StyleConfig,
) -> Result<(), S::Error> {
    let size = geometry.page_size();
    surface.begin_page(size)?;
    let mut band_top = size.height - geometry.top_margin;
    for month in start.iter_forwards().take(usize::from(geometry.months)) {
        band_top -= geometry.month_height;
        render_month(
            surface,
            month,
            Placement::new(
                Point::new(geometry.x, band_top + geometry.y_nudge),
                Point::default(),
            ),
            book.for_year(month.year()),
            style,
        )?;
    }
    Ok(())
}
