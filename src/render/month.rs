use super::{Align, Command, DrawOp, Half, Layer, Paint, Point, Rect, Surface};
use crate::annotations::Annotations;
use crate::calendar::{Cell, MonthGrid, MonthRef, WeekdayExt};
use crate::moon::MoonPhase;
use crate::style::{StyleConfig, CM};

static WEEKDAY_LABELS: [&str; 7] = ["Mo", "Tue", "We", "Th", "Fr", "Sat", "Sun"];

/// Horizontal nudge of every column, in centimeters
const COLUMN_SHIFT: f32 = -0.1;

const ROW_HEIGHT: f32 = 0.7 * CM;

/// Row 0 sits this many row heights above the base point
const TOP_ROW: f32 = 8.0;

/// Where a month grid goes on the page.  The grid's reference point is
/// `origin + offset`; layouts keep one origin per page and vary the offset per
/// month.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Placement {
    pub(crate) origin: Point,
    pub(crate) offset: Point,
}

impl Placement {
    pub(crate) fn new(origin: Point, offset: Point) -> Placement {
        Placement { origin, offset }
    }

    fn base(self) -> Point {
        self.origin + self.offset
    }
}

/// Draws one month grid with all enabled annotations onto `surface`
pub(crate) fn render_month<S: Surface>(
    surface: &mut S,
    month: MonthRef,
    placement: Placement,
    annotations: &Annotations,
    style: &StyleConfig,
) -> Result<(), S::Error> {
    for command in month_commands(month, placement, annotations, style) {
        surface.draw(command)?;
    }
    Ok(())
}

fn month_commands(
    month: MonthRef,
    placement: Placement,
    annotations: &Annotations,
    style: &StyleConfig,
) -> Vec<Command> {
    let grid = MonthGrid::new(month);
    let base = placement.base();
    let mut commands = frame(&grid, base, style);
    commands.extend(rows(&grid, base, annotations, style));
    if style.features.equinoxes {
        commands.extend(equinoxes(&grid, base, annotations, style));
    }
    if style.features.moon_phases {
        commands.extend(moon_phases(&grid, base, annotations, style));
    }
    if style.features.birthdays {
        commands.extend(birthdays(&grid, base, annotations, style));
    }
    commands.push(Command::new(
        Layer::Reset,
        DrawOp::SetFillColor(style.palette.normal_text),
    ));
    commands
}

fn column_x(base: Point, column: u8) -> f32 {
    base.x + (f32::from(column) + COLUMN_SHIFT) * CM
}

fn row_y(base: Point, row: u8) -> f32 {
    base.y + (TOP_ROW - f32::from(row)) * ROW_HEIGHT
}

fn cell_center(base: Point, cell: Cell) -> Point {
    Point::new(column_x(base, cell.weekday.index0()), row_y(base, cell.row))
}

/// Background, title and weekday headers
fn frame(grid: &MonthGrid, base: Point, style: &StyleConfig) -> Vec<Command> {
    let palette = &style.palette;
    let mut commands = vec![
        Command::new(
            Layer::Background,
            DrawOp::FillRect {
                rect: Rect::new(base.x - 1.5 * CM, base.y - 0.5 * CM, 8.0 * CM, 7.5 * CM),
                color: palette.background,
            },
        ),
        Command::new(
            Layer::Title,
            DrawOp::Text {
                text: grid.month().month().to_string(),
                at: base.offset(2.5 * CM, 7.0 * CM),
                align: Align::Center,
                font: style.title_font(),
                color: palette.normal_text,
            },
        ),
    ];
    let header_y = base.y + 10.0 + 6.0 * CM;
    commands.extend(std::iter::zip(0u8.., WEEKDAY_LABELS).map(|(column, label)| {
        Command::new(
            Layer::WeekdayHeader,
            DrawOp::Text {
                text: label.to_owned(),
                at: Point::new(column_x(base, column), header_y),
                align: Align::Center,
                font: style.day_font(),
                color: palette.normal_text,
            },
        )
    }));
    commands
}

/// Per row: cell backgrounds, then the week number, then the day numbers
fn rows(
    grid: &MonthGrid,
    base: Point,
    annotations: &Annotations,
    style: &StyleConfig,
) -> Vec<Command> {
    let month = grid.month().month();
    let scale = style.scale();
    let mut commands = Vec::new();
    for (row, week) in std::iter::zip(0u8.., grid.weeks()) {
        let cells = week
            .enumerate()
            .map(|(weekday, day)| Cell { row, weekday, day })
            .collect::<Vec<_>>();
        for &cell in &cells {
            let holiday = annotations.holidays.contains(month, cell.day);
            commands.push(Command::new(
                Layer::CellBackground,
                DrawOp::FillRect {
                    rect: Rect::centered(
                        cell_center(base, cell),
                        0.95 * CM * scale,
                        0.65 * CM * scale,
                    ),
                    color: style.cell_background(holiday, cell.weekday),
                },
            ));
        }
        if style.features.week_numbers {
            let at = Point::new(base.x - 1.6 * CM, row_y(base, row));
            commands.push(Command::new(
                Layer::WeekNumber,
                DrawOp::FillRect {
                    rect: Rect::new(at.x - 0.15 * CM, at.y - 0.15 * CM, 0.6 * CM, 0.45 * CM),
                    color: style.palette.week_number_background,
                },
            ));
            commands.push(Command::new(
                Layer::WeekNumber,
                DrawOp::Text {
                    text: week.iso_week().to_string(),
                    at,
                    align: Align::Left,
                    font: style.day_font(),
                    color: style.palette.week_number_text,
                },
            ));
        }
        for &cell in &cells {
            let holiday = annotations.holidays.contains(month, cell.day);
            commands.push(Command::new(
                Layer::DayNumber,
                DrawOp::Text {
                    text: cell.day.to_string(),
                    at: cell_center(base, cell),
                    align: Align::Center,
                    font: style.day_font(),
                    color: style.day_text_color(holiday, cell.weekday),
                },
            ));
        }
    }
    commands
}

fn equinoxes(
    grid: &MonthGrid,
    base: Point,
    annotations: &Annotations,
    style: &StyleConfig,
) -> Vec<Command> {
    let month = grid.month().month();
    grid.cells()
        .filter(|cell| annotations.astronomical.contains(month, cell.day))
        .map(|cell| {
            Command::new(
                Layer::Equinox,
                DrawOp::Circle {
                    center: cell_center(base, cell).offset(0.0, 0.15 * CM),
                    radius: 0.28 * CM * style.scale(),
                    color: style.palette.equinox_circle,
                    paint: Paint::Stroke(1.5),
                },
            )
        })
        .collect()
}

fn moon_phases(
    grid: &MonthGrid,
    base: Point,
    annotations: &Annotations,
    style: &StyleConfig,
) -> Vec<Command> {
    let month = grid.month().month();
    let color = style.palette.moon_symbol;
    let radius = style.moon_size / 2.8;
    let mut commands = Vec::new();
    for cell in grid.cells() {
        let Some(phase) = annotations.moon_phases.get(month, cell.day) else {
            continue;
        };
        let center = cell_center(base, cell).offset(0.48 * CM, 0.25 * CM);
        let paint = if phase == MoonPhase::New {
            Paint::FillStroke(1.0)
        } else {
            Paint::Stroke(1.0)
        };
        commands.push(Command::new(
            Layer::MoonPhase,
            DrawOp::Circle {
                center,
                radius,
                color,
                paint,
            },
        ));
        let half = match phase {
            MoonPhase::FirstQuarter => Half::Right,
            MoonPhase::LastQuarter => Half::Left,
            MoonPhase::New | MoonPhase::Full => continue,
        };
        commands.push(Command::new(
            Layer::MoonPhase,
            DrawOp::HalfDisc {
                center,
                radius,
                half,
                color,
            },
        ));
    }
    commands
}

fn birthdays(
    grid: &MonthGrid,
    base: Point,
    annotations: &Annotations,
    style: &StyleConfig,
) -> Vec<Command> {
    let month = grid.month().month();
    let side = 2.0 * 0.35 * CM * style.scale();
    grid.cells()
        .filter(|cell| annotations.birthdays.contains(month, cell.day))
        .map(|cell| {
            Command::new(
                Layer::Birthday,
                DrawOp::StrokeRect {
                    rect: Rect::centered(cell_center(base, cell), side, side),
                    color: style.palette.birthday_square,
                    width: 1.5,
                    dash: None,
                },
            )
        })
        .collect()
}
