mod util;
mod widget;
mod window;
pub(crate) use self::util::{days_in_month, Cell, MonthGrid, MonthRef, WeekdayExt};
pub(crate) use self::widget::Calendar;
pub(crate) use self::window::MonthWindow;
