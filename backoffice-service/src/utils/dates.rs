use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::{Postgres, QueryBuilder};

/// Half-open timestamp window `[from, until)` built from whole calendar days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayWindow {
    pub from: Option<NaiveDateTime>,
    pub until: Option<NaiveDateTime>,
}

fn start_of(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

fn start_of_next(day: NaiveDate) -> Option<NaiveDateTime> {
    day.succ_opt().map(start_of)
}

impl DayWindow {
    /// Each bound is inclusive of its whole day; either may be open.
    pub fn between(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self {
            from: from.map(start_of),
            until: to.and_then(start_of_next),
        }
    }

    /// Like [`DayWindow::between`], except a lone start date selects only that day.
    pub fn day_or_between(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        match (from, to) {
            (Some(day), None) => Self {
                from: Some(start_of(day)),
                until: start_of_next(day),
            },
            _ => Self::between(from, to),
        }
    }

    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.until.is_none()
    }

    /// Appends ` AND column >= $n` / ` AND column < $m` for the bounds that are set.
    pub fn push_conditions(&self, builder: &mut QueryBuilder<'_, Postgres>, column: &str) {
        if let Some(from) = self.from {
            builder.push(format!(" AND {} >= ", column)).push_bind(from);
        }
        if let Some(until) = self.until {
            builder.push(format!(" AND {} < ", column)).push_bind(until);
        }
    }
}
