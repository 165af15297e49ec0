/*!
Typed flag values shared by encore's commands.

Each of these implements `FromStr` with an `anyhow::Error`, so they can be
pulled out of the parser with `args::parse`.
*/

use {anyhow::Context, jiff::civil};

use crate::args::Usage;

/// A type describing "day of week" inputs.
#[derive(Clone, Copy, Debug)]
pub struct Weekday {
    weekday: civil::Weekday,
}

impl Weekday {
    /// Return the parsed weekday.
    pub fn get(&self) -> civil::Weekday {
        self.weekday
    }
}

impl std::str::FromStr for Weekday {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Weekday> {
        use jiff::civil::Weekday::*;

        let weekday = match &*s.to_ascii_lowercase() {
            "sunday" | "sun" | "su" => Sunday,
            "monday" | "mon" | "mo" => Monday,
            "tuesday" | "tues" | "tue" | "tu" => Tuesday,
            "wednesday" | "wed" | "we" => Wednesday,
            "thursday" | "thurs" | "thu" | "th" => Thursday,
            "friday" | "fri" | "fr" => Friday,
            "saturday" | "sat" | "sa" => Saturday,
            unk => anyhow::bail!("unrecognized weekday: `{unk}`"),
        };
        Ok(Weekday { weekday })
    }
}

/// A comma-separated list of weekdays, e.g., `mon,wed,fri`.
#[derive(Clone, Debug)]
pub struct Weekdays {
    days: Vec<civil::Weekday>,
}

impl Weekdays {
    pub const USAGE: Usage = Usage::flag(
        "-w/--week-day <weekday-list>",
        "Provide one or more days of the week for a weekly schedule.",
        r#"
Provide one or more days of the week for a weekly schedule.

Legal values are any day of the week (e.g., sun, mon, tue, wed, thu, fri,
sat). Multiple weekdays can be specified with repeated use of this flag, or
by separating values with a comma. For example, `mon,wed,fri`.

Only a weekly schedule consults this selection. A weekly schedule with no
selected days matches nothing.

A selected weekday that falls earlier in a week than the schedule's position
in that week is skipped, not rolled forward. In particular, a weekday earlier
in the week than the start date's weekday never occurs.
"#,
    );

    /// Return the parsed weekdays, in the order given.
    pub fn get(&self) -> &[civil::Weekday] {
        &self.days
    }
}

impl std::str::FromStr for Weekdays {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Weekdays> {
        let mut days = vec![];
        for part in s.split(',') {
            let weekday: Weekday = part.trim().parse()?;
            days.push(weekday.get());
        }
        Ok(Weekdays { days })
    }
}

/// A numbered weekday of the month, e.g., `2-tue` for the second Tuesday.
#[derive(Clone, Copy, Debug)]
pub struct NthWeekday {
    week: i8,
    weekday: civil::Weekday,
}

impl NthWeekday {
    pub const USAGE: Usage = Usage::flag(
        "-n/--nth <week>-<weekday>",
        "Pick the nth weekday of the month for a monthly schedule.",
        r#"
Pick the nth weekday of the month for a monthly schedule.

The value is a week number followed by a weekday, separated by a hyphen. For
example, `2-tue` corresponds to the second Tuesday of each month. Week
numbers must be in the range 1 through 4, which guarantees the selected day
exists in every month.

Only a monthly schedule consults this selection. The default is `1-sun`, the
first Sunday of each month.
"#,
    );

    /// Return the week number, in the range `1..=4` after rule validation.
    pub fn week(&self) -> i8 {
        self.week
    }

    /// Return the weekday.
    pub fn weekday(&self) -> civil::Weekday {
        self.weekday
    }
}

impl std::str::FromStr for NthWeekday {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<NthWeekday> {
        let Some((week, weekday)) = s.split_once('-') else {
            anyhow::bail!(
                "invalid nth weekday: `{s}` \
                 (expected `<week>-<weekday>`, e.g., `2-tue`)",
            );
        };
        let week = week.parse::<i8>().with_context(|| {
            format!("failed to parse `{week}` as a week number")
        })?;
        let weekday: Weekday = weekday.parse()?;
        Ok(NthWeekday { week, weekday: weekday.get() })
    }
}
