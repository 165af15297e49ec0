use {anyhow::Context, jiff::civil::Date};

use crate::{
    args::{self, Usage, flags},
    recur::{Frequency, Rule},
};

mod grid;
mod preview;

const USAGE: &'static str = "\
A command-line utility for previewing recurring date schedules.

USAGE:
    encore <command> ...

COMMANDS:
    grid     Render upcoming occurrences as a day-of-month grid
    preview  Print the dates a recurring schedule lands on
";

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let cmd = args::next_as_command(USAGE, p)?;
    match &*cmd {
        "grid" => grid::run(p),
        "preview" => preview::run(p),
        unk => anyhow::bail!("unrecognized command '{}'", unk),
    }
}

/// The positional arguments and flags shared by every command that builds a
/// recurrence rule.
///
/// Commands pass this to `args::configure` alongside their own config so
/// that the schedule vocabulary stays identical across commands.
#[derive(Debug, Default)]
struct RuleArgs {
    freq: Option<Frequency>,
    start: Option<Date>,
    until: Option<Date>,
    interval: Option<i32>,
    week_days: Vec<flags::Weekdays>,
    nth: Option<flags::NthWeekday>,
}

impl RuleArgs {
    const START: Usage = Usage::arg(
        "<start>",
        "The inclusive date the schedule begins on (defaults to today).",
        r#"
The inclusive date the schedule begins on, in `YYYY-MM-DD` form.

When absent, the schedule starts today. "Today" is determined from the
system time zone, or from the `ENCORE_TODAY` environment variable when it is
set.
"#,
    );

    const INTERVAL: Usage = Usage::flag(
        "-i/--interval <number>",
        "Sets the number of frequency units between occurrences.",
        r#"
Sets the number of frequency units between occurrences. For example, a
weekly schedule with an interval of 2 repeats every other week.

The default is 1. The value must be greater than or equal to 1.
"#,
    );

    const UNTIL: Usage = Usage::flag(
        "-u/--until <date>",
        "Repeat the schedule until this date (inclusive).",
        r#"
Repeat the schedule until this date (inclusive), in `YYYY-MM-DD` form.

When absent, the schedule is bounded to one year after its start date.
"#,
    );

    /// Builds the recurrence rule described by these arguments.
    fn rule(&self) -> anyhow::Result<Rule> {
        let freq = self.freq.context("missing required <frequency>")?;
        let start = self.start.unwrap_or_else(|| *crate::TODAY);
        let mut b = Rule::builder(freq, start);
        b.interval(self.interval.unwrap_or(1));
        for days in self.week_days.iter() {
            b.days(days.get().iter().copied());
        }
        if let Some(nth) = self.nth {
            b.nth_weekday(nth.week(), nth.weekday());
        }
        if let Some(until) = self.until {
            b.until(until);
        }
        b.build()
    }
}

impl args::Configurable for RuleArgs {
    fn configure(
        &mut self,
        p: &mut lexopt::Parser,
        arg: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        use lexopt::Arg::*;

        match *arg {
            Value(ref v) => {
                let Some(v) = v.to_str() else {
                    anyhow::bail!("{v:?} is not valid UTF-8");
                };
                if self.freq.is_none() {
                    self.freq = Some(v.parse()?);
                    return Ok(true);
                }
                if self.start.is_none() {
                    let date = v.parse().with_context(|| {
                        format!("failed to parse `{v}` as a start date")
                    })?;
                    self.start = Some(date);
                    return Ok(true);
                }
                return Ok(false);
            }
            Short('u') | Long("until") => {
                self.until = Some(args::parse(p, "-u/--until")?);
            }
            Short('i') | Long("interval") => {
                self.interval = Some(args::parse(p, "-i/--interval")?);
            }
            Short('w') | Long("week-day") => {
                self.week_days.push(args::parse(p, "-w/--week-day")?);
            }
            Short('n') | Long("nth") => {
                self.nth = Some(args::parse(p, "-n/--nth")?);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        &[
            Frequency::USAGE,
            RuleArgs::START,
            RuleArgs::INTERVAL,
            RuleArgs::UNTIL,
            flags::Weekdays::USAGE,
            flags::NthWeekday::USAGE,
        ]
    }
}
