/*!
The recurrence engine: given an immutable rule describing a repeating
schedule, produce the ordered, bounded sequence of concrete dates the
schedule lands on.

Everything here works in `jiff::civil::Date`. Keeping the engine at whole-day
granularity means boundary comparisons can never be perturbed by a
time-of-day, and it keeps the engine pure: a `Rule` is never mutated, and
iterating it twice yields identical sequences.

One behavior worth calling out is that weekly and monthly expansion anchor to
the week (or month) containing the *current* cursor rather than re-deriving
positions from the start date. A selected weekday that falls earlier in the
anchored week than the cursor is skipped, not rolled forward into a later
week. Since the cursor advances in whole weeks from the start date, a
weekday strictly earlier in the week than the start date's weekday is never
emitted at all.
*/

use std::sync::Arc;

use {
    anyhow::Context,
    jiff::{
        Span, ToSpan,
        civil::{Date, Weekday},
    },
};

use crate::args::Usage;

/// A recurring date schedule.
///
/// A rule is an immutable value. The only two required pieces are the
/// frequency and the start date; everything else has a default. When no end
/// date is given, generation is bounded to one year after the start.
#[derive(Clone, Debug)]
pub struct Rule {
    inner: Arc<RuleInner>,
}

#[derive(Debug)]
struct RuleInner {
    freq: Frequency,
    start: Date,
    /// The resolved inclusive upper bound. This is always set: when the
    /// caller doesn't provide one, it defaults to one year after `start`.
    end: Date,
    /// The span covering one whole step of the schedule, i.e., the interval
    /// multiplied into the frequency's base unit. Computed (and bounds
    /// checked) at build time.
    step: Span,
    /// Sorted by Sunday-zero offset and deduplicated.
    days: Box<[Weekday]>,
    nth_week: i8,
    nth_day: Weekday,
}

impl Rule {
    /// Returns a builder for constructing a `Rule`.
    ///
    /// The frequency and the start date are the only two things required to
    /// create a rule.
    pub fn builder(freq: Frequency, start: Date) -> RuleBuilder {
        RuleBuilder::new(freq, start)
    }

    /// Returns an iterator over the dates matched by this rule.
    ///
    /// The iterator is finite. It ends when the cursor passes the rule's
    /// inclusive end date (one year after the start when no end date was
    /// given), but callers that only want a preview should still bound it
    /// with `take(N)`.
    pub fn iter(&self) -> Occurrences<'_> {
        Occurrences {
            rule: self,
            cursor: Some(self.inner.start),
            pending: vec![],
        }
    }

    /// Returns at most `limit` matching dates, in chronological order.
    ///
    /// This is the whole engine in one call: it's `iter().take(limit)`,
    /// collected.
    pub fn expand(&self, limit: usize) -> Vec<Date> {
        self.iter().take(limit).collect()
    }
}

/// An iterator over the dates matched by a rule.
#[derive(Clone, Debug)]
pub struct Occurrences<'r> {
    /// The rule we're generating dates for.
    rule: &'r Rule,
    /// The current anchor position. Every refill advances this strictly
    /// forward, which bounds the work done even when nothing is emitted
    /// (e.g., a weekly rule with no selected days).
    ///
    /// When this is `None`, iteration has ceased.
    cursor: Option<Date>,
    /// Dates generated at the current anchor that haven't been yielded yet,
    /// in reverse chronological order so that `pop` yields them in
    /// chronological order. Only a weekly rule ever puts more than one date
    /// in here per refill.
    pending: Vec<Date>,
}

impl<'r> Occurrences<'r> {
    /// Generates the dates anchored at `cursor` into the pending buffer and
    /// returns the next cursor position.
    ///
    /// A return of `None` means the cursor can't advance without leaving
    /// jiff's supported date range, and iteration should end once the
    /// pending buffer is drained.
    fn refill(&mut self, cursor: Date) -> Option<Date> {
        let r = &*self.rule.inner;
        let step = r.step;
        match r.freq {
            Frequency::Daily => {
                self.pending.push(cursor);
                cursor.checked_add(step).ok()
            }
            Frequency::Weekly => {
                let week = start_of_week(cursor)?;
                // Reversed so that popping yields ascending dates.
                for &day in r.days.iter().rev() {
                    let offset = i32::from(day.to_sunday_zero_offset());
                    let Ok(candidate) = week.checked_add(offset.days())
                    else {
                        continue;
                    };
                    // Candidates earlier in the week than the cursor are
                    // skipped, not rolled forward. See the module docs.
                    if cursor <= candidate && candidate <= r.end {
                        self.pending.push(candidate);
                    }
                }
                cursor.checked_add(step).ok()
            }
            Frequency::Monthly => {
                let month = cursor.first_of_month();
                // For `nth_week` in 1..=4 this always succeeds and always
                // lands in the anchored month, since every month has at
                // least four of each weekday.
                if let Ok(candidate) =
                    month.nth_weekday_of_month(r.nth_week, r.nth_day)
                {
                    if cursor <= candidate && candidate <= r.end {
                        self.pending.push(candidate);
                    }
                }
                month.checked_add(step).ok()
            }
            Frequency::Yearly => {
                self.pending.push(cursor);
                cursor.checked_add(step).ok()
            }
        }
    }
}

impl<'r> Iterator for Occurrences<'r> {
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        loop {
            if let Some(date) = self.pending.pop() {
                return Some(date);
            }
            let cursor = self.cursor.take()?;
            if cursor > self.rule.inner.end {
                return None;
            }
            self.cursor = self.refill(cursor);
        }
    }
}

impl<'r> std::iter::FusedIterator for Occurrences<'r> {}

/// A builder for constructing a valid rule.
#[derive(Clone, Debug)]
pub struct RuleBuilder {
    freq: Frequency,
    start: Date,
    end: Option<Date>,
    interval: i32,
    days: Vec<Weekday>,
    nth_week: i8,
    nth_day: Weekday,
}

impl RuleBuilder {
    fn new(freq: Frequency, start: Date) -> RuleBuilder {
        RuleBuilder {
            freq,
            start,
            end: None,
            interval: 1,
            days: vec![],
            nth_week: 1,
            nth_day: Weekday::Sunday,
        }
    }

    /// Set the inclusive end date of the schedule.
    ///
    /// When not set, generation is bounded to one year after the start
    /// date. That bound is a property of generation, not of the schedule: a
    /// rule without an end date has no stored end date.
    pub fn until(&mut self, end: Date) -> &mut RuleBuilder {
        self.end = Some(end);
        self
    }

    /// Set the number of frequency units between occurrences.
    ///
    /// The default is `1`. Values less than `1`, or too large for jiff's
    /// span arithmetic, are rejected by `build`.
    pub fn interval(&mut self, interval: i32) -> &mut RuleBuilder {
        self.interval = interval;
        self
    }

    /// Add a weekday to the weekly selection.
    ///
    /// Only a weekly rule consults the selection. A weekly rule with an
    /// empty selection matches nothing.
    pub fn day(&mut self, weekday: Weekday) -> &mut RuleBuilder {
        self.days.push(weekday);
        self
    }

    /// Add every weekday in the given iterator to the weekly selection.
    pub fn days(
        &mut self,
        weekdays: impl IntoIterator<Item = Weekday>,
    ) -> &mut RuleBuilder {
        self.days.extend(weekdays);
        self
    }

    /// Set the "nth weekday of the month" selection for a monthly rule.
    ///
    /// For example, `nth_weekday(2, Weekday::Tuesday)` selects the second
    /// Tuesday of each month. The default is the first Sunday. `week` must
    /// be in the range `1..=4`; `build` rejects anything else.
    pub fn nth_weekday(
        &mut self,
        week: i8,
        weekday: Weekday,
    ) -> &mut RuleBuilder {
        self.nth_week = week;
        self.nth_day = weekday;
        self
    }

    /// Build the rule, validating it in the process.
    ///
    /// A structurally invalid rule is rejected here, before any sequence can
    /// be observed.
    pub fn build(&self) -> anyhow::Result<Rule> {
        anyhow::ensure!(
            self.interval >= 1,
            "interval value of `{}` is invalid \
             (interval must be greater than or equal to 1)",
            self.interval,
        );
        anyhow::ensure!(
            1 <= self.nth_week && self.nth_week <= 4,
            "'nth week' value `{}` is invalid \
             (values must be in range 1..=4)",
            self.nth_week,
        );
        let end = match self.end {
            Some(end) => {
                anyhow::ensure!(
                    self.start <= end,
                    "end date `{end}` is invalid \
                     (it precedes the start date `{start}`)",
                    start = self.start,
                );
                end
            }
            None => self.start.checked_add(1.year()).with_context(|| {
                format!(
                    "failed to determine the default end date \
                     one year after `{}`",
                    self.start,
                )
            })?,
        };
        let step = self.freq.to_span(self.interval).with_context(|| {
            format!(
                "could not convert {freq} interval of `{interval}` to \
                 time span",
                freq = self.freq.as_str(),
                interval = self.interval,
            )
        })?;

        let mut days = self.days.clone();
        days.sort_by_key(|wd| wd.to_sunday_zero_offset());
        days.dedup();

        Ok(Rule {
            inner: Arc::new(RuleInner {
                freq: self.freq,
                start: self.start,
                end,
                step,
                days: days.into_boxed_slice(),
                nth_week: self.nth_week,
                nth_day: self.nth_day,
            }),
        })
    }
}

/// The base unit at which a schedule repeats.
#[derive(Clone, Copy, Debug)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub const USAGE: Usage = Usage::arg(
        "<frequency>",
        "The base unit at which the schedule repeats.",
        r#"
The base unit at which the schedule repeats.

Valid values are:

daily, day, d

weekly, week, wk, w

monthly, month, mo

yearly, year, yr, y
"#,
    );

    /// Returns the span covering `interval` repetitions of this frequency's
    /// base unit.
    ///
    /// This fails when the multiplied span exceeds jiff's per-unit range,
    /// e.g., more than 19,998 years.
    fn to_span(&self, interval: i32) -> anyhow::Result<Span> {
        let base = match *self {
            Frequency::Daily => 1.day(),
            Frequency::Weekly => 1.week(),
            Frequency::Monthly => 1.month(),
            Frequency::Yearly => 1.year(),
        };
        Ok(base.checked_mul(i64::from(interval))?)
    }

    fn as_str(&self) -> &'static str {
        match *self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Frequency> {
        use self::Frequency::*;

        let freq = match &*s.to_lowercase() {
            "daily" | "day" | "d" => Daily,
            "weekly" | "week" | "wk" | "w" => Weekly,
            "monthly" | "month" | "mo" => Monthly,
            "yearly" | "year" | "yr" | "y" => Yearly,
            unk => anyhow::bail!("unrecognized frequency: `{unk}`"),
        };
        Ok(freq)
    }
}

/// Returns the Sunday that starts the week containing the given date.
///
/// This fails only when the date is so close to jiff's minimum that the week
/// containing it has no Sunday in range.
fn start_of_week(date: Date) -> Option<Date> {
    if date.weekday() == Weekday::Sunday {
        Some(date)
    } else {
        date.nth_weekday(-1, Weekday::Sunday).ok()
    }
}
