use std::{fmt::Write as _, io::Write};

use crate::{
    args::{self, Usage},
    cmd::RuleArgs,
};

const USAGE: &'static str = r#"
Render upcoming occurrences of a recurring schedule as a compact grid.

Each occurrence is shown as its day of the month, seven to a row, in
chronological order. This is the at-a-glance rendering; use `encore preview`
for full dates.

USAGE:
    encore grid <frequency> [<start>]

TIP:
    use -h for short docs and --help for long docs

EXAMPLES:
    The first ten days of a daily schedule:

        $ encore grid daily 2023-09-01
         1   2   3   4   5   6   7
         8   9  10

    The second Tuesday of each month:

        $ encore grid monthly 2023-09-01 -n 2-tue -c 3
        12  10  14

REQUIRED ARGUMENTS:
%args%
OPTIONS:
%flags%
"#;

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut config = Config::default();
    let mut rule_args = RuleArgs::default();
    args::configure(p, USAGE, &mut [&mut config, &mut rule_args])?;

    let rule = rule_args.rule()?;
    let dates = rule.expand(config.count());
    let mut wtr = std::io::stdout().lock();
    for row in dates.chunks(7) {
        let mut line = String::new();
        for (i, date) in row.iter().enumerate() {
            if i > 0 {
                line.push_str("  ");
            }
            write!(line, "{:>2}", date.day())?;
        }
        writeln!(wtr, "{line}")?;
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Config {
    count: Option<usize>,
}

impl Config {
    const COUNT: Usage = Usage::flag(
        "-c/--count <number>",
        "Render at most this many dates (defaults to 10).",
        r#"
Render at most this many dates.

The default is 10. Zero is a legal value, but always results in an empty
grid.
"#,
    );

    fn count(&self) -> usize {
        self.count.unwrap_or(10)
    }
}

impl args::Configurable for Config {
    fn configure(
        &mut self,
        p: &mut lexopt::Parser,
        arg: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        use lexopt::Arg::*;

        match *arg {
            Short('c') | Long("count") => {
                self.count = Some(args::parse(p, "-c/--count")?);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        &[Config::COUNT]
    }
}
