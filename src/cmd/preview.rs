use std::io::Write;

use crate::{
    args::{self, Usage},
    cmd::RuleArgs,
};

const USAGE: &'static str = r#"
Print the dates a recurring schedule lands on, one per line.

Dates are generated in chronological order from the schedule's start date
(today when not given) through its inclusive end date, which defaults to one
year after the start. At most `-c/--count` dates are printed; the default
is 10.

USAGE:
    encore preview <frequency> [<start>]

TIP:
    use -h for short docs and --help for long docs

EXAMPLES:
    Every Friday and Saturday, starting from a Friday:

        $ encore preview weekly 2023-09-01 -w fri,sat -c 4
        2023-09-01
        2023-09-02
        2023-09-08
        2023-09-09

    The second Tuesday of each month:

        $ encore preview monthly 2023-09-01 -n 2-tue -c 3
        2023-09-12
        2023-10-10
        2023-11-14

    Every tenth day from today through the end of 2025:

        $ encore preview daily -i 10 -u 2025-12-31

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
    let mut wtr = std::io::stdout().lock();
    for date in rule.iter().take(config.count()) {
        writeln!(wtr, "{date}")?;
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
        "Print at most this many dates (defaults to 10).",
        r#"
Print at most this many dates.

The default is 10. Zero is a legal value, but always results in an empty
preview.
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
