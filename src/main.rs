use std::{env, io::Write, process::ExitCode, sync::LazyLock};

use {
    anyhow::Context,
    jiff::{Timestamp, civil::Date, tz::TimeZone},
};

mod args;
mod cmd;
mod logger;
mod recur;
mod style;

static TZ: LazyLock<TimeZone> = LazyLock::new(|| TimeZone::system());

static TODAY: LazyLock<Date> = LazyLock::new(|| {
    match read_env_encore_today() {
        Ok(Some(date)) => {
            log::trace!(
                "setting today's date to `{date}` from `ENCORE_TODAY` \
                 environment variable",
            );
            date
        }
        Ok(None) => {
            let today = Timestamp::now().to_zoned(TZ.clone()).date();
            log::trace!(
                "`ENCORE_TODAY` environment variable not set, using \
                 today's date `{today}`",
            );
            today
        }
        Err(err) => {
            let today = Timestamp::now().to_zoned(TZ.clone()).date();
            log::warn!(
                "reading `ENCORE_TODAY` failed, using today's date \
                 `{today}`: {err:#}",
            );
            today
        }
    }
});

fn main() -> ExitCode {
    let err = match run() {
        Ok(code) => return code,
        Err(err) => err,
    };
    if let Some(help) = err.root_cause().downcast_ref::<args::Help>() {
        writeln!(&mut std::io::stdout(), "{help}").unwrap();
        return ExitCode::SUCCESS;
    }
    // Look for a broken pipe error. In this case, we generally want
    // to exit "gracefully" with a success exit code. This matches
    // existing Unix convention. We need to handle this explicitly
    // since the Rust runtime doesn't ask for PIPE signals, and thus
    // we get an I/O error instead. Traditional C Unix applications
    // quit by getting a PIPE signal that they don't handle, and thus
    // the unhandled signal causes the process to unceremoniously
    // terminate.
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<std::io::Error>() {
            if err.kind() == std::io::ErrorKind::BrokenPipe {
                return ExitCode::from(0);
            }
        }
    }
    if std::env::var("RUST_BACKTRACE").map_or(false, |v| v == "1")
        && std::env::var("RUST_LIB_BACKTRACE").map_or(true, |v| v == "1")
    {
        writeln!(&mut std::io::stderr(), "{:?}", err).unwrap();
    } else {
        writeln!(&mut std::io::stderr(), "{:#}", err).unwrap();
    }
    ExitCode::from(1)
}

fn run() -> anyhow::Result<ExitCode> {
    let rustlog = env::var("ENCORE_LOG").unwrap_or_else(|_| String::new());
    let level = match &*rustlog {
        "" | "off" => log::LevelFilter::Off,
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        unk => anyhow::bail!("unrecognized log level '{}'", unk),
    };
    log::set_max_level(level);
    // We do this little dance here because we want `TimeZone::system()`
    // (run in the `TZ` lazy lock above) to emit log messages. But we
    // also want to use the time zone to emit localized datetimes in our
    // logger implementation! So we initialize the logger without a time
    // zone, which will then cause early log messages to be emitted in UTC.
    // But after that, we can set the time zone and things become local.
    let logger = logger::Logger::init()?;
    logger.set_time_zone(TZ.clone());
    cmd::run(&mut lexopt::Parser::from_env())?;
    Ok(ExitCode::SUCCESS)
}

fn read_env_encore_today() -> anyhow::Result<Option<Date>> {
    let Some(val) = std::env::var_os("ENCORE_TODAY") else { return Ok(None) };
    let Some(val) = val.to_str() else {
        anyhow::bail!(
            "`ENCORE_TODAY` environment variable is not valid UTF-8: {val:?}"
        )
    };
    val.parse::<Date>()
        .context(
            "`ENCORE_TODAY` environment variable is not a valid civil date",
        )
        .map(Some)
}
