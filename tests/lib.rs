use std::ffi::OsStr;

mod command;
mod grid;

/// The fixed "today" that every test runs with. It's a Saturday.
const TODAY: &str = "2024-07-20";

/// Return a command for the `encore` binary and no argument.
fn encore_bare() -> crate::command::Command {
    crate::command::bin("encore")
        .env("TZ", "America/New_York")
        .env("ENCORE_TODAY", TODAY)
}

/// Return a command for the `encore` binary with the given arguments appended
/// to it.
fn encore<T: AsRef<OsStr>>(
    args: impl IntoIterator<Item = T>,
) -> crate::command::Command {
    encore_bare().args(args)
}

/// Test that calling `encore` with no arguments prints the top-level usage
/// message and fails.
#[test]
fn no_args() {
    crate::command::assert_cmd_snapshot!(
        encore_bare(),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    A command-line utility for previewing recurring date schedules.

    USAGE:
        encore <command> ...

    COMMANDS:
        grid     Render upcoming occurrences as a day-of-month grid
        preview  Print the dates a recurring schedule lands on
    ",
    );
}

/// Test that an unknown command is rejected.
#[test]
fn unknown_command() {
    crate::command::assert_cmd_snapshot!(
        encore(["forecast"]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    unrecognized command 'forecast'
    ",
    );
}
