use crate::{command::assert_cmd_snapshot, encore};

/// Ten daily occurrences fill one full row of seven and spill into a second.
#[test]
fn daily_wraps_after_seven() {
    assert_cmd_snapshot!(
        encore(["grid", "daily", "2023-09-01"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
     1   2   3   4   5   6   7
     8   9  10

    ----- stderr -----
    ",
    );
}

/// The second Tuesday drifts around from month to month.
#[test]
fn monthly_second_tuesday() {
    assert_cmd_snapshot!(
        encore(["grid", "monthly", "2023-09-01", "-n", "2-tue", "-c", "3"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    12  10  14

    ----- stderr -----
    ",
    );
}

#[test]
fn zero_count_is_empty() {
    assert_cmd_snapshot!(
        encore(["grid", "daily", "2023-09-01", "-c", "0"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----

    ----- stderr -----
    ",
    );
}
