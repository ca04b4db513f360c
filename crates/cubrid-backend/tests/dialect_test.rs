//! Integration tests for the CUBRID dialect formatter

use chrono::TimeDelta;
use cubrid_backend::config::FrameworkVersion;
use cubrid_backend::dialect::{Connector, CubridOperations, DialectOp, Interval, TruncUnit};
use cubrid_backend::placeholder::rewrite;
use proptest::prelude::*;

fn ops() -> CubridOperations {
    CubridOperations::default()
}

#[test]
fn test_month_trunc_keeps_year_and_month() {
    let sql = rewrite(&ops().date_trunc_sql("month", "col"));
    assert_eq!(sql, "CAST(DATE_FORMAT(col, '%Y-%m-01 00:00:00.00') AS DATETIME)");
}

#[test]
fn test_trunc_units_cover_finer_components() {
    let expected = [
        ("year", "%Y-01-01 00:00:00.00"),
        ("month", "%Y-%m-01 00:00:00.00"),
        ("day", "%Y-%m-%d 00:00:00.00"),
        ("hour", "%Y-%m-%d %H:00:00.00"),
        ("minute", "%Y-%m-%d %H:%i:00.00"),
        ("second", "%Y-%m-%d %H:%i:%s.00"),
        ("millisecond", "%Y-%m-%d %H:%i:%s.%ms"),
    ];

    for (unit, format) in expected {
        assert_eq!(
            rewrite(&ops().date_trunc_sql(unit, "d")),
            format!("CAST(DATE_FORMAT(d, '{}') AS DATETIME)", format),
            "unit {}",
            unit
        );
    }
}

#[test]
fn test_trunc_unit_aliases() {
    assert_eq!(TruncUnit::parse("milisecond"), TruncUnit::parse("millisecond"));
    assert_eq!(TruncUnit::parse("quarter"), None);
}

#[test]
fn test_datetime_variants_match_date_variants() {
    let aware = CubridOperations::new(FrameworkVersion::default(), true);

    assert_eq!(
        aware.datetime_trunc_sql("day", "d", Some("Asia/Seoul")),
        aware.date_trunc_sql("day", "d")
    );
    assert_eq!(
        aware.datetime_extract_sql("week_day", "d", None),
        "DAYOFWEEK(d)"
    );
}

#[test]
fn test_interval_from_time_delta() {
    let delta = TimeDelta::days(3) + TimeDelta::seconds(90) + TimeDelta::microseconds(2_500);
    let sql = ops().date_interval_sql("`t`.`d`", Connector::Add, Interval::from(delta));
    assert_eq!(
        sql,
        "ADDDATE (`t`.`d`, INTERVAL '3 0:0:90:2' DAY_MILLISECOND)"
    );

    let sql = ops().date_interval_sql("`t`.`d`", Connector::from_symbol("-"), Interval::from(delta));
    assert!(sql.starts_with("SUBDATE ("));
}

#[test]
fn test_pattern_escape_after_rewrite() {
    assert_eq!(
        rewrite(&ops().pattern_esc("x")),
        r"REPLACE(REPLACE(REPLACE(x, '\\', '\\\\'), '%', '\%'), '_', '\_')"
    );
}

#[test]
fn test_pattern_ops_after_rewrite() {
    let sql = ops().pattern_op("startswith", "`name`").unwrap();
    assert_eq!(rewrite(&sql), "LIKE `name` || '%'");

    let sql = ops().pattern_op("iendswith", "`name`").unwrap();
    assert_eq!(rewrite(&sql), "LIKE '%' || UPPER(`name`)");
}

#[test]
fn test_version_gated_fragments() {
    let v18 = CubridOperations::new(FrameworkVersion::new(1, 8), false);
    let v111 = CubridOperations::new(FrameworkVersion::new(1, 11), false);
    let rows = DialectOp::BulkInsertRows(vec![vec!["%s".into(), "%s".into()]]);
    let counts = DialectOp::BulkInsertCounts { fields: 2, rows: 1 };

    assert_eq!(v18.fragment(&counts).unwrap(), "VALUES (%s, %s)");
    assert!(v18.fragment(&rows).is_err());
    assert_eq!(v111.fragment(&rows).unwrap(), "VALUES (%s, %s)");
    assert!(v111.fragment(&counts).is_err());
}

#[test]
fn test_no_limit_sentinel() {
    assert_eq!(ops().no_limit_value(), 9223372036854775807);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_quote_name_idempotent(name in "\\PC{0,24}") {
        let ops = ops();
        let once = ops.quote_name(&name);
        prop_assert_eq!(ops.quote_name(&once), once.clone());
        prop_assert!(once.starts_with('`') && once.ends_with('`'));
    }

    #[test]
    fn prop_unknown_trunc_unit_is_identity(unit in "[a-z]{1,12}", field in "[a-z_]{1,12}") {
        prop_assume!(TruncUnit::parse(&unit).is_none());
        prop_assert_eq!(ops().date_trunc_sql(&unit, &field), field);
    }

    #[test]
    fn prop_interval_milliseconds_truncate(micros in 0i64..1_000_000) {
        let sql = ops().date_interval_sql("d", Connector::Add, Interval::new(0, 0, micros));
        let expected = format!("ADDDATE (d, INTERVAL '0 0:0:0:{}' DAY_MILLISECOND)", micros / 1000);
        prop_assert_eq!(sql, expected);
    }
}
