#[cfg(test)]
mod tests {
    use keel_core::{
        Query, Value,
        dialect::{MYSQLI, PGSQL, SQLSRV},
    };

    #[test]
    fn quote_names() {
        let query = Query::for_dialect(MYSQLI);
        assert_eq!(query.quote_name("a.title"), "`a`.`title`");
        assert_eq!(query.quote_name("#__content AS a"), "`#__content` AS `a`");
        assert_eq!(query.quote_name("t as x"), "`t` AS `x`");
        assert_eq!(query.quote_name("a.*"), "`a`.*");
        assert_eq!(query.quote_name("we`ird"), "`we``ird`");
        assert_eq!(query.quote_name_as("#__users", "u"), "`#__users` AS `u`");

        let query = Query::for_dialect(PGSQL);
        assert_eq!(query.quote_name("public.users"), r#""public"."users""#);

        let query = Query::for_dialect(SQLSRV);
        assert_eq!(query.quote_name("dbo.users"), "[dbo].[users]");
        assert_eq!(query.quote_name("we]ird"), "[we]]ird]");
    }

    #[test]
    fn escape_and_quote() {
        let query = Query::for_dialect(MYSQLI);
        assert_eq!(query.escape("O'Reilly\n", false), r"O\'Reilly\n");
        assert_eq!(query.escape("50%_off", false), "50%_off");
        assert_eq!(query.escape("50%_off", true), r"50\%\_off");
        assert_eq!(query.quote("it's"), r"'it\'s'");

        let query = Query::for_dialect(PGSQL);
        assert_eq!(query.escape("O'Reilly", false), "O''Reilly");
        assert_eq!(query.escape("50%", true), r"50\%");
        assert_eq!(query.quote("it's"), "'it''s'");

        let query = Query::for_dialect(SQLSRV);
        assert_eq!(query.escape("a'b\0c", false), "a''b' + CHAR(0) + N'c");
        assert_eq!(query.escape("[x]_%", true), "[[]x][_][%]");
        assert_eq!(query.quote("it's"), "N'it''s'");
    }

    #[test]
    fn literal_values() {
        let mysql = Query::for_dialect(MYSQLI);
        let pgsql = Query::for_dialect(PGSQL);
        let sqlsrv = Query::for_dialect(SQLSRV);
        assert_eq!(mysql.quote_value(&Value::Boolean(Some(true))), "1");
        assert_eq!(pgsql.quote_value(&Value::Boolean(Some(false))), "FALSE");
        assert_eq!(mysql.quote_value(&Value::Int64(None)), "NULL");
        assert_eq!(mysql.quote_value(&Value::Null), "NULL");
        assert_eq!(mysql.quote_value(&Value::Int32(Some(-42))), "-42");
        assert_eq!(mysql.quote_value(&Value::Float64(Some(1.5))), "1.5");
        assert_eq!(mysql.quote_value(&Value::Float64(Some(f64::NAN))), "'NaN'");
        let blob = Value::Blob(Some(vec![0xDE, 0xAD].into_boxed_slice()));
        assert_eq!(mysql.quote_value(&blob), "X'DEAD'");
        assert_eq!(pgsql.quote_value(&blob), r"'\xDEAD'");
        assert_eq!(sqlsrv.quote_value(&blob), "0xDEAD");
        assert_eq!(
            sqlsrv.quote_value(&Value::Varchar(Some("Zoë".into()))),
            "N'Zoë'"
        );
    }

    #[test]
    fn null_dates() {
        let query = Query::for_dialect(MYSQLI);
        assert_eq!(query.null_date(true), "'0000-00-00 00:00:00'");
        assert!(query.is_null_datetime("1000-01-01 00:00:00"));
        let query = Query::for_dialect(PGSQL);
        assert_eq!(query.null_date(false), "1970-01-01 00:00:00");
        assert!(!query.is_null_datetime("0000-00-00 00:00:00"));
    }
}
