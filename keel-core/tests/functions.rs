#[cfg(test)]
mod tests {
    use keel_core::{
        Query,
        dialect::{MYSQLI, PGSQL, SQLITE, SQLSRV},
    };

    #[test]
    fn concatenate() {
        let query = Query::for_dialect(MYSQLI);
        assert_eq!(
            query.concatenate(&["a.title", "a.alias"], Some(" - ")),
            "CONCAT_WS(' - ', a.title, a.alias)"
        );
        assert_eq!(query.concatenate(&["a", "b"], None), "CONCAT(a, b)");

        let query = Query::for_dialect(PGSQL);
        assert_eq!(query.concatenate(&["a", "b"], Some("-")), "a || '-' || b");
        assert_eq!(query.concatenate(&["a", "b"], None), "a || b");

        let query = Query::for_dialect(SQLSRV);
        assert_eq!(query.concatenate(&["a", "b"], None), "(a + b)");
        assert_eq!(query.concatenate(&["a", "b"], Some(",")), "(a + N',' + b)");
    }

    #[test]
    fn date_parts() {
        assert_eq!(Query::for_dialect(MYSQLI).year("d"), "YEAR(d)");
        assert_eq!(Query::for_dialect(PGSQL).year("d"), "EXTRACT (YEAR FROM d)");
        assert_eq!(
            Query::for_dialect(SQLITE).hour("d"),
            "CAST(strftime('%H', d) AS INTEGER)"
        );
        assert_eq!(Query::for_dialect(SQLSRV).month("d"), "MONTH(d)");
        assert_eq!(Query::for_dialect(SQLSRV).minute("d"), "DATEPART(MINUTE, d)");
    }

    #[test]
    fn date_add() {
        assert_eq!(
            Query::for_dialect(MYSQLI).date_add("d", "-1", "DAY"),
            "DATE_ADD(d, INTERVAL -1 DAY)"
        );
        assert_eq!(
            Query::for_dialect(PGSQL).date_add("d", "-1", "day"),
            "timestamp d - interval '1 day'"
        );
        assert_eq!(
            Query::for_dialect(SQLITE).date_add("d", "+2", "days"),
            "datetime(d, '+2 days')"
        );
        assert_eq!(
            Query::for_dialect(SQLSRV).date_add("d", "3", "day"),
            "DATEADD(day, 3, d)"
        );
    }

    #[test]
    fn find_in_set() {
        assert_eq!(Query::for_dialect(MYSQLI).find_in_set("v", "s"), "FIND_IN_SET(v, s)");
        assert_eq!(
            Query::for_dialect(PGSQL).find_in_set("v", "s"),
            "CAST(v AS TEXT) = ANY (string_to_array(s, ','))"
        );
        assert_eq!(
            Query::for_dialect(SQLITE).find_in_set("v", "s"),
            "(',' || s || ',') LIKE ('%,' || v || ',%')"
        );
        assert_eq!(
            Query::for_dialect(SQLSRV).find_in_set("v", "s"),
            "CHARINDEX(',' + v + ',', ',' + s + ',') > 0"
        );
    }

    #[test]
    fn casts_and_lengths() {
        let query = Query::for_dialect(MYSQLI);
        assert_eq!(query.cast_as_char("a", None), "CAST(a AS CHAR)");
        assert_eq!(query.cast_as_char("a", Some(5)), "CAST(a AS CHAR(5))");
        assert_eq!(query.char_length("a", Some((">", "5"))), "CHAR_LENGTH(a) > 5");
        assert_eq!(query.length("a"), "LENGTH(a)");
        assert_eq!(Query::for_dialect(PGSQL).cast_as_char("a", None), "CAST(a AS text)");
        let query = Query::for_dialect(SQLSRV);
        assert_eq!(query.cast_as_char("a", None), "CAST(a AS NVARCHAR(10))");
        assert_eq!(query.char_length("a", None), "DATALENGTH(a)");
        assert_eq!(query.length("a"), "LEN(a)");
    }

    #[test]
    fn misc_functions() {
        assert_eq!(Query::for_dialect(MYSQLI).rand(), "RAND()");
        assert_eq!(Query::for_dialect(SQLSRV).rand(), "NEWID()");
        assert_eq!(Query::for_dialect(PGSQL).regexp("'^a'"), " ~* '^a'");
        assert_eq!(Query::for_dialect(PGSQL).current_timestamp(), "NOW()");
        assert_eq!(Query::for_dialect(SQLSRV).current_timestamp(), "GETDATE()");
    }
}
