#[cfg(test)]
mod tests {
    use keel::{
        DatabaseDriver, DatabaseFactory, DebugMonitor, DriverOptions, Error, RowKey,
        RowsAffected, Sql, Value,
    };
    use keel_tests::{MemoryDatabase, RecordingMonitor, ScriptedStatement, init_logs};
    use std::rc::Rc;

    fn connected(prefix: &str) -> (Rc<DatabaseDriver>, MemoryDatabase) {
        let memory = MemoryDatabase::new();
        let mut factory = DatabaseFactory::new();
        factory.set_connector("mysqli", memory.connector()).unwrap();
        let driver = factory
            .get_driver("mysqli", DriverOptions::new("mysqli").with_prefix(prefix))
            .unwrap();
        (driver, memory)
    }

    fn users() -> ScriptedStatement {
        ScriptedStatement::new(
            &["id", "name"],
            vec![
                vec![Value::Int64(Some(1)), Value::Varchar(Some("Ann".into()))],
                vec![Value::Int64(Some(2)), Value::Varchar(Some("Bob".into()))],
            ],
        )
    }

    #[test]
    fn prefix_replaced_outside_literals() {
        init_logs();
        let (driver, memory) = connected("jos_");
        driver
            .run("SELECT * FROM #__users WHERE name = '#__x'")
            .unwrap();
        assert_eq!(
            memory.statements(),
            ["SELECT * FROM jos_users WHERE name = '#__x'"]
        );
        assert_eq!(driver.count(), 1);
    }

    #[test]
    fn built_query_with_parameters() {
        init_logs();
        let (driver, memory) = connected("jos_");
        let mut query = driver.get_query();
        query
            .select("id")
            .unwrap()
            .from(driver.quote_name("#__users"))
            .where_("id = :id");
        query.bind(":id", 2_i64).unwrap();
        driver.set_query(&query);
        assert!(matches!(driver.current_query(), Some(Sql::Built(..))));
        driver.execute().unwrap();
        let executed = memory.executed();
        assert_eq!(executed[0].sql, "SELECT id\nFROM `jos_users`\nWHERE id = :id");
        assert_eq!(executed[0].parameters.len(), 1);
        assert_eq!(executed[0].parameters[0].value, Value::Int64(Some(2)));
    }

    #[test]
    fn monitor_symmetric_on_failure() {
        init_logs();
        let (driver, memory) = connected("");
        let monitor = Rc::new(RecordingMonitor::new());
        driver.set_monitor(Some(monitor.clone()));
        memory.push_failure("You have an error in your SQL syntax");
        assert!(matches!(
            driver.run("SELEC 1"),
            Err(Error::Execution { ref sql, .. }) if sql == "SELEC 1"
        ));
        driver.run("SELECT 1").unwrap();
        assert_eq!(
            monitor.events(),
            ["start SELEC 1", "stop", "start SELECT 1", "stop"]
        );
        assert_eq!(monitor.starts(), monitor.stops());
        assert_eq!(driver.count(), 2);
    }

    #[test]
    fn debug_monitor_records() {
        init_logs();
        let (driver, _memory) = connected("jos_");
        let monitor = Rc::new(DebugMonitor::new());
        driver.set_monitor(Some(monitor.clone()));
        driver.run("SELECT 1 FROM #__users").unwrap();
        driver.run("SELECT 2").unwrap();
        assert_eq!(monitor.len(), 2);
        let queries = monitor.queries();
        assert_eq!(queries[0].sql, "SELECT 1 FROM jos_users");
        assert!(queries.iter().all(|v| v.elapsed.is_some()));
        driver.set_monitor(None);
        driver.run("SELECT 3").unwrap();
        assert_eq!(monitor.len(), 2);
    }

    #[test]
    fn refused_connection() {
        init_logs();
        let (driver, memory) = connected("");
        memory.refuse_connections("Access denied for user");
        let monitor = Rc::new(RecordingMonitor::new());
        driver.set_monitor(Some(monitor.clone()));
        assert!(matches!(
            driver.run("SELECT 1"),
            Err(Error::ConnectionFailure { code: Some(ref code), .. }) if code == "2002"
        ));
        assert!(monitor.events().is_empty());
        assert!(!driver.connected());
    }

    #[test]
    fn no_statement() {
        init_logs();
        let (driver, _memory) = connected("");
        assert!(matches!(driver.execute(), Err(Error::InvalidArgument(..))));
    }

    #[test]
    fn load_helpers() {
        init_logs();
        let (driver, memory) = connected("");
        memory
            .push_rows(users())
            .push_rows(users())
            .push_rows(users())
            .push_rows(users())
            .push_rows(ScriptedStatement::new(&["id"], vec![]));

        driver.set_query("SELECT id, name FROM users");
        let rows = driver.load_objects().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("name"), Some(&Value::Varchar(Some("Bob".into()))));

        let keyed = driver.load_objects_keyed("name").unwrap();
        assert!(keyed.contains_key(&RowKey::from("Ann")));

        assert_eq!(driver.load_result().unwrap(), Some(Value::Int64(Some(1))));
        assert_eq!(
            driver.load_column(1).unwrap(),
            [
                Value::Varchar(Some("Ann".into())),
                Value::Varchar(Some("Bob".into()))
            ]
        );
        assert_eq!(driver.load_object().unwrap(), None);
        assert_eq!(memory.statements().len(), 5);
    }

    #[test]
    fn modify_reports_effect() {
        init_logs();
        let (driver, memory) = connected("");
        memory
            .push_rows(ScriptedStatement::affected(3))
            .set_last_insert_id(Some(9));
        driver.set_query("UPDATE users SET block = 1");
        assert_eq!(
            driver.execute_modify().unwrap(),
            RowsAffected {
                rows_affected: 3,
                last_affected_id: Some(9),
            }
        );
    }

    #[test]
    fn disconnects_on_drop() {
        init_logs();
        let (driver, memory) = connected("");
        driver.connect().unwrap();
        driver.connect().unwrap();
        assert!(driver.connected());
        assert_eq!(memory.connects(), 1);
        drop(driver);
        assert_eq!(memory.disconnects(), 1);
    }

    #[test]
    fn quoting_helpers() {
        init_logs();
        let (driver, _memory) = connected("");
        assert_eq!(driver.quote("it's"), r"'it\'s'");
        assert_eq!(driver.quote_name("a.id"), "`a`.`id`");
        assert_eq!(driver.escape("100%", true), r"100\%");
        assert_eq!(driver.replace_prefix("#__a"), "a");
    }
}
