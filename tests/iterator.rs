#[cfg(test)]
mod tests {
    use keel::{
        DatabaseIterator, Error, FetchMode, FromRow, Result, RowKey, RowLabeled, RowShape,
        RowShapes, Value,
    };
    use keel_tests::{ScriptedStatement, init_logs};

    fn articles(count: i64) -> ScriptedStatement {
        ScriptedStatement::new(
            &["id", "title"],
            (1..=count)
                .map(|i| vec![Value::Int64(Some(i)), Value::Varchar(Some(format!("Row {i}")))])
                .collect(),
        )
    }

    #[test]
    fn keyed_by_ordinal() {
        init_logs();
        let statement = articles(5);
        let log = statement.log();
        let iterator = DatabaseIterator::standard(Box::new(statement)).unwrap();
        let keys = iterator
            .map(|item| item.map(|(key, _)| key))
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(keys, (0..5).map(RowKey::Index).collect::<Vec<_>>());
        assert_eq!(log.fetch_modes(), [FetchMode::StandardObject]);
        assert_eq!(log.closes(), 1);
    }

    #[test]
    fn keyed_by_column() {
        init_logs();
        let iterator =
            DatabaseIterator::new(Box::new(articles(3)), Some("title"), None, &RowShapes::default())
                .unwrap();
        assert_eq!(iterator.key_column(), Some("title"));
        let items = iterator.collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(items[0].0, RowKey::Text("Row 1".into()));
        assert_eq!(items[2].0, RowKey::Text("Row 3".into()));
        assert_eq!(items[2].1.get("id"), Some(&Value::Int64(Some(3))));

        let iterator =
            DatabaseIterator::new(Box::new(articles(2)), Some("id"), None, &RowShapes::default())
                .unwrap();
        let map = iterator.into_map().unwrap();
        assert_eq!(map.keys().cloned().collect::<Vec<_>>(), [RowKey::Int(1), RowKey::Int(2)]);
    }

    #[test]
    fn keyed_by_text_column() {
        init_logs();
        let statement = ScriptedStatement::new(
            &["id", "title", "key"],
            (1..=5)
                .map(|i| {
                    vec![
                        Value::Int64(Some(i)),
                        Value::Varchar(Some(format!("Row {i}"))),
                        Value::Varchar(Some(format!("Key {i}"))),
                    ]
                })
                .collect(),
        );
        let map = DatabaseIterator::new(Box::new(statement), Some("key"), None, &RowShapes::default())
            .unwrap()
            .into_map()
            .unwrap();
        assert_eq!(
            map.keys().cloned().collect::<Vec<_>>(),
            (1..=5)
                .map(|i| RowKey::Text(format!("Key {i}")))
                .collect::<Vec<_>>()
        );
        assert_eq!(
            map[&RowKey::from("Key 4")].get("title"),
            Some(&Value::Varchar(Some("Row 4".into())))
        );
    }

    #[test]
    fn missing_key_column() {
        init_logs();
        let mut iterator =
            DatabaseIterator::new(Box::new(articles(1)), Some("alias"), None, &RowShapes::default())
                .unwrap();
        assert!(matches!(
            iterator.next(),
            Some(Err(Error::KeyColumnNotFound(ref column))) if column == "alias"
        ));
    }

    #[test]
    fn custom_shape() {
        init_logs();
        let mut shapes = RowShapes::default();
        let shape = shapes.register(RowShape::new("Article", ["title", "hits"]));
        let statement = articles(2);
        let log = statement.log();
        let iterator =
            DatabaseIterator::new(Box::new(statement), None, Some("Article"), &shapes).unwrap();
        for item in iterator {
            let (_, row) = item.unwrap();
            assert_eq!(row.shape_name(), Some("Article"));
            assert_eq!(row.get("hits"), Some(&Value::Null));
            assert_eq!(row.get("id"), None);
        }
        assert_eq!(log.fetch_modes(), [FetchMode::CustomObject(shape)]);
    }

    #[test]
    fn unknown_shape() {
        init_logs();
        let statement = articles(2);
        let log = statement.log();
        assert!(matches!(
            DatabaseIterator::new(Box::new(statement), None, Some("Missing"), &RowShapes::default()),
            Err(Error::InvalidArgument(..))
        ));
        assert_eq!(log.fetches(), 0);
        assert!(log.fetch_modes().is_empty());
        assert_eq!(log.closes(), 1);
    }

    #[test]
    fn rejected_fetch_mode() {
        init_logs();
        let statement = articles(2).rejecting_fetch_mode();
        let log = statement.log();
        assert!(matches!(
            DatabaseIterator::standard(Box::new(statement)),
            Err(Error::Driver(..))
        ));
        assert_eq!(log.fetch_modes(), [FetchMode::StandardObject]);
        assert_eq!(log.fetches(), 0);
        assert_eq!(log.closes(), 1);
    }

    #[test]
    fn count_without_fetching() {
        init_logs();
        let statement = articles(0).with_row_count(42);
        let log = statement.log();
        let iterator = DatabaseIterator::standard(Box::new(statement)).unwrap();
        assert_eq!(iterator.row_count().unwrap(), 42);
        assert_eq!(log.fetches(), 0);
        drop(iterator);
        assert_eq!(log.closes(), 1);
    }

    #[test]
    fn fetch_failure_closes() {
        init_logs();
        let statement = articles(5).failing_at(2);
        let log = statement.log();
        let mut iterator = DatabaseIterator::standard(Box::new(statement)).unwrap();
        assert!(matches!(iterator.next(), Some(Ok(..))));
        assert!(matches!(iterator.next(), Some(Ok(..))));
        assert!(matches!(iterator.next(), Some(Err(Error::Driver(..)))));
        assert!(iterator.next().is_none());
        drop(iterator);
        assert_eq!(log.fetches(), 3);
        assert_eq!(log.closes(), 1);
    }

    #[test]
    fn duplicate_keys() {
        init_logs();
        let statement = ScriptedStatement::new(
            &["catid"],
            vec![vec![Value::Int32(Some(4))], vec![Value::Int32(Some(4))]],
        );
        let iterator =
            DatabaseIterator::new(Box::new(statement), Some("catid"), None, &RowShapes::default())
                .unwrap();
        assert!(matches!(
            iterator.into_map(),
            Err(Error::DuplicateKey(ref key)) if key == "4"
        ));
    }

    #[derive(Debug, PartialEq)]
    struct Article {
        id: i64,
        title: String,
    }

    impl FromRow for Article {
        fn from_row(row: RowLabeled) -> Result<Self> {
            Ok(Self {
                id: row.get("id")?,
                title: row.get("title")?,
            })
        }
    }

    #[test]
    fn typed_rows() {
        init_logs();
        let loaded = DatabaseIterator::standard(Box::new(articles(2)))
            .unwrap()
            .typed::<Article>()
            .map(|item| item.map(|(_, v)| v))
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(
            loaded,
            [
                Article {
                    id: 1,
                    title: "Row 1".into()
                },
                Article {
                    id: 2,
                    title: "Row 2".into()
                }
            ]
        );
    }
}
