use crate::{
    Connector, DatabaseDriver, DatabaseExporter, DatabaseImporter, DatabaseIterator, Dialect,
    DriverOptions, Error, Query, Result, RowShape, RowShapes, StatementHandle,
    dialect::{MYSQL, MYSQLI, PGSQL, SQLAZURE, SQLITE, SQLSRV},
    writer::SharedWriter,
};
use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use std::{
    collections::HashMap,
    fmt::{self, Debug, Display},
    rc::Rc,
    sync::Arc,
};

/// Component kind the factory resolves for an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Driver,
    Query,
    Exporter,
    Importer,
    Iterator,
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Driver => "driver",
            Role::Query => "query",
            Role::Exporter => "exporter",
            Role::Importer => "importer",
            Role::Iterator => "iterator",
        })
    }
}

pub type ExporterFactory = Rc<dyn Fn(Option<Rc<DatabaseDriver>>) -> DatabaseExporter>;
pub type ImporterFactory = Rc<dyn Fn(Option<Rc<DatabaseDriver>>) -> DatabaseImporter>;
pub type IteratorFactory = Rc<
    dyn Fn(
        Box<dyn StatementHandle>,
        Option<&str>,
        Option<&str>,
        &RowShapes,
    ) -> Result<DatabaseIterator>,
>;
/// Tells whether the client an adapter needs is usable, the error is the reason it is not.
pub type Probe = Rc<dyn Fn() -> std::result::Result<(), String>>;

/// Everything the factory knows about one adapter.
///
/// The writer provides both the driver and the query roles, the other roles
/// are optional and resolved through `fallbacks` when missing.
#[derive(Clone)]
pub struct AdapterDescriptor {
    pub name: String,
    pub writer: Option<SharedWriter>,
    pub exporter: Option<ExporterFactory>,
    pub importer: Option<ImporterFactory>,
    pub iterator: Option<IteratorFactory>,
    pub aliases: Vec<String>,
    /// Adapters asked, in order, for a role this one lacks.
    pub fallbacks: Vec<String>,
    pub probe: Option<Probe>,
    pub connector: Option<Connector>,
    available: OnceCell<std::result::Result<(), String>>,
}

impl AdapterDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            writer: None,
            exporter: None,
            importer: None,
            iterator: None,
            aliases: Vec::new(),
            fallbacks: Vec::new(),
            probe: None,
            connector: None,
            available: OnceCell::new(),
        }
    }

    pub fn with_dialect(self, dialect: Dialect) -> Self {
        self.with_writer(Arc::new(dialect))
    }

    pub fn with_writer(mut self, writer: SharedWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn with_exporter(
        mut self,
        factory: impl Fn(Option<Rc<DatabaseDriver>>) -> DatabaseExporter + 'static,
    ) -> Self {
        self.exporter = Some(Rc::new(factory));
        self
    }

    pub fn with_importer(
        mut self,
        factory: impl Fn(Option<Rc<DatabaseDriver>>) -> DatabaseImporter + 'static,
    ) -> Self {
        self.importer = Some(Rc::new(factory));
        self
    }

    pub fn with_iterator(mut self, factory: IteratorFactory) -> Self {
        self.iterator = Some(factory);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into().to_ascii_lowercase());
        self
    }

    pub fn with_fallback(mut self, adapter: impl Into<String>) -> Self {
        self.fallbacks.push(adapter.into().to_ascii_lowercase());
        self
    }

    pub fn with_probe(mut self, probe: impl Fn() -> std::result::Result<(), String> + 'static) -> Self {
        self.probe = Some(Rc::new(probe));
        self
    }

    pub fn with_connector(mut self, connector: Connector) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        match role {
            Role::Driver | Role::Query => self.writer.is_some(),
            Role::Exporter => self.exporter.is_some(),
            Role::Importer => self.importer.is_some(),
            Role::Iterator => self.iterator.is_some(),
        }
    }

    /// Result of the availability probe, evaluated on the first call only.
    pub fn available(&self) -> std::result::Result<(), String> {
        self.available
            .get_or_init(|| self.probe.as_ref().map_or(Ok(()), |probe| probe()))
            .clone()
    }
}

impl Debug for AdapterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterDescriptor")
            .field("name", &self.name)
            .field("dialect", &self.writer.as_ref().map(|v| v.dialect().name))
            .field("exporter", &self.exporter.is_some())
            .field("importer", &self.importer.is_some())
            .field("iterator", &self.iterator.is_some())
            .field("aliases", &self.aliases)
            .field("fallbacks", &self.fallbacks)
            .field("connector", &self.connector.is_some())
            .finish()
    }
}

/// Resolves adapter names into drivers, queries, exporters, importers and iterators.
///
/// Registration happens at startup through [`DatabaseFactory::register`],
/// every lookup afterwards is read only.
#[derive(Debug, Clone)]
pub struct DatabaseFactory {
    adapters: IndexMap<String, AdapterDescriptor>,
    aliases: HashMap<String, String>,
    shapes: RowShapes,
}

impl Default for DatabaseFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseFactory {
    /// Factory knowing the built-in adapters.
    pub fn new() -> Self {
        let mut factory = Self::empty();
        factory
            .register(
                AdapterDescriptor::new("mysqli")
                    .with_dialect(MYSQLI)
                    .with_exporter(DatabaseExporter::new)
                    .with_importer(DatabaseImporter::new),
            )
            .register(
                AdapterDescriptor::new("mysql")
                    .with_dialect(MYSQL)
                    .with_exporter(DatabaseExporter::new)
                    .with_importer(DatabaseImporter::new),
            )
            .register(
                AdapterDescriptor::new("pgsql")
                    .with_dialect(PGSQL)
                    .with_alias("postgres")
                    .with_alias("postgresql")
                    .with_exporter(DatabaseExporter::new)
                    .with_importer(DatabaseImporter::new),
            )
            .register(AdapterDescriptor::new("sqlite").with_dialect(SQLITE))
            .register(
                AdapterDescriptor::new("sqlsrv")
                    .with_dialect(SQLSRV)
                    .with_alias("mssql")
                    .with_exporter(|driver| {
                        let mut exporter = DatabaseExporter::new(driver);
                        exporter.as_json();
                        exporter
                    })
                    .with_importer(DatabaseImporter::new),
            )
            .register(
                AdapterDescriptor::new("sqlazure")
                    .with_dialect(SQLAZURE)
                    .with_fallback("sqlsrv"),
            );
        factory
    }

    /// Factory without any adapter.
    pub fn empty() -> Self {
        Self {
            adapters: IndexMap::new(),
            aliases: HashMap::new(),
            shapes: RowShapes::default(),
        }
    }

    /// Adds or replaces an adapter.
    pub fn register(&mut self, descriptor: AdapterDescriptor) -> &mut Self {
        for alias in &descriptor.aliases {
            self.aliases.insert(alias.clone(), descriptor.name.clone());
        }
        self.adapters.insert(descriptor.name.clone(), descriptor);
        self
    }

    /// Attaches the connector used by the drivers of an adapter.
    pub fn set_connector(&mut self, adapter: &str, connector: Connector) -> Result<&mut Self> {
        let name = self.normalize(adapter);
        let descriptor = self
            .adapters
            .get_mut(&name)
            .ok_or_else(|| Error::unsupported(name.clone(), Role::Driver))?;
        descriptor.connector = Some(connector);
        Ok(self)
    }

    /// Shape made available to every driver and iterator created afterwards.
    pub fn register_shape(&mut self, shape: RowShape) -> Arc<RowShape> {
        self.shapes.register(shape)
    }

    pub fn shapes(&self) -> &RowShapes {
        &self.shapes
    }

    /// Lower case name without characters outside `[a-z0-9_.-]`, aliases resolved.
    pub fn normalize(&self, name: &str) -> String {
        let name = name
            .chars()
            .map(|c| c.to_ascii_lowercase())
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
            .collect::<String>();
        self.aliases.get(&name).cloned().unwrap_or(name)
    }

    pub fn descriptor(&self, name: &str) -> Option<&AdapterDescriptor> {
        self.adapters.get(&self.normalize(name))
    }

    pub fn adapters(&self) -> impl Iterator<Item = &str> {
        self.adapters.keys().map(String::as_str)
    }

    /// True when a driver can be created for `name`.
    pub fn is_supported(&self, name: &str) -> bool {
        self.descriptor(name)
            .is_some_and(|v| v.has_role(Role::Driver) && v.available().is_ok())
    }

    /// Finds the value `pick` extracts from the adapter, then from its
    /// fallbacks in order. `None` when nobody provides it.
    fn resolve<T>(
        &self,
        descriptor: &AdapterDescriptor,
        role: Role,
        pick: impl Fn(&AdapterDescriptor) -> Option<T>,
    ) -> Option<T> {
        if let Some(value) = pick(descriptor) {
            return Some(value);
        }
        descriptor.fallbacks.iter().find_map(|fallback| {
            let value = self.adapters.get(fallback).and_then(&pick)?;
            log::warn!(
                "The `{}` adapter has no {}, using the one of `{}`",
                descriptor.name,
                role,
                fallback
            );
            Some(value)
        })
    }

    fn require(&self, name: &str, role: Role) -> Result<&AdapterDescriptor> {
        let normalized = self.normalize(name);
        self.adapters.get(&normalized).ok_or_else(|| {
            let error = Error::unsupported(normalized.clone(), role);
            log::error!("{:#}", error);
            error
        })
    }

    /// Descriptor of an adapter able to create drivers.
    fn require_driver(&self, name: &str, role: Role) -> Result<&AdapterDescriptor> {
        let descriptor = self.require(name, role)?;
        if self.resolve(descriptor, Role::Driver, |v| v.writer.clone()).is_none() {
            let error = Error::unsupported(descriptor.name.clone(), role);
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(descriptor)
    }

    /// Creates a driver, the adapter's availability probe must pass.
    pub fn get_driver(&self, name: &str, options: DriverOptions) -> Result<Rc<DatabaseDriver>> {
        let descriptor = self.require_driver(name, Role::Driver)?;
        if let Err(reason) = descriptor.available() {
            let error = Error::unsupported_because(descriptor.name.clone(), Role::Driver, reason);
            log::error!("{:#}", error);
            return Err(error);
        }
        let writer = self
            .resolve(descriptor, Role::Driver, |v| v.writer.clone())
            .ok_or_else(|| Error::unsupported(descriptor.name.clone(), Role::Driver))?;
        let connector = self.resolve(descriptor, Role::Driver, |v| v.connector.clone());
        let mut options = options;
        options.driver = descriptor.name.clone();
        let driver = DatabaseDriver::new(descriptor.name.clone(), writer, options, connector);
        driver.set_shapes(self.shapes.clone());
        Ok(Rc::new(driver))
    }

    /// Creates a driver from a connection url, the scheme names the adapter.
    pub fn get_driver_from_url(&self, url: &str) -> Result<Rc<DatabaseDriver>> {
        let options = DriverOptions::from_url(url)?;
        let name = options.driver.clone();
        self.get_driver(&name, options)
    }

    /// Query builder for the adapter's dialect.
    ///
    /// A [`Query`] keeps no reference to a driver, it only holds a writer.
    /// The writer of `driver` is used when the adapter has none of its own,
    /// otherwise `driver` is ignored and the query is run by handing it to
    /// [`DatabaseDriver::set_query`].
    pub fn get_query(&self, name: &str, driver: Option<&Rc<DatabaseDriver>>) -> Result<Query> {
        let descriptor = self.require(name, Role::Query)?;
        if let Some(writer) = self.resolve(descriptor, Role::Query, |v| v.writer.clone()) {
            return Ok(Query::new(writer));
        }
        match driver {
            Some(driver) => Ok(driver.get_query()),
            None => {
                let error = Error::unsupported(descriptor.name.clone(), Role::Query);
                log::error!("{:#}", error);
                Err(error)
            }
        }
    }

    pub fn get_exporter(
        &self,
        name: &str,
        driver: Option<Rc<DatabaseDriver>>,
    ) -> Result<DatabaseExporter> {
        let descriptor = self.require_driver(name, Role::Exporter)?;
        Ok(
            match self.resolve(descriptor, Role::Exporter, |v| v.exporter.clone()) {
                Some(factory) => factory(driver),
                None => DatabaseExporter::new(driver),
            },
        )
    }

    pub fn get_importer(
        &self,
        name: &str,
        driver: Option<Rc<DatabaseDriver>>,
    ) -> Result<DatabaseImporter> {
        let descriptor = self.require_driver(name, Role::Importer)?;
        Ok(
            match self.resolve(descriptor, Role::Importer, |v| v.importer.clone()) {
                Some(factory) => factory(driver),
                None => DatabaseImporter::new(driver),
            },
        )
    }

    /// Result iterator over `statement`, the generic one when the adapter has none.
    pub fn get_iterator(
        &self,
        name: &str,
        statement: Box<dyn StatementHandle>,
        key_column: Option<&str>,
        class_name: Option<&str>,
    ) -> Result<DatabaseIterator> {
        let factory = self
            .descriptor(name)
            .and_then(|v| self.resolve(v, Role::Iterator, |v| v.iterator.clone()));
        match factory {
            Some(factory) => factory(statement, key_column, class_name, &self.shapes),
            None => DatabaseIterator::new(statement, key_column, class_name, &self.shapes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn normalize_names() {
        let factory = DatabaseFactory::new();
        assert_eq!(factory.normalize("MySQLi"), "mysqli");
        assert_eq!(factory.normalize("PostgreSQL"), "pgsql");
        assert_eq!(factory.normalize("ms sql!"), "sqlsrv");
        assert_eq!(factory.normalize("../x"), "..x");
    }

    #[test]
    fn probe_runs_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut factory = DatabaseFactory::empty();
        factory.register(
            AdapterDescriptor::new("oracle")
                .with_dialect(crate::dialect::GENERIC)
                .with_probe(move || {
                    counter.set(counter.get() + 1);
                    Err("client library not installed".into())
                }),
        );
        for _ in 0..3 {
            assert!(matches!(
                factory.get_driver("oracle", DriverOptions::new("oracle")),
                Err(Error::UnsupportedAdapter { reason: Some(..), .. })
            ));
        }
        assert!(!factory.is_supported("oracle"));
        assert_eq!(calls.get(), 1);
    }
}
