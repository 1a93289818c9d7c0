//! Name to test case map, populated once at startup

use crate::test_case::TestCase;
use std::collections::BTreeMap;

#[derive(Default)]
pub struct Registry {
    tests: BTreeMap<&'static str, Box<dyn TestCase>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a test case. Registering the same name twice is a bug.
    pub fn register(&mut self, test: impl TestCase + 'static) {
        let name = test.name();
        if self.tests.insert(name, Box::new(test)).is_some() {
            panic!("Test case {} registered twice", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn TestCase> {
        self.tests.get(name).map(|test| test.as_ref())
    }

    /// Registered names, sorted
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tests.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn TestCase> + '_ {
        self.tests.values().map(|test| test.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Width that fits every `Name(api=... args)` this registry can print
    pub fn name_column_width(&self) -> usize {
        self.iter()
            .map(|test| {
                let arguments: usize = test
                    .arguments()
                    .iter()
                    .map(|spec| spec.name.len() + spec.default.len() + 2)
                    .sum();
                test.name().len() + "(api=host)".len() + arguments
            })
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArgumentError;
    use crate::statistics::Statistics;
    use crate::test_case::{ArgumentSpec, Benchmark, TestArguments};
    use cbench_backend::Backend;
    use cbench_shared::{Api, TestResult, TypeSelector};

    struct Dummy;

    impl Benchmark for Dummy {
        type Config = ();
        const NAME: &'static str = "Dummy";
        const DESCRIPTION: &'static str = "Does nothing";
        const ARGUMENTS: &'static [ArgumentSpec] = &[ArgumentSpec::new("size", "Bytes", "64")];
        const APIS: &'static [Api] = &[Api::Host];

        fn configure(&self, _args: &TestArguments) -> Result<(), ArgumentError> {
            Ok(())
        }

        fn type_selector(&self, _config: &()) -> TypeSelector {
            TypeSelector::time(false)
        }

        fn run(
            &self,
            _backend: &dyn Backend,
            _config: &(),
            _iterations: usize,
            _statistics: &dyn Statistics,
        ) -> cbench_backend::Result<TestResult> {
            Ok(TestResult::Success)
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());
        registry.register(Dummy);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Dummy"]);
        let test = registry.get("Dummy").unwrap();
        assert_eq!(test.description(), "Does nothing");
        assert!(test.has_implementation(Api::Host));
        assert!(!test.has_implementation(Api::OpenCl));
        assert!(registry.get("Missing").is_none());

        // "Dummy(api=host size=64)"
        assert_eq!(registry.name_column_width(), 23);
    }

    #[test]
    #[should_panic(expected = "Test case Dummy registered twice")]
    fn test_duplicate_registration_is_fatal() {
        let mut registry = Registry::new();
        registry.register(Dummy);
        registry.register(Dummy);
    }
}
