//! Tests for core types

use recipe_config::{ConfigurationState, OptionValue};
use recipe_package::{
    Condition, Error, PackageRef, RequirementEntry, RequirementSource,
};

mod package_ref {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let reference = PackageRef::parse("openssl/3.2.1").unwrap();
        assert_eq!(reference.name, "openssl");
        assert_eq!(reference.version, "3.2.1");
        assert!(reference.user.is_none());
        assert!(reference.revision.is_none());
    }

    #[test]
    fn test_parse_full() {
        let reference = PackageRef::parse("yaml-cpp/0.8.0@covent/stable#a1b2c3").unwrap();
        assert_eq!(reference.name, "yaml-cpp");
        assert_eq!(reference.user.as_deref(), Some("covent"));
        assert_eq!(reference.channel.as_deref(), Some("stable"));
        assert_eq!(reference.revision.as_deref(), Some("a1b2c3"));
    }

    #[test]
    fn test_display_round_trip() {
        for input in ["fmt/10.2.1", "gtest/1.12.1@org/testing"] {
            assert_eq!(PackageRef::parse(input).unwrap().to_string(), input);
        }
    }

    #[test]
    fn test_parse_invalid() {
        for input in ["", "openssl", "/3.2.1", "Open SSL/3.2.1", "fmt/1/2"] {
            assert!(
                matches!(PackageRef::parse(input), Err(Error::InvalidPackageSpec(_))),
                "{} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_from_str() {
        let reference: PackageRef = "libevent/2.1.12".parse().unwrap();
        assert_eq!(reference, PackageRef::new("libevent", "2.1.12"));
    }
}

mod condition {
    use super::*;
    use indexmap::IndexMap;

    fn state() -> ConfigurationState {
        let mut values = IndexMap::new();
        values.insert("tests".to_string(), OptionValue::Bool(false));
        values.insert("sentry".to_string(), OptionValue::Bool(true));
        values.insert("backend".to_string(), OptionValue::str("inproc"));
        ConfigurationState::new(values)
    }

    #[test]
    fn test_nested() {
        let condition = Condition::All(vec![
            Condition::enabled("sentry"),
            Condition::Any(vec![
                Condition::enabled("tests"),
                Condition::equals("backend", "inproc"),
            ]),
        ]);
        assert!(condition.evaluate(&state()).unwrap());
        assert_eq!(
            condition.to_string(),
            "all(sentry, any(tests, backend == inproc))"
        );
    }

    #[test]
    fn test_disabled() {
        assert!(Condition::disabled("tests").evaluate(&state()).unwrap());
        assert!(!Condition::disabled("sentry").evaluate(&state()).unwrap());
    }

    #[test]
    fn test_options_referenced() {
        let condition = Condition::All(vec![
            Condition::enabled("sentry"),
            Condition::disabled("tests"),
        ]);
        assert_eq!(condition.options(), vec!["sentry", "tests"]);
        assert!(Condition::Always.options().is_empty());
    }
}

mod requirement_entry {
    use super::*;

    #[test]
    fn test_from_data_keeps_order() {
        let entries = RequirementEntry::from_data(&["openssl/3.2.1", "fmt/10.2.1"]).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.reference.name.as_str()).collect();
        assert_eq!(names, vec!["openssl", "fmt"]);
        assert!(entries.iter().all(|e| {
            e.source == RequirementSource::ExternalData && e.condition == Condition::Always
        }));
    }

    #[test]
    fn test_from_data_rejects_bad_reference() {
        let result = RequirementEntry::from_data(&["openssl/3.2.1", "spdlog"]);
        assert!(matches!(result, Err(Error::InvalidPackageSpec(s)) if s == "spdlog"));
    }
}
