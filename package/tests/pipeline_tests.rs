//! End-to-end tests for the covent recipe pipeline

use assert_matches::assert_matches;
use recipe_config::{ConfigError, OptionValue, Overrides, RecipeData};
use recipe_package::settings::{Compiler, CompilerKind, CppStd, Settings, Standard};
use recipe_package::{
    CMakeToolchain, Condition, Error, IndexCall, Pipeline, Recipe, RecordingIndex,
    RequirementEntry, Resolution,
};
use tempfile::TempDir;

fn settings() -> Settings {
    Settings::new(Compiler::new(CompilerKind::Gcc, "13"))
        .with_cppstd(CppStd::new(Standard::Cpp20))
}

fn base(refs: &[&str]) -> Vec<RequirementEntry> {
    RequirementEntry::from_data(refs).unwrap()
}

fn run(overrides: &Overrides, refs: &[&str]) -> recipe_package::Result<Resolution> {
    let recipe = Recipe::covent().unwrap();
    Pipeline::new(&recipe).run(overrides, &base(refs), &settings())
}

fn options(tests: bool, sentry: bool, shared: bool) -> Overrides {
    Overrides::new()
        .set("tests", tests)
        .set("sentry", sentry)
        .set("shared", shared)
}

mod resolution_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_static_build_without_telemetry() {
        let resolution = run(
            &options(true, false, false),
            &["openssl/3.2.1", "yaml-cpp/0.8.0"],
        )
        .unwrap();

        assert_eq!(
            resolution.requirement_refs(),
            vec!["openssl/3.2.1", "yaml-cpp/0.8.0", "gtest/1.12.1"]
        );
        assert!(resolution.overrides().is_empty());

        let vars: Vec<_> = resolution
            .toolchain_vars()
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        assert_eq!(
            vars,
            vec![
                ("COVENT_SENTRY", OptionValue::Bool(false)),
                ("COVENT_BUILD_TESTS", OptionValue::Bool(true)),
            ]
        );
    }

    #[test]
    fn test_defaults_enable_everything() {
        let resolution = run(&Overrides::new(), &["fmt/10.2.1", "spdlog/1.13.0"]).unwrap();

        assert_eq!(
            resolution.requirement_refs(),
            vec![
                "fmt/10.2.1",
                "spdlog/1.13.0",
                "sentry-native/0.7.11",
                "gtest/1.12.1"
            ]
        );

        let overrides = resolution.overrides();
        assert_eq!(overrides["fmt"]["shared"], OptionValue::Bool(true));
        assert_eq!(overrides["spdlog"]["shared"], OptionValue::Bool(true));
        assert_eq!(overrides["sentry-native"]["shared"], OptionValue::Bool(true));
        assert_eq!(
            overrides["sentry-native"]["backend"],
            OptionValue::str("inproc")
        );
        assert!(!overrides.contains_key("gtest"));
        assert_eq!(resolution.artifact().library_names, vec!["covent"]);
    }

    #[test]
    fn test_telemetry_toggles_sentry_native() {
        let with = run(&options(false, true, false), &[]).unwrap();
        assert_eq!(with.requirement_refs(), vec!["sentry-native/0.7.11"]);
        assert_eq!(
            with.overrides()["sentry-native"]["backend"],
            OptionValue::str("inproc")
        );
        assert!(with.overrides()["sentry-native"].get("shared").is_none());

        let without = run(&options(false, false, false), &[]).unwrap();
        assert!(without.requirements().is_empty());
        assert!(without.overrides().is_empty());
    }

    #[test]
    fn test_string_spellings_are_accepted() {
        let resolution = run(
            &Overrides::parse_all(&["tests=False", "sentry=false", "shared=True"]).unwrap(),
            &["libevent/2.1.12"],
        )
        .unwrap();
        assert_eq!(resolution.requirement_refs(), vec!["libevent/2.1.12"]);
        assert_eq!(
            resolution.overrides()["libevent"]["shared"],
            OptionValue::Bool(true)
        );
        assert_eq!(resolution.state().value("tests"), Some(&OptionValue::Bool(false)));
    }

    #[test]
    fn test_identical_inputs_give_identical_output() {
        let overrides = options(true, true, true);
        let refs = ["openssl/3.2.1", "libevent/2.1.12", "fmt/10.2.1"];

        let first = run(&overrides, &refs).unwrap();
        let second = run(&overrides, &refs).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_json_pretty().unwrap(), second.to_json_pretty().unwrap());
    }

    #[test]
    fn test_run_with_data() {
        let data = RecipeData::parse(
            r#"
requirements = ["openssl/3.2.1", "yaml-cpp/0.8.0"]
"#,
        )
        .unwrap();
        let recipe = Recipe::covent().unwrap();
        let resolution = Pipeline::new(&recipe)
            .run_with_data(&options(false, false, false), &data, &settings())
            .unwrap();
        assert_eq!(
            resolution.requirement_refs(),
            vec!["openssl/3.2.1", "yaml-cpp/0.8.0"]
        );
    }

    #[test]
    fn test_missing_data_key_means_no_base_requirements() {
        let data = RecipeData::parse("").unwrap();
        let recipe = Recipe::covent().unwrap();
        let resolution = Pipeline::new(&recipe)
            .run_with_data(&options(true, false, false), &data, &settings())
            .unwrap();
        assert_eq!(resolution.requirement_refs(), vec!["gtest/1.12.1"]);
    }

    #[test]
    fn test_json_report() {
        let resolution = run(&options(false, false, true), &["fmt/10.2.1"]).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&resolution.to_json_pretty().unwrap()).unwrap();

        assert_eq!(json["requirements"], serde_json::json!(["fmt/10.2.1"]));
        assert_eq!(json["options"]["shared"], serde_json::json!(true));
        assert_eq!(
            json["dependency_options"]["fmt"]["shared"],
            serde_json::json!(true)
        );
        assert_eq!(json["toolchain_vars"]["COVENT_SENTRY"], serde_json::json!(false));
        assert_eq!(
            json["artifact"]["library_names"],
            serde_json::json!(["covent"])
        );
    }
}

mod failure_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_value_outside_domain() {
        let err = run(&Overrides::new().set("sentry", "maybe"), &[]).unwrap_err();
        assert_matches!(
            err,
            Error::Config(ConfigError::InvalidOption { name, .. }) if name == "sentry"
        );
    }

    #[test]
    fn test_undeclared_option() {
        let err = run(&Overrides::new().set("fPIC", true), &[]).unwrap_err();
        assert_matches!(
            err,
            Error::Config(ConfigError::InvalidOption { name, .. }) if name == "fPIC"
        );
    }

    #[test]
    fn test_old_standard_is_rejected() {
        let recipe = Recipe::covent().unwrap();
        let settings = Settings::new(Compiler::new(CompilerKind::Gcc, "13"))
            .with_cppstd(CppStd::new(Standard::Cpp17));
        let err = Pipeline::new(&recipe)
            .run(&Overrides::new(), &[], &settings)
            .unwrap_err();
        assert_matches!(
            err,
            Error::UnsupportedEnvironment { precondition, .. }
                if precondition == "minimum cppstd 20"
        );
    }

    #[test]
    fn test_compiler_default_standard_is_too_old() {
        let recipe = Recipe::covent().unwrap();
        let settings = Settings::new(Compiler::new(CompilerKind::Gcc, "13"));
        let err = Pipeline::new(&recipe)
            .run(&Overrides::new(), &[], &settings)
            .unwrap_err();
        assert_matches!(err, Error::UnsupportedEnvironment { .. });
    }

    #[test]
    fn test_gnu_extensions_satisfy_minimum() {
        let recipe = Recipe::covent().unwrap();
        let settings = Settings::new(Compiler::new(CompilerKind::Clang, "17"))
            .with_cppstd(CppStd::gnu(Standard::Cpp23));
        assert!(Pipeline::new(&recipe)
            .run(&Overrides::new(), &[], &settings)
            .is_ok());
    }

    #[test]
    fn test_duplicate_gtest() {
        let err = run(&options(true, false, false), &["gtest/1.14.0"]).unwrap_err();
        assert_matches!(
            err,
            Error::DuplicateRequirement { package, first, second }
                if package == "gtest" && first == "gtest/1.14.0" && second == "gtest/1.12.1"
        );
    }

    #[test]
    fn test_duplicate_only_when_selected() {
        let resolution = run(&options(false, false, false), &["gtest/1.14.0"]).unwrap();
        assert_eq!(resolution.requirement_refs(), vec!["gtest/1.14.0"]);
    }

    #[test]
    fn test_override_on_unrequired_package() {
        let overrides =
            options(false, false, false).set_dependency("sentry-native", "backend", "breakpad");
        let err = run(&overrides, &[]).unwrap_err();
        assert_matches!(
            err,
            Error::Propagation { package, option }
                if package == "sentry-native" && option == "backend"
        );
    }

    #[test]
    fn test_conflicting_rules() {
        let recipe = Recipe::builder("covent", "0.1.0")
            .option("shared", recipe_config::OptionDomain::Boolean, true)
            .requires("fmt/10.2.1", Condition::Always)
            .cascade("shared", "shared")
            .pin(Condition::Always, "fmt", "shared", false)
            .build()
            .unwrap();
        let err = Pipeline::new(&recipe)
            .run(&Overrides::new(), &[], &settings())
            .unwrap_err();
        assert_matches!(err, Error::ConflictingOverride { package, .. } if package == "fmt");
    }
}

mod caller_override_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_caller_override_cannot_replace_pin() {
        let overrides =
            options(false, true, false).set_dependency("sentry-native", "backend", "breakpad");
        let err = run(&overrides, &[]).unwrap_err();
        assert_matches!(
            err,
            Error::ConflictingOverride { package, option, .. }
                if package == "sentry-native" && option == "backend"
        );
    }

    #[test]
    fn test_static_dependency_under_shared_build_is_rejected() {
        let overrides = Overrides::parse_all(&["shared=True", "openssl:shared=False"]).unwrap();
        let err = run(&overrides, &["openssl/3.2.1", "yaml-cpp/0.8.0"]).unwrap_err();
        assert_matches!(
            err,
            Error::ConflictingOverride { package, option, first, second }
                if package == "openssl"
                    && option == "shared"
                    && first == "True"
                    && second == "False"
        );
    }

    #[test]
    fn test_shared_build_keeps_every_dependency_shared() {
        let overrides = Overrides::parse_all(&["shared=True", "yaml-cpp:shared=True"]).unwrap();
        let resolution = run(&overrides, &["openssl/3.2.1", "yaml-cpp/0.8.0"]).unwrap();

        for package in ["openssl", "yaml-cpp", "sentry-native"] {
            assert_eq!(
                resolution.overrides()[package]["shared"],
                OptionValue::Bool(true),
                "{} should be shared",
                package
            );
        }

        let json: serde_json::Value =
            serde_json::from_str(&resolution.to_json_pretty().unwrap()).unwrap();
        assert_eq!(
            json["dependency_options"]["yaml-cpp"]["shared"],
            serde_json::json!(true)
        );
    }

    #[test]
    fn test_glob_override_reaches_every_match() {
        let overrides =
            Overrides::parse_all(&["tests=True", "sentry=False", "shared=False", "*:shared=False"])
                .unwrap();
        let resolution = run(&overrides, &["openssl/3.2.1"]).unwrap();

        assert_eq!(
            resolution.overrides()["openssl"]["shared"],
            OptionValue::Bool(false)
        );
        assert_eq!(
            resolution.overrides()["gtest"]["shared"],
            OptionValue::Bool(false)
        );
    }

    #[test]
    fn test_glob_override_against_cascade_is_rejected() {
        let overrides = Overrides::parse_all(&["sentry=False", "*:shared=False"]).unwrap();
        let err = run(&overrides, &["openssl/3.2.1"]).unwrap_err();
        assert_matches!(err, Error::ConflictingOverride { package, .. } if package == "openssl");
    }

    #[test]
    fn test_glob_without_match_is_ignored() {
        let overrides = options(false, false, false).set_dependency("boost*", "shared", false);
        let resolution = run(&overrides, &["fmt/10.2.1"]).unwrap();
        assert!(resolution.overrides().is_empty());
    }
}

mod hand_off_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_index_receives_requires_then_configure() {
        let resolution = run(&options(false, true, true), &["fmt/10.2.1"]).unwrap();
        let mut index = RecordingIndex::new();
        resolution.hand_off(&mut index).unwrap();

        let calls: Vec<String> = index.calls().iter().map(|c| c.to_string()).collect();
        assert_eq!(
            calls,
            vec![
                "requires fmt/10.2.1",
                "requires sentry-native/0.7.11",
                "configure fmt:shared=True",
                "configure sentry-native:backend=inproc",
                "configure sentry-native:shared=True",
            ]
        );
        assert_matches!(
            &index.calls()[0],
            IndexCall::Requires { reference } if reference == "fmt/10.2.1"
        );
    }

    #[test]
    fn test_generate_toolchain_file() {
        let temp = TempDir::new().unwrap();
        let resolution = run(&options(true, false, false), &[]).unwrap();

        let path = resolution
            .generate(&CMakeToolchain::new(temp.path().join("generators")), &settings())
            .unwrap();
        assert_eq!(path, temp.path().join("generators").join(CMakeToolchain::FILE_NAME));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("set(CMAKE_CXX_STANDARD 20)"));
        assert!(content.contains("set(COVENT_SENTRY OFF CACHE BOOL \"\")"));
        assert!(content.contains("set(COVENT_BUILD_TESTS ON CACHE BOOL \"\")"));
    }
}
