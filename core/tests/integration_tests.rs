use std::fs;
use std::sync::{Arc, Mutex};

use cmdkit_core::{
    Action, App, BoolType, Command, DispatchError, ErrorReason, InputError, NumberType, Opt,
    PathType, SchemaError, SchemaFile, ScriptedConsole, StringType, Value, parse,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type Log = Arc<Mutex<Vec<String>>>;

fn say() -> Action {
    Action::new("say")
        .unwrap()
        .description("Say hello")
        .with_option(
            Opt::new("name")
                .unwrap()
                .flag('n')
                .unwrap()
                .with_default("John Doe"),
        )
        .unwrap()
        .with_option(Opt::new("age").unwrap().number().with_default(18))
        .unwrap()
}

fn recording_app(log: &Log) -> App {
    let sink = Arc::clone(log);
    App::new("kli")
        .with_command(
            Command::new("hello")
                .unwrap()
                .with_action(say())
                .unwrap()
                .handler(move |action, args| {
                    let rendered: Vec<String> =
                        args.iter().map(|(k, v)| format!("{k}={v}")).collect();
                    sink.lock()
                        .unwrap()
                        .push(format!("{} {}", action.name(), rendered.join(" ")));
                    Ok(())
                }),
        )
        .unwrap()
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[test]
fn test_say_scenario_defaults_and_overrides() {
    let action = say();

    let args = parse::<&str>(&action, &[]).unwrap();
    assert_eq!(args.get("name"), Some(&Value::from("John Doe")));
    assert_eq!(args.get("age"), Some(&Value::Number(18.0)));

    let args = parse(&action, &["--name=Harry", "--age=25"]).unwrap();
    assert_eq!(args.get_str("name"), Some("Harry"));
    assert_eq!(args.get_number("age"), Some(25.0));
}

#[test]
fn test_bool_case_insensitive_and_flag_agree() {
    let action = Action::new("deploy")
        .unwrap()
        .with_option(Opt::new("yes").unwrap().flag('y').unwrap().boolean())
        .unwrap();
    let a = parse(&action, &["--yes=y"]).unwrap();
    let b = parse(&action, &["-y=Y"]).unwrap();
    let c = parse(&action, &["-y"]).unwrap();
    assert_eq!(a.get_bool("yes"), Some(true));
    assert_eq!(a.get("yes"), b.get("yes"));
    assert_eq!(b.get("yes"), c.get("yes"));
}

#[test]
fn test_number_round_trip_within_bounds() {
    let action = Action::new("scale")
        .unwrap()
        .with_option(
            Opt::new("factor")
                .unwrap()
                .with_type(NumberType::new().min(-2.0).unwrap().max(2.0).unwrap()),
        )
        .unwrap();
    for x in [-2.0, -0.5, 0.0, 1.25, 2.0] {
        let token = format!("--factor={x}");
        let args = parse(&action, &[token.as_str()]).unwrap();
        assert_eq!(args.get_number("factor"), Some(x));
    }
}

#[test]
fn test_string_bounds_reasons() {
    let action = Action::new("login")
        .unwrap()
        .with_option(
            Opt::new("user")
                .unwrap()
                .with_type(StringType::new().min(3).unwrap().max(5).unwrap()),
        )
        .unwrap();
    let short = parse(&action, &["--user=ab"]).unwrap_err();
    let long = parse(&action, &["--user=abcdef"]).unwrap_err();
    assert_eq!(short.reason(), Some(ErrorReason::LengthBelowMin));
    assert_eq!(long.reason(), Some(ErrorReason::LengthAboveMax));
}

#[test]
fn test_copy_like_action_with_paths_and_offsets() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    fs::write(dir.path().join("b.txt"), "b").unwrap();
    let target = dir.path().join("out");
    fs::create_dir(&target).unwrap();

    let copy = Action::new("copy")
        .unwrap()
        .with_option(
            Opt::new("sources")
                .unwrap()
                .with_type(PathType::new().file().multiple())
                .offsets(0, 1)
                .unwrap(),
        )
        .unwrap()
        .with_option(
            Opt::new("target")
                .unwrap()
                .with_type(PathType::new().dir())
                .required()
                .offset(2),
        )
        .unwrap()
        .with_option(Opt::new("force").unwrap().flag('f').unwrap().with_type(BoolType::new()))
        .unwrap();

    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    let tokens = [
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        target.to_str().unwrap(),
        "-f",
        "--",
        "extra",
    ];
    let args = parse(&copy, &tokens).unwrap();
    assert_eq!(args.get("sources").unwrap().as_list().unwrap().len(), 2);
    assert_eq!(
        args.get_path("target"),
        Some(fs::canonicalize(&target).unwrap().as_path())
    );
    assert_eq!(args.get_bool("f"), Some(true));
    assert_eq!(args.anonymous(), ["extra"]);

    let err = parse(&copy, &[a.to_str().unwrap()]).unwrap_err();
    assert!(matches!(err, InputError::MissingOption { ref option, .. } if option == "--target"));
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[test]
fn test_execute_string_like_invocation() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let app = recording_app(&log);
    let mut console = ScriptedConsole::default();

    app.execute_line("hello say --name=Harry --age=25", &mut console)
        .unwrap();
    app.execute_line("hello say -n='Ron Weasley'", &mut console)
        .unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        ["say name=Harry age=25", "say name=Ron Weasley age=18"]
    );

    let err = app.execute_line("hey", &mut console).unwrap_err();
    assert_eq!(err.to_string(), "unknown command: hey");
    let err = app.execute_line("hello talk", &mut console).unwrap_err();
    assert_eq!(err.to_string(), "hello: unknown action \"talk\"");
}

#[test]
fn test_prompt_during_dispatch() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let app = App::new("kli")
        .with_command(
            Command::new("auth")
                .unwrap()
                .with_action(
                    Action::new("login")
                        .unwrap()
                        .with_option(Opt::new("user").unwrap().required().offset(0))
                        .unwrap()
                        .with_option(
                            Opt::new("pin")
                                .unwrap()
                                .required()
                                .password()
                                .with_type(NumberType::new().integer()),
                        )
                        .unwrap()
                        .handler(move |_, args| {
                            sink.lock().unwrap().push(format!(
                                "{}:{}",
                                args.get_str("user").unwrap_or_default(),
                                args.get("pin").map(Value::to_string).unwrap_or_default()
                            ));
                            Ok(())
                        }),
                )
                .unwrap(),
        )
        .unwrap();

    let mut console = ScriptedConsole::new(["12a", "1234"]);
    app.execute(&["kli", "auth", "login", "alice"], &mut console)
        .unwrap();
    assert_eq!(*log.lock().unwrap(), ["alice:1234"]);
    assert_eq!(console.masked(), [true, true]);
    assert_eq!(console.errors().len(), 1);
}

#[test]
fn test_interactive_session() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let app = recording_app(&log).interactive(true);
    let mut console = ScriptedConsole::new([
        "hello say",
        "hello say --age=abc",
        "hello --help",
        "quit",
    ]);
    app.execute(&["kli"], &mut console).unwrap();
    assert_eq!(*log.lock().unwrap(), ["say name=John Doe age=18"]);
    assert_eq!(console.errors(), ["option \"--age\" requires a number as value."]);
    assert!(console.output()[0].contains("Actions:"));
}

#[test]
fn test_handler_error_is_not_input_error() {
    let app = App::new("kli")
        .with_command(
            Command::new("job")
                .unwrap()
                .with_action(
                    Action::new("run")
                        .unwrap()
                        .handler(|_, _| Err("disk full".into())),
                )
                .unwrap(),
        )
        .unwrap();
    let err = app
        .execute(&["kli", "job", "run"], &mut ScriptedConsole::default())
        .unwrap_err();
    assert!(matches!(err, DispatchError::Handler(_)));
}

// ---------------------------------------------------------------------------
// Schema files
// ---------------------------------------------------------------------------

#[test]
fn test_schema_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kli.yaml");
    fs::write(
        &path,
        r#"
title: kli
commands:
  - name: hello
    description: Greetings
    actions:
      - name: say
        options:
          - { name: name, flag: n, default: John Doe }
          - { name: age, type: { kind: number, integer: true }, default: 18 }
"#,
    )
    .unwrap();

    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let app = SchemaFile::load(&path)
        .unwrap()
        .build()
        .unwrap()
        .with_default_handler(move |_, args| {
            sink.lock().unwrap().push(serde_json::to_string(args)?);
            Ok(())
        });

    app.execute(&["kli", "hello", "say", "-n=Harry"], &mut ScriptedConsole::default())
        .unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        [r#"{"action":"say","named":{"name":"Harry","age":18.0},"anonymous":[]}"#]
    );
}

#[test]
fn test_schema_file_conflicts_are_schema_errors() {
    let yaml = r#"
title: kli
commands:
  - name: files
    actions:
      - name: copy
        options:
          - { name: sources, offsets: { at: 0, to: 1 } }
          - { name: target, offsets: { at: 1 } }
"#;
    let err = SchemaFile::from_yaml_str(yaml).unwrap().build().unwrap_err();
    assert!(matches!(err, SchemaError::OverlappingOffsets { .. }));
    assert_eq!(
        err.to_string(),
        "offsets [1, 1] of option \"target\" overlap offsets [0, 1] of option \"sources\" in action \"copy\""
    );
}
