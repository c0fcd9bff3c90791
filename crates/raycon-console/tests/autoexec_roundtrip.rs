//! End-to-end autoexec replay and rewrite through the public API.

use std::fs;

use raycon_console::{
    Argument, AutoexecManager, AutoexecStatus, CallMethod, CommandManager, GetSet, VariableSlot,
};

const SCRIPT: &str = "// render settings\nSetSamples(4)\nwatch Speed(1.0)\n";

fn commands(speed: &VariableSlot<f32>) -> CommandManager {
    let mut manager = CommandManager::with_builtins();
    manager.add_command(Box::new(GetSet::new("Speed", speed.clone())));
    manager.add_command(Box::new(
        CallMethod::new("SetSamples", |args| Ok(args[0].clone())).with_arity(1),
    ));
    manager
}

#[test]
fn watched_value_is_written_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("autoexec.cfg");
    fs::write(&path, SCRIPT).unwrap();

    let speed = VariableSlot::new(0.0f32);
    let manager = commands(&speed);
    let mut autoexec = AutoexecManager::new();
    let status = autoexec.parse_autoexec(&path, &manager).unwrap();
    assert_eq!(status, AutoexecStatus::Loaded { statements: 2 });
    assert_eq!(speed.get(), 1.0);

    manager.execute_command("Speed(2.0)").unwrap();
    assert!(autoexec.write_autoexec(&path, &manager));

    let written = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines, ["// render settings", "SetSamples(4)", "watch Speed(2.0)"]);
}

#[test]
fn removed_watch_drops_its_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("autoexec.cfg");
    fs::write(&path, SCRIPT).unwrap();

    let speed = VariableSlot::new(0.0f32);
    let manager = commands(&speed);
    let mut autoexec = AutoexecManager::new();
    autoexec.parse_autoexec(&path, &manager).unwrap();

    assert!(autoexec.remove_watch("Speed"));
    assert!(autoexec.write_autoexec(&path, &manager));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "// render settings\nSetSamples(4)\n"
    );

    // replaying the rewritten file no longer sets or watches Speed
    let fresh = VariableSlot::new(0.0f32);
    let manager = commands(&fresh);
    let mut autoexec = AutoexecManager::new();
    autoexec.parse_autoexec(&path, &manager).unwrap();
    assert_eq!(fresh.get(), 0.0);
    assert!(autoexec.watches(&manager).is_empty());
}

#[test]
fn rewrite_survives_a_second_round() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("autoexec.cfg");
    fs::write(&path, SCRIPT).unwrap();

    let speed = VariableSlot::new(0.0f32);
    let manager = commands(&speed);
    for value in ["2.5", "3.0"] {
        let mut autoexec = AutoexecManager::new();
        autoexec.parse_autoexec(&path, &manager).unwrap();
        manager.execute_command(&format!("Speed({value})")).unwrap();
        assert!(autoexec.write_autoexec(&path, &manager));
    }
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "// render settings\nSetSamples(4)\nwatch Speed(3.0)\n"
    );
    assert_eq!(Argument::from_literal("3.0").to::<f32>().unwrap(), speed.get());
}
