use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

fn nova() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("nova"))
}

/// A class directory holding `app/Main.class` and `app/util/Strings.class`.
/// Only the layout matters to `find` and `ls`.
fn class_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.child("app/Main.class").write_binary(b"\xCA\xFE\xBA\xBE").unwrap();
    temp.child("app/Main$Inner.class").write_binary(b"\xCA\xFE\xBA\xBE").unwrap();
    temp.child("app/util/Strings.class").write_binary(b"\xCA\xFE\xBA\xBE").unwrap();
    temp
}

#[test]
fn help_mentions_core_commands() {
    nova().arg("--help").assert().success().stdout(
        predicate::str::contains("find")
            .and(predicate::str::contains("ls"))
            .and(predicate::str::contains("class")),
    );
}

#[test]
fn find_reports_the_owning_entry() {
    let classes = class_dir();
    let output = nova()
        .current_dir(classes.path())
        .arg("find")
        .arg("app.Main$Inner")
        .arg("--classpath")
        .arg(classes.path())
        .arg("--json")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["found"], true);
    assert_eq!(v["path"], "app/Main$Inner.class");
    assert_eq!(v["entry"].as_str().unwrap(), classes.path().to_str().unwrap());
}

#[test]
fn find_exits_with_one_when_missing() {
    let classes = class_dir();
    nova()
        .current_dir(classes.path())
        .args(["find", "app.Missing", "--classpath"])
        .arg(classes.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found: app.Missing"));
}

#[test]
fn ls_lists_direct_package_members() {
    let classes = class_dir();
    nova()
        .current_dir(classes.path())
        .args(["ls", "app", "--classpath"])
        .arg(classes.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Main.class")
                .and(predicate::str::contains("Main$Inner.class"))
                .and(predicate::str::contains("Strings.class").not()),
        );
}

#[test]
fn config_file_supplies_the_classpath() {
    let project = TempDir::new().unwrap();
    project
        .child("classes/app/Main.class")
        .write_binary(b"\xCA\xFE\xBA\xBE")
        .unwrap();
    project
        .child("nova.toml")
        .write_str("[classpath]\nentries = [\"classes\"]\n")
        .unwrap();

    nova()
        .current_dir(project.path())
        .args(["find", "app.Main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("app/Main.class"));
}

#[test]
fn invalid_config_fails_with_exit_code_two() {
    let project = TempDir::new().unwrap();
    project.child("nova.toml").write_str("[nope]\n").unwrap();

    nova()
        .current_dir(project.path())
        .args(["ls", "app"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn class_describes_jdk_model_types() {
    let temp = TempDir::new().unwrap();
    let output = nova()
        .current_dir(temp.path())
        .args(["class", "java.lang.String", "--json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["name"], "java.lang.String");
    assert_eq!(v["kind"], "class");
    assert_eq!(v["super_class"], "java.lang.Object");
    let interfaces = v["interfaces"].as_array().unwrap();
    assert!(interfaces.iter().any(|i| i == "java.lang.Comparable<java.lang.String>"));
    let methods = v["methods"].as_array().unwrap();
    assert!(methods.iter().any(|m| m == "int length()"));
    let constructors = v["constructors"].as_array().unwrap();
    assert!(constructors.iter().any(|c| c == "String(char[])"));
}

#[test]
fn class_prints_a_readable_summary() {
    let temp = TempDir::new().unwrap();
    nova()
        .current_dir(temp.path())
        .args(["class", "java.util.ArrayList"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("class java.util.ArrayList<E>")
                .and(predicate::str::contains("implements: java.util.List<E>"))
                .and(predicate::str::contains("E get(int)")),
        );
}

#[test]
fn unknown_classes_fail() {
    let temp = TempDir::new().unwrap();
    nova()
        .current_dir(temp.path())
        .args(["class", "com.example.Nope"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("class not found: com.example.Nope"));
}

#[test]
fn jdk_model_can_be_disabled() {
    let temp = TempDir::new().unwrap();
    nova()
        .current_dir(temp.path())
        .args(["class", "java.lang.String", "--no-jdk-model"])
        .assert()
        .code(2);
}
