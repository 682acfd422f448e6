//! End-to-end scans through the native loader.
//!
//! Only files that can never be valid modules are used here, so the results
//! are the same on every platform.

use module_loader::{
    load_module_path_list, load_modules, LoadOutcome, ModuleError, PATH_LIST_SEPARATOR,
};
use std::fs;
use std::path::PathBuf;

fn write_text(path: &PathBuf) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, "plain text, not a module\n").unwrap();
}

#[test]
fn test_text_files_fail_without_interrupting_scan() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("a.txt");
    let nested = dir.path().join("c").join("d.txt");
    write_text(&first);
    write_text(&nested);

    let report = load_module_path_list(dir.path().to_str().unwrap());

    assert_eq!(report.attempted(), 2);
    assert_eq!(report.failed(), 2);
    assert_eq!(report.loaded(), 0);

    let mut failed: Vec<PathBuf> = report.errors().map(|e| e.path().to_path_buf()).collect();
    failed.sort();
    assert_eq!(failed, vec![first, nested]);
}

#[test]
fn test_missing_and_present_entries_together() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let text = dir.path().join("notes.txt");
    write_text(&text);

    let value = format!(
        "{}{}{}",
        missing.display(),
        PATH_LIST_SEPARATOR,
        text.display()
    );
    let report = load_module_path_list(&value);

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(
        report.outcomes[0],
        LoadOutcome::Failed(ModuleError::PathNotFound(missing))
    );
    assert!(matches!(
        &report.outcomes[1],
        LoadOutcome::Failed(ModuleError::LoadFailed { path, .. }) if *path == text
    ));
}

#[test]
fn test_variable_is_read_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let text = dir.path().join("only.txt");
    write_text(&text);

    let var = "MODULE_LOADER_IT_MODULE_PATH";
    std::env::set_var(var, dir.path());
    let report = load_modules(var);
    std::env::remove_var(var);

    assert_eq!(report.failed(), 1);
    assert_eq!(report.errors().next().unwrap().path(), text.as_path());
}

#[test]
fn test_empty_variable_is_a_no_op() {
    let var = "MODULE_LOADER_IT_EMPTY_PATH";
    std::env::set_var(var, "");
    let report = load_modules(var);
    std::env::remove_var(var);

    assert!(report.is_empty());
}
