use build_stats::resolve_dir;
use tempfile::tempdir;

#[test]
fn resolve_dir_keeps_absolute_directories() {
    let tmp = tempdir().expect("tempdir");
    assert_eq!(resolve_dir(tmp.path()).expect("resolve"), tmp.path());
}

#[test]
fn resolve_dir_rejects_missing_directories() {
    let tmp = tempdir().expect("tempdir");
    let err = resolve_dir(&tmp.path().join("missing")).unwrap_err();
    assert!(err.to_string().contains("Directory does not exist"), "unexpected error: {err}");
}

#[test]
fn resolve_dir_rejects_files() {
    let tmp = tempdir().expect("tempdir");
    let file = tmp.path().join("file.txt");
    std::fs::write(&file, "x").expect("write file");
    assert!(resolve_dir(&file).is_err());
}
