use satchel::{MemoryBackend, Options, Satchel};
use satchel_logger::{LevelFilter, LogFormat, Logger};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn swallowed_failures_are_logged() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder("satchel-failures")
        .level(LevelFilter::WARN)
        .satchel_level(LevelFilter::DEBUG)
        .file(&log_dir, LogFormat::Json)
        .init()?;

    let satchel = Satchel::builder().backend(MemoryBackend::with_quota(16)).build();
    assert!(satchel.set("small", &1, None));
    assert!(!satchel.set("large", &"z".repeat(64), None));
    assert!(satchel.set("sealed", "x", Some(&Options::new().encrypt(true).secret(5))));
    assert!(satchel.get::<String>("sealed", Some(&Options::new().encrypt(true).secret(6))).is_some());

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let contents = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .map(fs::read_to_string)
        .collect::<Result<String, _>>()?;

    assert!(contents.contains("Store available"), "lifecycle event expected: {contents}");
    assert!(contents.contains("Operation failed"), "swallowed write failure expected: {contents}");
    assert!(contents.contains("QuotaExceeded") || contents.contains("quota"), "cause expected: {contents}");
    assert!(contents.contains("De-obfuscation failed"), "cipher fallback expected: {contents}");
    Ok(())
}
