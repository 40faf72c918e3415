use satchel::{ManualClock, MemoryBackend, Options, Satchel, SatchelError, global};
use serial_test::serial;
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

static CLOCK: OnceLock<ManualClock> = OnceLock::new();

fn installed() -> &'static Satchel {
    if let Some(satchel) = global::instance() {
        return satchel;
    }
    let clock = CLOCK.get_or_init(|| ManualClock::new(0)).clone();
    let satchel = Satchel::builder().backend(Arc::new(MemoryBackend::new())).clock(clock).build();
    // A parallel test may have won the race; either instance is fine.
    let _ = global::install(satchel);
    global::instance().unwrap()
}

#[test]
#[serial]
fn free_functions_delegate_to_installed_instance() {
    installed();
    assert!(global::clear(None));

    assert!(global::is_available());
    assert!(global::set("greeting", "hello", None));
    assert_eq!(global::get::<String>("greeting", None).as_deref(), Some("hello"));
    assert_eq!(global::keys(None).unwrap(), vec!["greeting".to_owned()]);

    assert!(global::remove("greeting", None));
    assert_eq!(global::get::<String>("greeting", None), None);
}

#[test]
#[serial]
fn ttl_and_flush_through_global() {
    installed();
    assert!(global::clear(None));
    let clock = CLOCK.get().unwrap();

    assert!(global::set("session", &7, Some(&Options::new().ttl_secs(1))));
    assert!(global::set("kept", &8, None));
    clock.advance(Duration::from_secs(2));

    assert!(global::flush(false, None));
    assert_eq!(global::keys(None).unwrap(), vec!["kept".to_owned()]);
}

#[test]
#[serial]
fn configure_changes_shared_defaults() {
    installed();
    assert!(global::clear(None));

    assert!(global::configure(|cfg| cfg.prefix = Some("app:".into())));
    assert_eq!(global::defaults().unwrap().prefix.as_deref(), Some("app:"));
    assert!(global::set("theme", "dark", None));
    assert_eq!(global::keys(Some(&Options::new().no_prefix())).unwrap(), vec!["app:theme".to_owned()]);

    assert!(global::configure(|cfg| cfg.prefix = None));
}

#[test]
#[serial]
fn second_install_is_rejected() {
    installed();
    let other = Satchel::builder().backend(MemoryBackend::new()).build();
    assert!(matches!(global::install(other), Err(SatchelError::Internal { .. })));
}
