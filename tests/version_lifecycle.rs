mod common;

use common::Fixture;
use std::fs;
use tfvm::TfvmError;
use tfvm::libs::version_store::VersionStore;

#[test]
fn install_round_trip() {
    let fx = Fixture::new();
    fx.publish("1.4.6", b"tf 1.4.6");
    let store = VersionStore::new(&fx.config);

    fx.installer().install("1.4.6").unwrap();
    assert!(store.is_installed("1.4.6").unwrap());

    store.uninstall("1.4.6").unwrap();
    assert!(!store.is_installed("1.4.6").unwrap());
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn empty_store_lists_nothing() {
    let fx = Fixture::new();
    let store = VersionStore::new(&fx.config);

    assert!(store.list().unwrap().is_empty());
    assert_eq!(store.current().unwrap(), None);
}

#[cfg(unix)]
#[test]
fn install_list_and_use_scenario() {
    let fx = Fixture::new();
    let digest = fx.publish("1.5.0", b"tf 1.5.0");
    let store = VersionStore::new(&fx.config);

    let outcome = fx.installer().install("1.5.0").unwrap();
    match outcome {
        tfvm::libs::installer::InstallOutcome::Installed { digest: got, .. } => {
            assert_eq!(got.to_hex(), digest)
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(store.list().unwrap(), vec!["1.5.0"]);
    assert_eq!(store.current().unwrap(), None);

    store.set_current(Some("1.5.0")).unwrap();

    assert_eq!(store.current().unwrap().as_deref(), Some("1.5.0"));
    // The link resolves to the installed executable.
    assert_eq!(fs::read(fx.config.current_link()).unwrap(), b"tf 1.5.0");
}

#[cfg(unix)]
#[test]
fn switching_versions_moves_the_link() {
    let fx = Fixture::new();
    fx.publish("1.5.0", b"tf 1.5.0");
    fx.publish("1.6.0", b"tf 1.6.0");
    let store = VersionStore::new(&fx.config);
    fx.installer().install("1.6.0").unwrap();
    fx.installer().install("1.5.0").unwrap();

    store.set_current(Some("1.5.0")).unwrap();
    store.set_current(Some("1.6.0")).unwrap();

    assert_eq!(store.list().unwrap(), vec!["1.5.0", "1.6.0"]);
    assert_eq!(store.current().unwrap().as_deref(), Some("1.6.0"));
    assert_eq!(fs::read(fx.config.current_link()).unwrap(), b"tf 1.6.0");
}

#[cfg(unix)]
#[test]
fn clearing_current_keeps_the_record() {
    let fx = Fixture::new();
    fx.publish("1.2.3", b"tf 1.2.3");
    let store = VersionStore::new(&fx.config);
    fx.installer().install("1.2.3").unwrap();

    store.set_current(Some("1.2.3")).unwrap();
    store.set_current(None).unwrap();

    assert_eq!(store.current().unwrap(), None);
    assert!(store.is_installed("1.2.3").unwrap());
}

#[cfg(unix)]
#[test]
fn uninstalling_current_version_clears_pointer() {
    let fx = Fixture::new();
    fx.publish("1.5.0", b"tf 1.5.0");
    let store = VersionStore::new(&fx.config);
    fx.installer().install("1.5.0").unwrap();
    store.set_current(Some("1.5.0")).unwrap();

    store.uninstall("1.5.0").unwrap();

    assert_eq!(store.current().unwrap(), None);
    assert!(fs::symlink_metadata(fx.config.current_link()).is_err());
}

#[test]
fn use_of_missing_version_fails() {
    let fx = Fixture::new();
    let err = VersionStore::new(&fx.config)
        .set_current(Some("1.5.0"))
        .unwrap_err();
    assert!(matches!(err, TfvmError::NotInstalled(_)));
}

#[test]
fn failed_install_is_invisible_to_the_store() {
    let fx = Fixture::new();
    fx.publish_manifest("1.5.0", &"0".repeat(64));
    fx.releases.serve(
        &fx.artifacts("1.5.0").archive_url,
        common::Served::Body(common::zip_archive(&[("terraform", b"tf")])),
    );
    let store = VersionStore::new(&fx.config);

    assert!(fx.installer().install("1.5.0").is_err());

    assert!(store.list().unwrap().is_empty());
    assert!(!store.is_installed("1.5.0").unwrap());
}
