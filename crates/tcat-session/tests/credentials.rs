use std::path::PathBuf;

use rcgen::{generate_simple_self_signed, CertifiedKey};
use tcat_session::{
    CredentialStore, PemDirectory, SessionError, CA_CERT_FILE,
    COMMISSIONER_CERT_FILE, COMMISSIONER_KEY_FILE,
};

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "tcat-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn self_signed() -> (String, String) {
    let CertifiedKey { cert, key_pair } =
        generate_simple_self_signed(vec!["DeviceType".to_string()]).expect("rcgen should work");
    (cert.pem(), key_pair.serialize_pem())
}

#[test]
fn pem_directory_loads_complete_material() {
    let dir = temp_dir("auth");
    let (cert, key) = self_signed();
    let (ca, _) = self_signed();
    std::fs::write(dir.join(COMMISSIONER_CERT_FILE), cert).unwrap();
    std::fs::write(dir.join(COMMISSIONER_KEY_FILE), key).unwrap();
    std::fs::write(dir.join(CA_CERT_FILE), ca).unwrap();

    let store = PemDirectory::new(&dir);
    assert!(store.load().is_ok());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn pem_directory_reports_missing_file() {
    let dir = temp_dir("auth-missing");
    let (cert, _) = self_signed();
    std::fs::write(dir.join(COMMISSIONER_CERT_FILE), cert).unwrap();

    let err = match PemDirectory::new(&dir).load() {
        Ok(_) => panic!("key file is missing"),
        Err(err) => err,
    };
    assert!(
        matches!(err, SessionError::Credentials(ref m) if m.contains(COMMISSIONER_KEY_FILE)),
        "unexpected error: {err}"
    );

    let _ = std::fs::remove_dir_all(&dir);
}
