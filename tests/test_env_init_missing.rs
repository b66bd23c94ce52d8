//! `env::init` with no `.env` in the working directory. Its own binary for
//! the same reason as `test_env_init`.

use std::env;

use jsonenv::env::init;
use tempfile::TempDir;

#[test]
fn test_init_without_file_keeps_os_values() {
    let dir = TempDir::new().unwrap();

    // SAFETY: single test in this binary, no other thread touches the env.
    unsafe { env::set_var("FOO", "bar") };
    env::set_current_dir(dir.path()).unwrap();

    let snapshot = init();

    assert_eq!(env::var("FOO").as_deref(), Ok("bar"));
    assert_eq!(snapshot.get("FOO"), Some("bar"));
    assert_eq!(snapshot.added().count(), 0);
}
