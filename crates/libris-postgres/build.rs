#![forbid(unsafe_code)]

/// `embed_migrations!` only re-expands when the crate itself is rebuilt, so
/// editing a migration file alone would leave the embedded set stale.
///
/// Watching the migration directory forces a rebuild whenever a migration is
/// added or changed.
fn main() {
    println!("cargo:rerun-if-changed=./migrations");
}
