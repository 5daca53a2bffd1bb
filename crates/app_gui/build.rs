use std::env;

fn main() {
    let version = env::var("NEUROSCAN_VERSION")
        .or_else(|_| env::var("CARGO_PKG_VERSION"))
        .unwrap_or_else(|_| "dev".to_string());
    println!("cargo:rerun-if-env-changed=NEUROSCAN_VERSION");
    println!("cargo:rustc-env=NEUROSCAN_VERSION={version}");
}
