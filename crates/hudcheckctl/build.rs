// Build script for hudcheckctl - embeds version at compile time

fn main() {
    // Release pipelines may pin the version; otherwise use Cargo.toml
    let version =
        std::env::var("HUDCHECK_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=HUDCHECK_VERSION={}", version);

    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed=HUDCHECK_VERSION");
}
