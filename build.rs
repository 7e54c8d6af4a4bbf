fn main() {
    println!("cargo:rerun-if-env-changed=PORTGUARD_VERSION");

    let version = ::std::env::var("PORTGUARD_VERSION")
        .or_else(|_| ::std::env::var("CARGO_PKG_VERSION"))
        .unwrap();

    println!("cargo:rustc-env=PORTGUARD_VERSION={}", version);
}
