//! Bakes the deployment layout into the launcher and, with the `embedded`
//! feature, links the interpreter library.

use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=PYTHON_LAUNCHER_LIB_DIR");
    println!("cargo:rerun-if-env-changed=PYTHON_LAUNCHER_INTERPRETER");
    println!("cargo:rerun-if-env-changed=PYTHON_LAUNCHER_LIBPYTHON");
    println!("cargo:rerun-if-env-changed=PYTHON_LAUNCHER_LIBPYTHON_DIR");

    if env::var_os("CARGO_FEATURE_EMBEDDED").is_some() {
        let lib = env::var("PYTHON_LAUNCHER_LIBPYTHON").unwrap_or_else(|_| "python3".to_string());
        if let Ok(dir) = env::var("PYTHON_LAUNCHER_LIBPYTHON_DIR") {
            println!("cargo:rustc-link-search=native={}", dir);
        }
        println!("cargo:rustc-link-lib=dylib={}", lib);
    }
}
