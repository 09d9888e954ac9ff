use std::env;
use std::ffi::OsString;
use std::process;

use python_launcher::{observability, run, LauncherConfig, OsHost};

fn main() {
    observability::init_tracing();

    let argv: Vec<OsString> = env::args_os().collect();
    let config = LauncherConfig::for_host();

    #[cfg(feature = "embedded")]
    let runtime = python_launcher::EmbeddedPython;
    #[cfg(not(feature = "embedded"))]
    let runtime = python_launcher::ExecInterpreter::bundled();

    match run(&OsHost, &runtime, &config, argv) {
        Ok(status) => process::exit(status),
        Err(err) => {
            eprintln!("ERROR: {}", err);
            process::exit(1);
        }
    }
}
