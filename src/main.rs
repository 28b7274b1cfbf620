fn main() {
    if let Err(e) = uiground_lib::run() {
        tracing::error!(error = %e, "uiground failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
