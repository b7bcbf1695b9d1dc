//! dex binary entry point.

fn main() {
    if let Err(err) = dexedit::cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
