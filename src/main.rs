use std::process;

fn main() {
    if let Err(e) = wavegraph::app::run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
