//! Binary entrypoint for `cmdr-server`.

mod app;
mod ingress;

fn main() {
    if let Err(err) = app::run() {
        eprintln!("failed to start cmdr-server: {err}");
        std::process::exit(1);
    }
}
