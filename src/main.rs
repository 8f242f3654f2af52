fn main() {
    if let Err(err) = erd_renderer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
