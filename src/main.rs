fn main() {
    if let Err(err) = companion_chat::cli::main() {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
}
