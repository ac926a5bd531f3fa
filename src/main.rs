fn main() {
    if let Err(e) = mcpforge::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
