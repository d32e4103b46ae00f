fn main() {
    if let Err(e) = commit_activity_research::cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
