use std::process;

fn main() {
    dotenvy::dotenv().ok();
    git_dist::logging::init();

    if let Err(e) = git_dist::cli::run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
