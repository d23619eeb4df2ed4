#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = quirky_inspiration_lib::run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
