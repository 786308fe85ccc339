#[tokio::main]
async fn main() {
    if let Err(e) = dspm_analyzer::run().await {
        eprintln!("dspm-analyzer: {e}");
        std::process::exit(1);
    }
}
