#[tokio::main]
async fn main() {
    if let Err(error) = webpp_lib::run().await {
        eprintln!("{}", error);
        std::process::exit(1);
    }
}
