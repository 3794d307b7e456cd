#[tokio::main]
async fn main() {
    shiritori_be::start_server().await;
}
