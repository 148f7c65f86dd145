#[tokio::main]
async fn main() {
    if let Err(e) = game_tracker_lib::run().await {
        log::error!("GameTracker failed to start: {}", e);
        eprintln!("GameTracker failed to start: {e}");
        std::process::exit(1);
    }
}
