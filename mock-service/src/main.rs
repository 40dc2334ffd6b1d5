use std::net::SocketAddr;

#[tokio::main]
async fn main() {
    tokio::task::spawn(async { mock_service::tps_measure_task().await });

    // Same port as the scenario's default SUT_API_URL.
    let addr: SocketAddr = "0.0.0.0:8080".parse().unwrap();
    mock_service::run(addr).await;
}
