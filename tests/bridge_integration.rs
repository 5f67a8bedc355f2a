//! End-to-end tests: HTTP client → gateway → ZeroMQ → mock trainer.

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use serde_json::{json, Value};

use trainer_gateway::channel::{Channel, ChannelError, ZmqChannel};
use trainer_gateway::Shutdown;

mod common;

#[tokio::test]
async fn worker_info_round_trip() {
    let shutdown = Shutdown::new();
    let received = common::start_mock_trainer(28501, Duration::ZERO).await;
    let addr = common::start_gateway(28501, &shutdown).await;

    let res = reqwest::Client::new()
        .post(format!("http://{}/worker-info", addr))
        .send()
        .await
        .expect("gateway reachable");

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["echo"], json!({ "action": "WorkerInfo" }));
    assert_eq!(received.load(Ordering::SeqCst), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn game_id_reaches_the_trainer_as_a_string() {
    let shutdown = Shutdown::new();
    common::start_mock_trainer(28502, Duration::ZERO).await;
    let addr = common::start_gateway(28502, &shutdown).await;

    let res = reqwest::Client::new()
        .post(format!("http://{}/game-info", addr))
        .json(&json!({ "game_id": 42 }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["echo"], json!({ "action": "GameInfo", "game_id": "42" }));

    shutdown.trigger();
}

#[tokio::test]
async fn concurrent_clients_each_get_their_own_reply() {
    let shutdown = Shutdown::new();
    let received = common::start_mock_trainer(28503, Duration::from_millis(2)).await;
    let addr = common::start_gateway(28503, &shutdown).await;
    let client = reqwest::Client::new();

    let calls = (0..16).map(|i| {
        let client = client.clone();
        let url = format!("http://{}/game-info", addr);
        async move {
            let res = client
                .post(url)
                .json(&json!({ "game_id": i }))
                .send()
                .await
                .unwrap();
            assert_eq!(res.status(), 200);
            (i, res.json::<Value>().await.unwrap())
        }
    });

    for (i, body) in join_all(calls).await {
        assert_eq!(body["echo"]["game_id"], json!(i.to_string()));
    }
    assert_eq!(received.load(Ordering::SeqCst), 16);

    shutdown.trigger();
}

#[tokio::test]
async fn slow_trainer_serializes_calls() {
    let shutdown = Shutdown::new();
    common::start_mock_trainer(28504, Duration::from_millis(10)).await;
    let (serializer, _worker) = common::connect_serializer(28504, &shutdown).await;
    let gateway = trainer_gateway::Gateway::new(serializer);

    let started = Instant::now();
    let replies = join_all((0..5).map(|_| gateway.submit("WorkerInfo", None))).await;
    let elapsed = started.elapsed();

    let mut seqs: Vec<u64> = replies
        .into_iter()
        .map(|reply| reply.unwrap().json().unwrap()["seq"].as_u64().unwrap())
        .collect();
    seqs.sort_unstable();
    assert_eq!(seqs, vec![1, 2, 3, 4, 5]);
    assert!(elapsed >= Duration::from_millis(50), "took {:?}", elapsed);

    shutdown.trigger();
}

#[tokio::test]
async fn zmq_channel_refuses_out_of_sequence_use() {
    common::start_mock_trainer(28505, Duration::ZERO).await;
    let mut channel = ZmqChannel::connect(&common::backend_config(28505), Duration::from_secs(2))
        .await
        .unwrap();

    assert!(matches!(
        channel.recv().await,
        Err(ChannelError::OutOfSequence(_))
    ));

    channel.send(br#"{"action":"WorkerInfo"}"#.to_vec()).await.unwrap();
    assert!(matches!(
        channel.send(br#"{"action":"WorkerInfo"}"#.to_vec()).await,
        Err(ChannelError::OutOfSequence(_))
    ));

    let reply: Value = serde_json::from_slice(&channel.recv().await.unwrap()).unwrap();
    assert_eq!(reply["seq"], 1);
}

#[tokio::test]
async fn shutdown_stops_the_serializer() {
    let shutdown = Shutdown::new();
    common::start_mock_trainer(28506, Duration::ZERO).await;
    let (serializer, worker) = common::connect_serializer(28506, &shutdown).await;
    let gateway = trainer_gateway::Gateway::new(serializer);

    assert!(gateway.submit("WorkerInfo", None).await.is_ok());

    shutdown.trigger();
    worker.await.unwrap();

    assert_eq!(
        gateway.submit("WorkerInfo", None).await,
        Err(trainer_gateway::GatewayError::ChannelUnavailable)
    );
}
