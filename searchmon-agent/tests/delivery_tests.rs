use searchmon_agent::config::NotifierConf;
use searchmon_agent::monitor::deliver;
use searchmon_agent::{Delivery, NotifyError, WebhookNotifier};
use searchmon_devkit::{FleetHarness, FtInfoReply, InstanceScript};
use searchmon_kernel::report::{render_card, MessageCard};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Captured webhook request: lowercased head and raw body.
struct Captured {
    head: String,
    body: Vec<u8>,
}

/// Accept one request, answer with `status_line`, hand back what was received.
async fn webhook_once(status_line: &'static str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/webhook", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let captured = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            buf.extend_from_slice(&chunk[..n]);
            if let Some(captured) = complete_request(&buf) {
                break captured;
            }
            assert!(n > 0, "connection closed before the request was complete");
        };
        let response = format!("{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        captured
    });
    (url, handle)
}

fn complete_request(buf: &[u8]) -> Option<Captured> {
    let head_end = buf.windows(4).position(|w| w == b"\r\n\r\n")?;
    let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
    let length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    let body = buf.get(head_end + 4..head_end + 4 + length)?;
    Some(Captured {
        head,
        body: body.to_vec(),
    })
}

async fn sample_card() -> MessageCard {
    let harness = FleetHarness::new()
        .instance(
            "192.168.8.226",
            InstanceScript::healthy()
                .with_index("poi-idx", FtInfoReply::active("poi-idx", 1000, 1500, "12", 0).build()),
        )
        .instance("192.168.8.211", InstanceScript::unreachable("Connection refused"));
    render_card(&harness.run("1234").await)
}

fn notifier_conf(url: Option<String>) -> NotifierConf {
    NotifierConf {
        webhook_url: url,
        timeout_secs: 5,
    }
}

#[tokio::test]
async fn test_send_posts_json_card_and_accepts_2xx() {
    let (url, server) = webhook_once("HTTP/1.1 200 OK").await;
    let notifier = WebhookNotifier::new(url, Duration::from_secs(5)).unwrap();

    notifier.send(&sample_card().await).await.unwrap();

    let request = server.await.unwrap();
    assert!(request.head.starts_with("post /webhook "));
    assert!(request.head.contains("content-type: application/json"));
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["@type"], "MessageCard");
    assert_eq!(body["@context"], "http://schema.org/extensions");
    assert_eq!(body["sections"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_send_rejects_non_2xx_status() {
    let (url, server) = webhook_once("HTTP/1.1 500 Internal Server Error").await;
    let notifier = WebhookNotifier::new(url, Duration::from_secs(5)).unwrap();

    let err = notifier.send(&sample_card().await).await.unwrap_err();
    assert!(matches!(err, NotifyError::Status(status) if status.as_u16() == 500));
    server.await.unwrap();
}

#[tokio::test]
async fn test_deliver_reports_success() {
    let (url, server) = webhook_once("HTTP/1.1 204 No Content").await;

    let delivery = deliver(&notifier_conf(Some(url)), &sample_card().await, true).await;
    assert_eq!(delivery, Delivery::Delivered);
    server.await.unwrap();
}

#[tokio::test]
async fn test_deliver_logs_status_failure() {
    let (url, server) = webhook_once("HTTP/1.1 500 Internal Server Error").await;

    let delivery = deliver(&notifier_conf(Some(url)), &sample_card().await, true).await;
    let Delivery::Failed(reason) = delivery else {
        panic!("expected failed delivery, got {delivery:?}");
    };
    assert!(reason.starts_with("webhook answered 500"), "{reason}");
    server.await.unwrap();
}

#[tokio::test]
async fn test_deliver_without_webhook_is_skipped() {
    let delivery = deliver(&notifier_conf(None), &sample_card().await, true).await;
    assert_eq!(delivery, Delivery::Skipped("no webhook configured"));
}

#[tokio::test]
async fn test_deliver_disabled_wins_over_webhook() {
    let conf = notifier_conf(Some("http://127.0.0.1:9/webhook".into()));
    let delivery = deliver(&conf, &sample_card().await, false).await;
    assert_eq!(delivery, Delivery::Skipped("disabled"));
}
