//! HTTP client and relay against a scripted local server

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use gasguard_connectors::http::{HttpConfig, HttpConnector, HttpError};
use gasguard_connectors::{Connector, Relay, SerialSource};
use gasguard_core::{GasEstimator, RawReading};

/// (request line, body) for every request served
type Served = Vec<(String, String)>;

/// Serve one connection per scripted status, then stop
fn scripted_server(statuses: Vec<u16>) -> (String, JoinHandle<Served>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let mut served = Vec::new();
        for status in statuses {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();

            let mut content_length = 0;
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                let header = header.trim();
                if header.is_empty() {
                    break;
                }
                if let Some((name, value)) = header.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }

            let mut body = vec![0; content_length];
            reader.read_exact(&mut body).unwrap();

            let reply = if status == 200 { "Data received" } else { "nope" };
            let response = format!(
                "HTTP/1.1 {} Scripted\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reply.len(),
                reply
            );
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();

            served.push((
                request_line.trim().to_string(),
                String::from_utf8(body).unwrap(),
            ));
        }
        served
    });

    (url, handle)
}

fn connector(url: &str, retries: u32) -> HttpConnector {
    HttpConnector::new(
        HttpConfig::new(url)
            .timeout_secs(5)
            .max_retries(retries)
            .backoff_ms(1),
    )
    .unwrap()
}

#[test]
fn retries_server_errors_then_succeeds() {
    let (url, server) = scripted_server(vec![503, 200]);
    let mut http = connector(&url, 2);

    let estimate = GasEstimator::default().estimate(RawReading::new(500).unwrap());
    let response = http.post_estimate(&estimate).unwrap();
    assert_eq!(response, serde_json::Value::String("Data received".into()));

    let served = server.join().unwrap();
    assert_eq!(served.len(), 2);
    for (line, body) in &served {
        assert!(line.starts_with("POST /gas_data"), "{}", line);
        let body: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(body["gas_level"], 500);
        assert_eq!(body["gas_type"], "CO");
    }

    let stats = http.stats();
    assert_eq!(stats.messages_sent, 1);
    assert_eq!(stats.messages_failed, 0);
    assert_eq!(stats.retries, 1);
}

#[test]
fn client_errors_are_not_retried() {
    let (url, server) = scripted_server(vec![404]);
    let mut http = connector(&url, 3);

    let estimate = GasEstimator::default().estimate(RawReading::new(10).unwrap());
    let err = http.post_estimate(&estimate).unwrap_err();
    assert!(matches!(err, HttpError::ServerError { status: 404, .. }));

    assert_eq!(server.join().unwrap().len(), 1);
    assert_eq!(http.stats().messages_failed, 1);
    assert_eq!(http.stats().retries, 0);
}

#[test]
fn gives_up_after_max_retries() {
    let (url, server) = scripted_server(vec![500, 500]);
    let mut http = connector(&url, 1);

    let estimate = GasEstimator::default().estimate(RawReading::new(10).unwrap());
    let err = http.post_estimate(&estimate).unwrap_err();
    assert!(matches!(err, HttpError::ServerError { status: 500, .. }));
    assert_eq!(server.join().unwrap().len(), 2);
    assert!(http.stats().last_error.is_some());
}

#[test]
fn unreachable_server_is_a_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let mut http = connector(&url, 1);
    let estimate = GasEstimator::default().estimate(RawReading::new(10).unwrap());
    assert!(matches!(http.post_estimate(&estimate), Err(HttpError::Request(_))));
    assert_eq!(http.stats().retries, 1);
}

#[test]
fn relays_serial_lines_to_the_server() {
    let (url, server) = scripted_server(vec![200, 200, 200]);
    let mut http = connector(&url, 0);

    let board = "MQ-2 warming up\nGas Level: 120\nGas Level: 500\nGas Lev\nGas Level: 900\n";
    let mut source = SerialSource::new(board.as_bytes());
    let stats = Relay::default().run(&mut source, &mut http).unwrap();

    assert_eq!(stats.readings, 3);
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.sink_errors, 0);

    let levels: Vec<u64> = server
        .join()
        .unwrap()
        .iter()
        .map(|(_, body)| {
            let body: serde_json::Value = serde_json::from_str(body).unwrap();
            assert!(body.get("rate_ppm_per_s").is_some());
            body["gas_level"].as_u64().unwrap()
        })
        .collect();
    assert_eq!(levels, vec![120, 500, 900]);
    assert_eq!(http.stats().messages_sent, 3);
}
