//! Scripted walkthrough client for the gallery server.
//!
//! Connects as the controlling session, then:
//! - Walks forward while slowly turning
//! - Jumps and throws balls on a fixed schedule
//! - Counts frames, balls in play and the prompts that show up
//!
//! Usage: cargo run --bin walkthrough -- [OPTIONS]
//!
//! Options:
//!   --duration S     Walk duration in seconds (default: 20)
//!   --url URL        Server URL (default: ws://127.0.0.1:9001/ws)

use futures_util::{SinkExt, StreamExt};
use gallery_server::protocol::{ClientMsg, ServerMsg};
use gallery_server::sphere::PARKED_POSITION;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};

const TURN_PIXELS: f32 = 4.0;
const JUMP_EVERY: Duration = Duration::from_secs(2);
const THROW_EVERY: Duration = Duration::from_millis(1500);
const THROW_HOLD: Duration = Duration::from_millis(300);

#[derive(Default)]
struct Report {
    frames: u64,
    balls_in_play_sum: u64,
    prompts: BTreeSet<String>,
    glitch_frames: u64,
    urls: Vec<String>,
    sent: u64,
}

async fn send<S>(ws: &mut S, msg: &ClientMsg, report: &mut Report) -> bool
where
    S: SinkExt<Message> + Unpin,
{
    let Ok(json) = serde_json::to_string(msg) else {
        return false;
    };
    if ws.send(Message::Text(json.into())).await.is_ok() {
        report.sent += 1;
        true
    } else {
        false
    }
}

fn key_down(code: &str) -> ClientMsg {
    ClientMsg::KeyDown {
        code: code.to_string(),
    }
}

fn key_up(code: &str) -> ClientMsg {
    ClientMsg::KeyUp {
        code: code.to_string(),
    }
}

async fn run(url: &str, duration: Duration) -> Result<Report, String> {
    let (ws, _) = connect_async(url)
        .await
        .map_err(|e| format!("failed to connect to {}: {}", url, e))?;
    let (mut sink, mut stream) = ws.split();
    let mut report = Report::default();

    // Wait for welcome before sending input
    let welcome = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(Message::Text(text)) => match serde_json::from_str::<ServerMsg>(&text) {
                    Ok(ServerMsg::Welcome(w)) => return Ok(w),
                    Ok(ServerMsg::Rejected(r)) => return Err(format!("rejected: {}", r.reason)),
                    _ => {}
                },
                Ok(Message::Close(_)) => return Err("closed during welcome".to_string()),
                Err(e) => return Err(format!("error during welcome: {}", e)),
                _ => {}
            }
        }
        Err("stream ended during welcome".to_string())
    })
    .await
    .map_err(|_| "welcome timeout".to_string())??;

    println!(
        "Attached: protocol v{}, server {}",
        welcome.protocol_version, welcome.server_version
    );

    if !send(&mut sink, &key_down("KeyW"), &mut report).await {
        return Err("failed to send input".to_string());
    }

    let mut turn_timer = tokio::time::interval(Duration::from_millis(50));
    let mut jump_timer = tokio::time::interval(JUMP_EVERY);
    let mut throw_timer = tokio::time::interval(THROW_EVERY);
    for timer in [&mut turn_timer, &mut jump_timer, &mut throw_timer] {
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    }

    let test_end = Instant::now() + duration;

    loop {
        if Instant::now() >= test_end {
            break;
        }

        tokio::select! {
            _ = turn_timer.tick() => {
                let look = ClientMsg::Look { dx: TURN_PIXELS, dy: 0.0 };
                if !send(&mut sink, &look, &mut report).await {
                    break;
                }
            }

            _ = jump_timer.tick() => {
                send(&mut sink, &key_down("Space"), &mut report).await;
                tokio::time::sleep(Duration::from_millis(50)).await;
                send(&mut sink, &key_up("Space"), &mut report).await;
            }

            _ = throw_timer.tick() => {
                send(&mut sink, &ClientMsg::PointerDown, &mut report).await;
                tokio::time::sleep(THROW_HOLD).await;
                send(&mut sink, &ClientMsg::PointerUp { locked: true }, &mut report).await;
                // Try to buy whatever is in view
                send(&mut sink, &key_down("KeyB"), &mut report).await;
                send(&mut sink, &key_up("KeyB"), &mut report).await;
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerMsg>(&text) {
                            Ok(ServerMsg::Frame(frame)) => {
                                report.frames += 1;
                                let in_play = frame
                                    .spheres
                                    .iter()
                                    .filter(|p| p[1] > PARKED_POSITION.y + 1.0)
                                    .count();
                                report.balls_in_play_sum += in_play as u64;
                                if frame.glitch {
                                    report.glitch_frames += 1;
                                }
                                if let Some(prompt) = frame.prompt {
                                    report.prompts.insert(prompt);
                                }
                            }
                            Ok(ServerMsg::OpenUrl(open)) => report.urls.push(open.url),
                            Ok(_) => {}
                            Err(e) => eprintln!("Unparseable server message: {}", e),
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        eprintln!("Server closed the connection: {:?}", frame);
                        break;
                    }
                    None => break,
                    Some(Err(e)) => {
                        eprintln!("WebSocket error: {}", e);
                        break;
                    }
                    Some(_) => {}
                }
            }
        }
    }

    send(&mut sink, &key_up("KeyW"), &mut report).await;
    let _ = sink.close().await;
    Ok(report)
}

// === Main ===

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut duration_secs: u64 = 20;
    let mut url = "ws://127.0.0.1:9001/ws".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--duration" => {
                i += 1;
                duration_secs = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(20);
            }
            "--url" => {
                i += 1;
                url = args.get(i).cloned().unwrap_or(url);
            }
            _ => {}
        }
        i += 1;
    }

    println!("=== Gallery Walkthrough ===");
    println!("Duration: {}s", duration_secs);
    println!("URL: {}", url);
    println!();

    let report = match run(&url, Duration::from_secs(duration_secs)).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Walkthrough failed: {}", e);
            std::process::exit(1);
        }
    };

    println!();
    println!("=== Results ===");
    println!("Messages sent: {}", report.sent);
    println!("Frames received: {}", report.frames);
    println!(
        "Average balls in play: {:.1}",
        if report.frames > 0 {
            report.balls_in_play_sum as f64 / report.frames as f64
        } else {
            0.0
        }
    );
    println!("Glitch frames: {}", report.glitch_frames);
    if report.prompts.is_empty() {
        println!("Prompts seen: none");
    } else {
        println!("Prompts seen:");
        for prompt in &report.prompts {
            println!("  {}", prompt);
        }
    }
    for url in &report.urls {
        println!("Listing opened: {}", url);
    }
}
