use crate::config::ServerConfig;
use crate::protocol::{frame_msg, ClientMsg, FrameMsg, RejectedMsg, WelcomeMsg, PROTOCOL_VERSION};
use crate::scene::{load_scene, LoadedScene, SceneError};
use crate::world::{SimulationWorld, WorldEvent};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc, oneshot};

/// Commands from client connections to the game loop
#[derive(Debug)]
pub enum GameCommand {
    /// Ask to control the walkthrough. Only one session may at a time.
    Attach {
        response: oneshot::Sender<Result<(u32, WelcomeMsg), RejectedMsg>>,
    },
    Detach {
        session: u32,
    },
    Input {
        session: u32,
        msg: ClientMsg,
    },
}

/// Broadcasts from game loop to all clients
#[derive(Debug, Clone)]
pub enum GameBroadcast {
    Frame(FrameMsg),
    OpenUrl { session: u32, url: String },
}

/// Run the frame driver. Owns the simulation world.
pub async fn run_game_loop(
    mut cmd_rx: mpsc::Receiver<GameCommand>,
    broadcast_tx: broadcast::Sender<GameBroadcast>,
    server_config: ServerConfig,
) {
    let mut world = SimulationWorld::new(server_config.gallery);

    // One-shot level load; the world simulates without geometry until it lands.
    let (scene_tx, mut scene_rx) = oneshot::channel::<Result<LoadedScene, SceneError>>();
    let scene_path = server_config.scene_path.clone();
    tokio::spawn(async move {
        let _ = scene_tx.send(load_scene(scene_path.as_deref()).await);
    });
    let mut scene_pending = true;

    let frame_duration = Duration::from_secs_f64(1.0 / server_config.frame_rate_hz.max(1) as f64);
    let broadcast_every_n = server_config.broadcast_every() as u64;
    let mut controller: Option<u32> = None;
    let mut next_session: u32 = 1;

    let mut frame_interval = tokio::time::interval(frame_duration);
    frame_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut last_frame = Instant::now();

    loop {
        tokio::select! {
            _ = frame_interval.tick() => {
                let now = Instant::now();
                let delta = now.duration_since(last_frame).as_secs_f32();
                last_frame = now;

                world.frame(delta);

                let snapshot = world.snapshot();
                if snapshot.frame % broadcast_every_n == 0 {
                    let _ = broadcast_tx.send(GameBroadcast::Frame(frame_msg(&snapshot)));
                }
            }

            result = &mut scene_rx, if scene_pending => {
                scene_pending = false;
                match result {
                    Ok(Ok(scene)) => {
                        world.load(scene);
                    }
                    Ok(Err(e)) => {
                        tracing::error!("Scene failed to load, running without level: {}", e);
                    }
                    Err(_) => {
                        tracing::error!("Scene loader dropped without a result");
                    }
                }
            }

            Some(cmd) = cmd_rx.recv() => {
                match cmd {
                    GameCommand::Attach { response } => {
                        if controller.is_some() {
                            let _ = response.send(Err(RejectedMsg {
                                reason: "Another session is already walking the gallery".to_string(),
                            }));
                            continue;
                        }
                        let session = next_session;
                        next_session += 1;
                        let welcome = WelcomeMsg {
                            protocol_version: PROTOCOL_VERSION,
                            server_version: env!("CARGO_PKG_VERSION").to_string(),
                            config: *world.config(),
                        };
                        if response.send(Ok((session, welcome))).is_ok() {
                            controller = Some(session);
                            tracing::info!("Session {} attached", session);
                        }
                    }
                    GameCommand::Detach { session } => {
                        if controller == Some(session) {
                            controller = None;
                            world.release_input();
                            tracing::info!("Session {} detached", session);
                        }
                    }
                    GameCommand::Input { session, msg } => {
                        if controller != Some(session) {
                            continue;
                        }
                        if let Some(WorldEvent::OpenUrl(url)) = apply_input(&mut world, msg) {
                            let _ = broadcast_tx.send(GameBroadcast::OpenUrl { session, url });
                        }
                    }
                }
            }

            else => break,
        }
    }

    tracing::info!("Game loop ended");
}

/// Feed one client message into the world.
pub fn apply_input(world: &mut SimulationWorld, msg: ClientMsg) -> Option<WorldEvent> {
    match msg {
        ClientMsg::KeyDown { code } => world.key_down(&code),
        ClientMsg::KeyUp { code } => {
            world.key_up(&code);
            None
        }
        ClientMsg::Look { dx, dy } => {
            world.look(dx, dy);
            None
        }
        ClientMsg::PointerDown => {
            world.pointer_down();
            None
        }
        ClientMsg::PointerUp { locked } => {
            world.pointer_up(locked);
            None
        }
    }
}
