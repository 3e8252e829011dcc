//! Dashboard server client (port 29999)
//!
//! Line-based text protocol: one command per line, one reply line back.
//! The controller only accepts these while in remote control mode.

use crate::config::RobotConfig;
use crate::error::{PrimaryError, Result};
use crate::modes::RobotMode;
use regex::Regex;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info};

const ROBOT_MODE_PATTERN: &str = r"^Robotmode:\s*([A-Z_]+)";

/// Parse a `robotmode` reply such as `Robotmode: RUNNING`
pub fn parse_robot_mode(pattern: &Regex, reply: &str) -> Result<RobotMode> {
    pattern
        .captures(reply.trim())
        .and_then(|captures| captures.get(1))
        .and_then(|name| RobotMode::from_name(name.as_str()))
        .ok_or_else(|| PrimaryError::Dashboard(format!("Unexpected robotmode reply: {}", reply)))
}

/// Parse a `get loaded program` reply, `None` when nothing is loaded
pub fn parse_loaded_program(reply: &str) -> Result<Option<String>> {
    let reply = reply.trim();
    if reply.starts_with("No program loaded") {
        return Ok(None);
    }
    reply
        .strip_prefix("Loaded program:")
        .map(|path| Some(path.trim().to_string()))
        .ok_or_else(|| PrimaryError::Dashboard(reply.to_string()))
}

pub struct DashboardClient {
    socket: BufReader<TcpStream>,
    reply_timeout: Duration,
    robot_mode_pattern: Regex,
    banner: String,
}

impl DashboardClient {
    /// Connect and consume the welcome banner
    pub async fn connect(config: &RobotConfig) -> Result<Self> {
        let addr = config.dashboard_addr();
        let timeout = config.connection.timeout();
        let robot_mode_pattern = Regex::new(ROBOT_MODE_PATTERN)
            .map_err(|e| PrimaryError::Config(format!("Invalid reply pattern: {}", e)))?;

        let socket = tokio::time::timeout(timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| PrimaryError::Connection(format!("Timed out connecting to {}", addr)))?
            .map_err(|e| PrimaryError::Connection(format!("Failed to connect to {}: {}", addr, e)))?;

        let mut client = Self {
            socket: BufReader::new(socket),
            reply_timeout: timeout,
            robot_mode_pattern,
            banner: String::new(),
        };
        client.banner = client.read_reply().await?;
        info!("Connected to dashboard at {}: {}", addr, client.banner);
        Ok(client)
    }

    pub fn banner(&self) -> &str {
        &self.banner
    }

    async fn read_reply(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = tokio::time::timeout(self.reply_timeout, self.socket.read_line(&mut line))
            .await
            .map_err(|_| PrimaryError::Dashboard("Timed out waiting for reply".to_string()))??;
        if read == 0 {
            return Err(PrimaryError::Connection("Dashboard closed the connection".to_string()));
        }
        Ok(line.trim().to_string())
    }

    /// Send a raw command and return the trimmed reply.
    /// One command per call; embedded line breaks are rejected.
    pub async fn send(&mut self, command: &str) -> Result<String> {
        let command = command.trim();
        if command.contains(['\n', '\r']) {
            return Err(PrimaryError::Dashboard(format!(
                "Command spans multiple lines: {:?}",
                command
            )));
        }
        let line = format!("{}\n", command);
        self.socket.get_mut().write_all(line.as_bytes()).await?;
        let reply = self.read_reply().await?;
        debug!("Dashboard '{}' -> '{}'", command, reply);
        Ok(reply)
    }

    /// Send a command whose success reply starts with `expected`
    async fn command(&mut self, command: &str, expected: &str) -> Result<String> {
        let reply = self.send(command).await?;
        if reply.starts_with(expected) {
            Ok(reply)
        } else {
            Err(PrimaryError::Dashboard(format!("'{}' failed: {}", command, reply)))
        }
    }

    pub async fn load(&mut self, program: &str) -> Result<String> {
        self.command(&format!("load {}", program), "Loading program").await
    }

    pub async fn play(&mut self) -> Result<String> {
        self.command("play", "Starting program").await
    }

    pub async fn stop(&mut self) -> Result<String> {
        self.command("stop", "Stopped").await
    }

    pub async fn pause(&mut self) -> Result<String> {
        self.command("pause", "Pausing program").await
    }

    pub async fn power_on(&mut self) -> Result<String> {
        self.command("power on", "Powering on").await
    }

    pub async fn power_off(&mut self) -> Result<String> {
        self.command("power off", "Powering off").await
    }

    pub async fn brake_release(&mut self) -> Result<String> {
        self.command("brake release", "Brake releasing").await
    }

    pub async fn robot_mode(&mut self) -> Result<RobotMode> {
        let reply = self.send("robotmode").await?;
        parse_robot_mode(&self.robot_mode_pattern, &reply)
    }

    pub async fn loaded_program(&mut self) -> Result<Option<String>> {
        let reply = self.send("get loaded program").await?;
        parse_loaded_program(&reply)
    }

    pub async fn is_running(&mut self) -> Result<bool> {
        let reply = self.send("running").await?;
        match reply.strip_prefix("Program running:").map(str::trim) {
            Some(value) => Ok(value.eq_ignore_ascii_case("true")),
            None => Err(PrimaryError::Dashboard(format!("Unexpected running reply: {}", reply))),
        }
    }

    pub async fn popup(&mut self, text: &str) -> Result<String> {
        self.command(&format!("popup {}", text), "showing popup").await
    }

    pub async fn close_popup(&mut self) -> Result<String> {
        self.command("close popup", "closing popup").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_parse_robot_mode() {
        let pattern = Regex::new(ROBOT_MODE_PATTERN).unwrap();
        let parse = |reply| parse_robot_mode(&pattern, reply);
        assert_eq!(parse("Robotmode: RUNNING").unwrap(), RobotMode::Running);
        assert_eq!(parse("Robotmode: POWER_OFF\n").unwrap(), RobotMode::PowerOff);
        assert_eq!(parse("Robotmode: NO_CONTROLLER").unwrap(), RobotMode::NoController);
        assert!(parse("Robotmode: DANCING").is_err());
        assert!(parse("not a reply").is_err());
    }

    #[test]
    fn test_parse_loaded_program() {
        assert_eq!(
            parse_loaded_program("Loaded program: /programs/pick.urp").unwrap(),
            Some("/programs/pick.urp".to_string())
        );
        assert_eq!(parse_loaded_program("No program loaded").unwrap(), None);
        assert!(parse_loaded_program("garbage").is_err());
    }

    /// Minimal dashboard server answering a fixed set of commands
    async fn fake_dashboard() -> RobotConfig {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut socket = BufReader::new(socket);
            socket
                .get_mut()
                .write_all(b"Connected: Universal Robots Dashboard Server\n")
                .await
                .unwrap();

            let mut line = String::new();
            while socket.read_line(&mut line).await.unwrap() > 0 {
                let reply = match line.trim() {
                    "robotmode" => "Robotmode: IDLE".to_string(),
                    "running" => "Program running: false".to_string(),
                    "play" => "Failed to execute: play".to_string(),
                    "get loaded program" => "No program loaded".to_string(),
                    command if command.starts_with("load ") => {
                        format!("Loading program: {}", &command[5..])
                    }
                    other => format!("could not understand: '{}'", other),
                };
                socket
                    .get_mut()
                    .write_all(format!("{}\n", reply).as_bytes())
                    .await
                    .unwrap();
                line.clear();
            }
        });

        let mut config = RobotConfig::new("127.0.0.1");
        config.ports.dashboard = port;
        config
    }

    #[tokio::test]
    async fn test_dashboard_session() {
        let config = fake_dashboard().await;
        let mut client = DashboardClient::connect(&config).await.unwrap();
        assert!(client.banner().starts_with("Connected"));

        assert_eq!(client.robot_mode().await.unwrap(), RobotMode::Idle);
        assert!(!client.is_running().await.unwrap());
        assert_eq!(client.loaded_program().await.unwrap(), None);
        assert_eq!(
            client.load("pick.urp").await.unwrap(),
            "Loading program: pick.urp"
        );
        assert!(matches!(
            client.play().await,
            Err(PrimaryError::Dashboard(_))
        ));
        assert_eq!(
            client.send("version").await.unwrap(),
            "could not understand: 'version'"
        );
    }

    #[tokio::test]
    async fn test_multi_line_command_rejected() {
        let config = fake_dashboard().await;
        let mut client = DashboardClient::connect(&config).await.unwrap();

        assert!(matches!(
            client.popup("a\nb").await,
            Err(PrimaryError::Dashboard(_))
        ));
        assert!(matches!(
            client.send("robotmode\r\nplay").await,
            Err(PrimaryError::Dashboard(_))
        ));
        // nothing was written, so replies stay in step
        assert_eq!(client.robot_mode().await.unwrap(), RobotMode::Idle);
        assert!(!client.is_running().await.unwrap());
    }
}
