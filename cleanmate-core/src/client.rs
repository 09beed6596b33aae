//! High-level client for one vacuum.
//!
//! ```text
//! caller ──► CommandPayload ──► Envelope ──► Packet ──► Transport
//!                                                         │
//! DeviceState / MapState ◄── coerce ◄── Packet ◄──────────┘  (queries only)
//! ```
//!
//! Commands are written and the connection closed without reading a
//! reply, so a device that rejects the auth code still yields `Ok(())`
//! for `start`, `stop` and the other commands. Only queries see the
//! device hang up; call [`CleanmateClient::update_state`] to check
//! credentials.
//!
//! One client per physical device. State is held behind a
//! `tokio::sync::RwLock`: updates from concurrent queries are applied one
//! at a time, and readers get cloned snapshots.

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{CleanmateError, Result};
use crate::message::{MopMode, WorkMode};
use crate::network::{ConnectionInfo, TcpTransport, Transport};
use crate::protocol::{AuthCode, CommandPayload, Envelope, RoomCleaning};
use crate::state::{DeviceState, MapState};

#[derive(Debug)]
pub struct CleanmateClient<T = TcpTransport> {
    auth_code: AuthCode,
    transport: T,
    state: RwLock<DeviceState>,
    map: RwLock<MapState>,
}

impl CleanmateClient<TcpTransport> {
    /// Client for the device at `host` on the default port and timeout.
    ///
    /// Fails without touching the network if `host` is not an IP address
    /// or `auth_code` is not exactly 10 characters.
    pub fn new(host: &str, auth_code: &str) -> Result<Self> {
        Self::with_options(ConnectionInfo::parse(host)?, auth_code)
    }

    pub fn with_options(info: ConnectionInfo, auth_code: &str) -> Result<Self> {
        let auth_code = AuthCode::new(auth_code)?;
        Ok(Self::with_transport(TcpTransport::new(info), auth_code))
    }

    pub fn connection_info(&self) -> &ConnectionInfo {
        self.transport.info()
    }
}

impl<T: Transport> CleanmateClient<T> {
    pub fn with_transport(transport: T, auth_code: AuthCode) -> Self {
        Self {
            auth_code,
            transport,
            state: RwLock::new(DeviceState::new()),
            map: RwLock::new(MapState::new()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ── Snapshots ────────────────────────────────────────────────

    /// Last-known device state.
    pub async fn state(&self) -> DeviceState {
        self.state.read().await.clone()
    }

    /// Last-known map.
    pub async fn map(&self) -> MapState {
        self.map.read().await.clone()
    }

    // ── Queries ──────────────────────────────────────────────────

    /// Raw coerced state response.
    pub async fn get_state_data(&self) -> Result<Value> {
        self.query(CommandPayload::get_state()).await
    }

    /// Raw coerced map response.
    pub async fn get_map_data(&self) -> Result<Value> {
        self.query(CommandPayload::get_map()).await
    }

    /// Fetch the device state and merge it into the stored snapshot.
    pub async fn update_state(&self) -> Result<DeviceState> {
        let response = self.get_state_data().await?;
        let value = response_value(&response)?;

        let mut state = self.state.write().await;
        let applied = state.apply_state_update(value);
        debug!(applied, "state updated");
        Ok(state.clone())
    }

    /// Fetch the map and merge it into the stored snapshot.
    pub async fn update_map(&self) -> Result<MapState> {
        let response = self.get_map_data().await?;
        let value = response_value(&response)?;

        let mut map = self.map.write().await;
        let applied = map.apply_map_update(value);
        debug!(applied, rooms = map.rooms().len(), "map updated");
        Ok(map.clone())
    }

    // ── Commands ─────────────────────────────────────────────────
    //
    // `Ok(())` means the frame was written, not that the device accepted it.

    /// Start cleaning. With a mode, the device switches to it first.
    pub async fn start(&self, mode: Option<WorkMode>) -> Result<()> {
        self.command(CommandPayload::start(mode)?).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.command(CommandPayload::stop()).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.command(CommandPayload::pause()).await
    }

    /// Return to the dock.
    pub async fn charge(&self) -> Result<()> {
        self.command(CommandPayload::charge()).await
    }

    pub async fn set_mop_mode(&self, mode: MopMode) -> Result<()> {
        self.command(CommandPayload::set_mop_mode(mode)?).await
    }

    /// `volume` is 0–100.
    pub async fn set_volume(&self, volume: u8) -> Result<()> {
        self.command(CommandPayload::set_volume(volume)?).await
    }

    pub async fn clean_rooms(&self, rooms: &[RoomCleaning]) -> Result<()> {
        self.command(CommandPayload::clean_rooms(rooms)?).await
    }

    /// Make the robot announce itself.
    pub async fn find(&self) -> Result<()> {
        self.command(CommandPayload::find()).await
    }

    // ── Internals ────────────────────────────────────────────────

    async fn query(&self, payload: CommandPayload) -> Result<Value> {
        let packet = Envelope::new(&self.auth_code, &payload).to_packet()?;
        let response = self.transport.exchange(packet).await?;
        response.decode()
    }

    async fn command(&self, payload: CommandPayload) -> Result<()> {
        let packet = Envelope::new(&self.auth_code, &payload).to_packet()?;
        info!(cmd = ?payload.transit_cmd(), "sending command");
        self.transport.send(packet).await
    }
}

/// The `value` object every query response carries.
fn response_value(response: &Value) -> Result<&Value> {
    match response.get("value") {
        Some(value) if value.is_object() => Ok(value),
        _ => Err(CleanmateError::UnexpectedResponse(
            "response has no `value` object",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::message::WorkState;
    use crate::packet::Packet;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every body it is given and answers queries with `reply`.
    #[derive(Default)]
    struct MockTransport {
        sent: Mutex<Vec<Value>>,
        reply: Mutex<Option<String>>,
    }

    impl MockTransport {
        fn replying(body: impl Into<String>) -> Self {
            Self {
                sent: Mutex::default(),
                reply: Mutex::new(Some(body.into())),
            }
        }

        fn record(&self, packet: &Packet) {
            let body = serde_json::from_slice(packet.body()).unwrap();
            self.sent.lock().unwrap().push(body);
        }

        fn sent(&self) -> Vec<Value> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, packet: Packet) -> Result<()> {
            self.record(&packet);
            Ok(())
        }

        async fn exchange(&self, packet: Packet) -> Result<Packet> {
            self.record(&packet);
            match self.reply.lock().unwrap().clone() {
                Some(body) => Packet::new(body.into_bytes()),
                None => Err(CleanmateError::ConnectionClosed {
                    received: 0,
                    expected: 20,
                }),
            }
        }
    }

    fn client(transport: MockTransport) -> CleanmateClient<MockTransport> {
        CleanmateClient::with_transport(transport, AuthCode::new("0123456789").unwrap())
    }

    #[test]
    fn new_validates_before_connecting() {
        assert_eq!(
            CleanmateClient::new("not-an-ip", "0123456789").unwrap_err().kind(),
            ErrorKind::InvalidConfiguration
        );
        assert!(matches!(
            CleanmateClient::new("192.168.1.5", "123"),
            Err(CleanmateError::InvalidAuthCode(3))
        ));
        let client = CleanmateClient::new("192.168.1.5", "0123456789").unwrap();
        assert_eq!(client.connection_info().port(), 8888);
    }

    #[tokio::test]
    async fn update_state_applies_coerced_response() {
        let body = r#"{"version":"1.0","value":{"battery":"76","version":"1.2.3","workMode":"1","workState":"5","waterTank":"60","extParam":{"hadWork":"false"},"error":"0"}}"#;
        let client = client(MockTransport::replying(body));

        let state = client.update_state().await.unwrap();
        assert_eq!(state.battery_level(), Some(76));
        assert_eq!(state.work_mode(), WorkMode::Standard);
        assert_eq!(state.work_state(), WorkState::Charging);
        assert_eq!(state.mop_mode(), MopMode::Low);
        assert!(!state.had_work());
        assert_eq!(client.state().await, state);

        let sent = client.transport().sent();
        assert_eq!(sent[0]["control"]["authCode"], "0123456789");
        assert_eq!(sent[0]["value"], json!({"state": "", "transitCmd": "98"}));
    }

    #[tokio::test]
    async fn response_without_value_leaves_state_alone() {
        let client = client(MockTransport::replying(r#"{"result":"0"}"#));
        let err = client.update_state().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(client.state().await, DeviceState::default());
    }

    #[tokio::test]
    async fn transport_errors_propagate_unchanged() {
        let client = client(MockTransport::default());
        let err = client.update_state().await.unwrap_err();
        assert!(matches!(err, CleanmateError::ConnectionClosed { received: 0, .. }));
    }

    #[tokio::test]
    async fn update_map_returns_snapshot() {
        let body = r#"{"value":{"regionNames":[{"regionNum":"2","regionName":"SGFsbA=="}],"chargerPos":"10,-3"}}"#;
        let client = client(MockTransport::replying(body));
        let map = client.update_map().await.unwrap();
        assert_eq!(map.rooms()[0].name, "Hall");
        assert_eq!(map.rooms()[0].id, 2);
        assert_eq!(map.charger_position().map(|p| (p.x, p.y)), Some((10, -3)));
        assert_eq!(client.map().await, map);
        assert_eq!(client.transport().sent()[0]["value"]["transitCmd"], "133");
    }

    #[tokio::test]
    async fn commands_carry_their_payloads() {
        let client = client(MockTransport::default());
        client.start(None).await.unwrap();
        client.start(Some(WorkMode::Intensive)).await.unwrap();
        client.stop().await.unwrap();
        client.pause().await.unwrap();
        client.charge().await.unwrap();
        client.set_mop_mode(MopMode::High).await.unwrap();
        client.set_volume(100).await.unwrap();
        client
            .clean_rooms(&[RoomCleaning::once(3), RoomCleaning::once(1)])
            .await
            .unwrap();
        client.find().await.unwrap();

        let values: Vec<Value> = client
            .transport()
            .sent()
            .into_iter()
            .map(|body| body["value"].clone())
            .collect();
        assert_eq!(
            values,
            vec![
                json!({"start": "1", "transitCmd": "100"}),
                json!({"mode": "7", "transitCmd": "106"}),
                json!({"stop": "1", "isStop": "1", "transitCmd": "102"}),
                json!({"pause": "1", "isStop": "0", "transitCmd": "102"}),
                json!({"charge": "1", "transitCmd": "104"}),
                json!({"waterTank": "20", "transitCmd": "145"}),
                json!({"volume": "2.0", "voice": "", "transitCmd": "123"}),
                json!({"opCmd": "cleanBlocks", "cleanBlocks": [
                    {"cleanNum": "1", "blockNum": "1"},
                    {"cleanNum": "1", "blockNum": "3"},
                ]}),
                json!({"find": "", "transitCmd": "143"}),
            ]
        );
    }

    #[tokio::test]
    async fn invalid_arguments_never_reach_the_transport() {
        let client = client(MockTransport::default());
        assert!(client.set_volume(101).await.is_err());
        assert!(client.set_mop_mode(MopMode::Unknown).await.is_err());
        assert!(client.clean_rooms(&[]).await.is_err());
        assert!(client.transport().sent().is_empty());
    }
}
