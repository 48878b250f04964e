use actix::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{info, warn};
use uuid::Uuid;

use crate::models::{AppState, ServerEvent};
use crate::websocket::game_handlers::ConnectionRouter;
use crate::websocket::hub::Outbox;

/// One actor per WebSocket connection.
///
/// The actor handles frames one at a time, so a connection's events (and its
/// final disconnect) reach the router strictly in order.
pub struct GameSocket {
    pub router: ConnectionRouter,
    pub app_state: web::Data<AppState>,
}

impl GameSocket {
    pub fn new(id: String, app_state: web::Data<AppState>) -> Self {
        Self {
            router: ConnectionRouter::new(id),
            app_state,
        }
    }

    fn reply(&self, event: &ServerEvent) {
        self.app_state.hub.send(self.router.id(), event);
    }
}

impl Actor for GameSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let id = self.router.id().clone();
        self.app_state.hub.register(id.clone(), ctx.address().recipient());
        info!("WebSocket connection started: {}", id);
        info!("Total active connections: {}", self.app_state.hub.len());
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        let state = self.app_state.clone();
        self.router.handle_disconnect(&state.registry, &state.hub);
        state.hub.unregister(self.router.id());
        info!("WebSocket connection closed: {}", self.router.id());
        info!("Total active connections: {}", state.hub.len());
        Running::Stop
    }
}

impl Handler<ServerEvent> for GameSocket {
    type Result = ();

    fn handle(&mut self, msg: ServerEvent, ctx: &mut Self::Context) {
        self.router.observe(&msg);
        match serde_json::to_string(&msg) {
            Ok(text) => ctx.text(text),
            Err(e) => warn!("Failed to serialize {}: {}", msg.name(), e),
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for GameSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {}
            Ok(ws::Message::Text(text)) => {
                let state = self.app_state.clone();
                self.router.handle_text(&text, &state.registry, &state.hub);
            }
            Ok(ws::Message::Binary(_)) => {
                warn!("Binary messages are not supported");
                self.reply(&ServerEvent::ErrorMessage(
                    "Binary messages are not supported".to_string(),
                ));
            }
            Ok(ws::Message::Close(reason)) => {
                info!("Connection closed: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {}
            Err(e) => {
                warn!("Protocol error on {}: {}", self.router.id(), e);
                ctx.stop();
            }
        }
    }
}

/// WebSocket connection handler
pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let id = Uuid::new_v4().to_string();
    info!("New WebSocket connection: {}", id);
    ws::start(GameSocket::new(id, app_state), &req, stream)
}
