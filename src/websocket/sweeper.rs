use actix_web::web;
use log::info;
use std::time::Duration;

use crate::models::{AppState, ServerEvent, SessionRegistry};
use crate::websocket::hub::Outbox;

/// Drops rooms that sat half-empty for longer than `ttl` and tells anyone
/// still seated. Returns how many rooms went.
pub fn expire_idle_rooms(registry: &SessionRegistry, outbox: &dyn Outbox, ttl: Duration) -> usize {
    let swept = registry.sweep_stale(ttl);
    for room in &swept {
        info!("Room {} expired", room.id);
        outbox.send_group(
            &room.stranded,
            &ServerEvent::ErrorMessage("Room expired".to_string()),
        );
    }
    swept.len()
}

/// Runs [`expire_idle_rooms`] every `every` on the current actix runtime.
pub fn spawn(app_state: web::Data<AppState>, ttl: Duration, every: Duration) {
    info!(
        "Expiring idle rooms after {}s, checking every {}s",
        ttl.as_secs(),
        every.as_secs()
    );
    actix_rt::spawn(async move {
        let mut interval = actix_rt::time::interval(every);
        loop {
            interval.tick().await;
            expire_idle_rooms(&app_state.registry, &app_state.hub, ttl);
        }
    });
}
