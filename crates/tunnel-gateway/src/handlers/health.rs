use crate::model::PingResponse;
use axum::Json;
use jiff::Timestamp;

pub async fn ping_handler() -> Json<PingResponse> {
    Json(PingResponse {
        ok: true,
        ts: Timestamp::now().as_second(),
    })
}
