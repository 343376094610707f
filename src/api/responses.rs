use rocket::{
    serde::json::{self, Json, Value},
    Route,
};

use crate::error::{Error, Result};
use crate::model::api::{Ack, ResponseDescription};
use crate::service::ResponseService;

pub fn routes() -> Vec<Route> {
    routes![submit, list_responses]
}

#[post("/submit", data = "<payload>", format = "json")]
async fn submit(
    payload: std::result::Result<Json<Value>, json::Error<'_>>,
    service: ResponseService,
) -> Result<Json<Ack>> {
    let payload = payload.map_err(|e| Error::validation(e.to_string()))?;
    service.submit(payload.into_inner()).await?;
    Ok(Json(Ack::default()))
}

#[get("/responses")]
async fn list_responses(service: ResponseService) -> Result<Json<Vec<ResponseDescription>>> {
    let responses = service.list().await?;
    Ok(Json(responses.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::{json, serde_json},
    };

    use super::*;

    async fn submit_raw(client: &Client, body: String) -> Status {
        client
            .post(uri!(submit))
            .header(ContentType::JSON)
            .body(body)
            .dispatch()
            .await
            .status()
    }

    async fn list(client: &Client) -> Vec<ResponseDescription> {
        let response = client.get(uri!(list_responses)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        serde_json::from_str(&response.into_string().await.unwrap()).unwrap()
    }

    #[backend_test(seeded)]
    async fn submit_then_list(client: Client) {
        let first = json!({"answers": {"1": "do", "2": ["work"], "3": "Fine"}});
        let second = json!({"answers": {"77": "no such question"}});
        for body in [&first, &second] {
            assert_eq!(Status::Ok, submit_raw(&client, body.to_string()).await);
        }

        let listed = list(&client).await;
        assert_eq!(2, listed.len());
        assert!(listed[0].id < listed[1].id);
        assert!(listed[0].ts <= listed[1].ts);
        assert_eq!(first, listed[0].payload);
        assert_eq!(second, listed[1].payload);
    }

    #[backend_test]
    async fn submit_rejects_bad_payloads(client: Client) {
        for body in ["[1, 2]", "\"answers\"", "3", "{not json"] {
            let status = submit_raw(&client, body.to_string()).await;
            assert_eq!(Status::BadRequest, status, "accepted {body}");
        }
        assert!(list(&client).await.is_empty());
    }

    #[backend_test]
    async fn submit_accepts_any_object(client: Client) {
        let bodies = [json!({"answers": 3}), json!({"answers": ["a"]})];
        for body in &bodies {
            assert_eq!(Status::Ok, submit_raw(&client, body.to_string()).await);
        }
        let listed = list(&client).await;
        let payloads: Vec<_> = listed.into_iter().map(|r| r.payload).collect();
        assert_eq!(bodies.to_vec(), payloads);
    }

    #[backend_test]
    async fn submit_needs_json_content_type(client: Client) {
        let response = client
            .post(uri!(submit))
            .body(json!({"answers": {}}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
        assert!(list(&client).await.is_empty());
    }

    #[backend_test]
    async fn submit_reply(client: Client) {
        let response = client
            .post(uri!(submit))
            .header(ContentType::JSON)
            .body(json!({"answers": {}}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let body: Value = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(json!({"ok": true}), body);
    }
}
