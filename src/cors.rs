use rocket::{
    fairing::{Fairing, Info, Kind},
    http::Header,
    Request, Response, Route,
};

/// A fairing that allows the answering form and the editor to be served from any origin.
#[derive(Debug, Copy, Clone)]
pub struct CorsFairing;

#[rocket::async_trait]
impl Fairing for CorsFairing {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _req: &'r Request<'_>, res: &mut Response<'r>) {
        res.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        res.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, DELETE, OPTIONS",
        ));
        res.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        res.set_header(Header::new(
            "Access-Control-Expose-Headers",
            "Content-Disposition",
        ));
    }
}

pub fn routes() -> Vec<Route> {
    routes![preflight]
}

/// Answer any CORS preflight; the headers themselves are added by [`CorsFairing`].
#[options("/<_..>")]
fn preflight() {}

#[cfg(test)]
mod tests {
    use rocket::{http::Status, local::asynchronous::Client};

    #[backend_test]
    async fn preflight_is_answered(client: Client) {
        let response = client.options("/question/7").dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(
            Some("*"),
            response.headers().get_one("Access-Control-Allow-Origin")
        );
    }

    #[backend_test]
    async fn headers_added_to_every_response(client: Client) {
        let response = client.get("/health").dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(
            Some("GET, POST, PUT, DELETE, OPTIONS"),
            response.headers().get_one("Access-Control-Allow-Methods")
        );
    }
}
